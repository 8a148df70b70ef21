use std::fmt::Write;

use super::super::directory::CapacityRow;
use super::super::domain::DecisionStatus;
use super::super::events::AssignmentEvent;
use super::summary::AssignmentSummary;

const RULE: &str = "==================================================";
const DIVIDER: &str = "--------------------------------------------------";

/// Render the downloadable narrative for a run from its structured events.
pub fn render_log(
    summary: &AssignmentSummary,
    events: &[AssignmentEvent],
    capacity_before: &[CapacityRow],
    capacity_after: &[CapacityRow],
) -> String {
    let mut out = String::new();

    line(&mut out, "TEAM ASSIGNMENT LOG");
    line(
        &mut out,
        &format!("Generated: {}", summary.generated_at.to_rfc3339()),
    );
    line(&mut out, RULE);
    out.push('\n');

    capacity_table(&mut out, "TECHNICAL TEAM CAPACITY (BEFORE)", capacity_before);

    let rejected: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            AssignmentEvent::ApplicantRejected {
                applicant_id,
                problem,
            } => Some(format!("  {applicant_id}: {problem}")),
            _ => None,
        })
        .collect();
    if !rejected.is_empty() {
        line(&mut out, "REJECTED AT INTAKE (left pending)");
        for entry in &rejected {
            line(&mut out, entry);
        }
        out.push('\n');
    }

    line(&mut out, "APPLICANTS");
    line(&mut out, DIVIDER);
    let mut any_applicant = false;
    for event in events {
        if matches!(event, AssignmentEvent::ApplicantStarted { .. }) && any_applicant {
            line(&mut out, DIVIDER);
        }
        if let Some(text) = describe(event) {
            any_applicant |= matches!(event, AssignmentEvent::ApplicantStarted { .. });
            line(&mut out, &text);
        }
    }
    if any_applicant {
        line(&mut out, DIVIDER);
    } else {
        line(&mut out, "  No pending applicants to process.");
    }
    out.push('\n');

    line(&mut out, "SUMMARY");
    line(
        &mut out,
        &format!("  Total processed: {}", summary.total_processed),
    );
    line(&mut out, &format!("  Assigned: {}", summary.assigned));
    line(&mut out, &format!("  Waitlisted: {}", summary.waitlisted));
    line(
        &mut out,
        &format!("  Left pending: {}", summary.deferred),
    );
    line(
        &mut out,
        &format!(
            "  Additional team enrollments: {}",
            summary.additional_enrollments
        ),
    );
    out.push('\n');

    capacity_table(&mut out, "TECHNICAL TEAM CAPACITY (AFTER)", capacity_after);

    out
}

fn describe(event: &AssignmentEvent) -> Option<String> {
    let text = match event {
        AssignmentEvent::ApplicantRejected { .. } => return None,
        AssignmentEvent::ApplicantStarted {
            applicant_id,
            position,
            submitted_at,
        } => format!(
            "[{position}] Applicant {applicant_id} (submitted {})",
            submitted_at.to_rfc3339()
        ),
        AssignmentEvent::Disqualified { reason, .. } => {
            format!("  Validation: failed, {}", reason.reasoning())
        }
        AssignmentEvent::UnknownPreference { team_id, .. } => {
            format!("  Preference {team_id}: skipped, team does not exist")
        }
        AssignmentEvent::DuplicatePreference { team_id, .. } => {
            format!("  Preference {team_id}: skipped, listed more than once")
        }
        AssignmentEvent::TeamConsidered {
            team_label,
            rank,
            remaining,
            accepted,
            ..
        } => {
            if *accepted {
                format!("  #{rank} {team_label}: accepted ({remaining} seat(s) were open)")
            } else {
                format!("  #{rank} {team_label}: rejected, team is full")
            }
        }
        AssignmentEvent::Decided { decision } => match decision.status {
            DecisionStatus::Assigned => format!("  Final status: ASSIGNED. {}", decision.reasoning),
            DecisionStatus::Waitlisted => {
                format!("  Final status: WAITLISTED. {}", decision.reasoning)
            }
        },
        AssignmentEvent::CommitFailed { stage, error, .. } => format!(
            "  Final status: LEFT PENDING. Saving {} failed: {error}",
            stage.label()
        ),
        AssignmentEvent::CompensationFailed { team_id, error, .. } => format!(
            "  WARNING: occupancy for {team_id} could not be restored: {error}"
        ),
        AssignmentEvent::AdditionalEnrolled {
            team_label,
            occupancy,
            capacity,
            occupancy_recorded,
            ..
        } => {
            let mut text =
                format!("  Additional team {team_label}: enrolled ({occupancy}/{capacity})");
            if !occupancy_recorded {
                text.push_str(", occupancy not saved");
            }
            text
        }
        AssignmentEvent::AdditionalSkipped { team_id, reason, .. } => {
            format!("  Additional team {team_id}: skipped, {}", reason.summary())
        }
    };

    Some(text)
}

fn capacity_table(out: &mut String, title: &str, rows: &[CapacityRow]) {
    line(out, title);
    if rows.is_empty() {
        line(out, "  (no technical teams)");
    }
    for row in rows {
        let label = if row.name.trim().is_empty() {
            row.team_id.0.clone()
        } else {
            format!("{} ({})", row.name, row.team_id)
        };
        line(
            out,
            &format!(
                "  {label}: {}/{} occupied, {} remaining",
                row.occupancy, row.capacity, row.remaining
            ),
        );
    }
    out.push('\n');
}

fn line(out: &mut String, text: &str) {
    let _ = writeln!(out, "{text}");
}
