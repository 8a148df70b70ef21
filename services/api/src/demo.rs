use crate::infra::InMemoryGateway;
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use team_placement::error::AppError;
use team_placement::workflows::assignment::{
    ApplicantRecord, AssignmentReport, AssignmentService, Team,
};
use team_placement::workflows::roster::{RosterImporter, RosterSnapshot};

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Team directory CSV export
    #[arg(long)]
    pub(crate) teams: PathBuf,
    /// Applicant pool CSV export
    #[arg(long)]
    pub(crate) applicants: PathBuf,
    /// Compute the report without committing any decision
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Write the text log to this path
    #[arg(long)]
    pub(crate) log_out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full text log after the summary
    #[arg(long)]
    pub(crate) show_log: bool,
    /// Write the text log to this path
    #[arg(long)]
    pub(crate) log_out: Option<PathBuf>,
}

pub(crate) fn run_assign(args: AssignArgs) -> Result<(), AppError> {
    let AssignArgs {
        teams,
        applicants,
        dry_run,
        log_out,
    } = args;

    let snapshot = RosterImporter::from_paths(&teams, &applicants)?;
    println!(
        "Loaded {} teams and {} applicants from {} / {}",
        snapshot.teams.len(),
        snapshot.applicants.len(),
        teams.display(),
        applicants.display()
    );

    let service = AssignmentService::new(Arc::new(InMemoryGateway::from_snapshot(snapshot)));
    let report = if dry_run {
        println!("Dry run: no decisions are committed");
        service.preview()?
    } else {
        service.run()?
    };

    render_report(&report);
    if let Some(path) = log_out {
        write_log(&report, &path)?;
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { show_log, log_out } = args;

    println!("Team assignment demo");
    let service = AssignmentService::new(Arc::new(InMemoryGateway::from_snapshot(demo_roster())));
    let report = service.run_at(demo_instant(3, 18))?;

    render_report(&report);
    if show_log {
        println!("\n{}", report.log);
    }
    if let Some(path) = log_out {
        write_log(&report, &path)?;
    }

    Ok(())
}

fn render_report(report: &AssignmentReport) {
    let summary = &report.summary;
    println!(
        "\nProcessed {} | assigned {} | waitlisted {} | left pending {} | additional enrollments {}",
        summary.total_processed,
        summary.assigned,
        summary.waitlisted,
        summary.deferred,
        summary.additional_enrollments
    );

    if report.decisions.is_empty() && report.deferred.is_empty() {
        println!("No pending applicants.");
    }

    for decision in &report.decisions {
        let team = decision
            .assigned_team_id
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        println!(
            "- {:<12} {:<10} {:<12} {}",
            decision.applicant_id.0,
            decision.status.label(),
            team,
            decision.reasoning
        );

        if !decision.additional_enrollments.is_empty() {
            let listed = decision
                .additional_enrollments
                .iter()
                .map(|enrollment| enrollment.team_id.0.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  additional teams: {listed}");
        }
    }

    for entry in &report.deferred {
        println!(
            "- {:<12} {:<10} {:<12} {}",
            entry.applicant_id.0,
            "pending",
            "-",
            entry.reason.summary()
        );
    }

    println!("\nTechnical team capacity");
    for row in &report.capacity_after {
        println!(
            "  {:<20} {}/{} ({} open)",
            row.name, row.occupancy, row.capacity, row.remaining
        );
    }
}

fn write_log(report: &AssignmentReport, path: &Path) -> Result<(), AppError> {
    std::fs::write(path, &report.log)?;
    println!("\nLog written to {}", path.display());
    Ok(())
}

fn demo_instant(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A small cohort that exercises fall-through, waitlisting, and additional teams.
pub(crate) fn demo_roster() -> RosterSnapshot {
    RosterSnapshot {
        teams: vec![
            Team::technical("web", "Web Platform", 2, 1),
            Team::technical("infra", "Infrastructure", 1, 0),
            Team::technical("data", "Data Engineering", 1, 1),
            Team::constant("events", "Events Crew", 6, 2),
            Team::constant("mentoring", "Mentoring Circle", 1, 1),
        ],
        applicants: vec![
            ApplicantRecord::pending("ana", demo_instant(1, 9))
                .with_preferences(&["web", "infra"])
                .with_additional(&["events", "mentoring"]),
            ApplicantRecord::pending("ben", demo_instant(1, 11))
                .with_preferences(&["data", "web", "infra"])
                .with_additional(&["events"]),
            ApplicantRecord::pending("cai", demo_instant(2, 8)).with_preferences(&["web"]),
            ApplicantRecord::pending("dee", demo_instant(2, 10)),
            ApplicantRecord::pending("eli", demo_instant(2, 12))
                .with_preferences(&["robotics", "infra"])
                .without_availability(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use team_placement::workflows::assignment::DecisionStatus;

    #[test]
    fn demo_roster_produces_a_mixed_outcome() {
        let service = AssignmentService::new(Arc::new(InMemoryGateway::from_snapshot(demo_roster())));

        let report = service.run_at(demo_instant(3, 18)).expect("demo run");

        assert_eq!(report.summary.assigned, 2);
        assert_eq!(report.summary.waitlisted, 3);
        assert_eq!(
            report.decision_for("ben").expect("ben").status,
            DecisionStatus::Assigned
        );
        assert_eq!(
            report.decision_for("dee").expect("dee").reasoning,
            "no team preferences provided."
        );
        assert_eq!(report.summary.additional_enrollments, 2);
        assert_eq!(
            report.log_filename(),
            "assignment-log-2025-09-03T18-00-00Z.txt"
        );
    }
}
