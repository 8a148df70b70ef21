mod additional;
mod intake;
mod preferences;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::directory::{DirectoryError, TeamDirectory};
use super::domain::{
    ApplicantRecord, AssignmentDecision, DecisionStatus, DeferralReason, DeferredApplicant, Team,
};
use super::events::{AssignmentEvent, CommitStage, Disqualification, EventTrail};
use super::gateway::{ApplicantOutcome, PersistenceGateway};
use super::report::AssignmentReport;
use additional::AdditionalTeamResolver;
use intake::QueuedApplicant;
use preferences::{filter_preferences, walk_preferences, WalkOutcome};

/// Greedy first-come-first-served placement of pending applicants into technical teams.
///
/// Capacity lives in a run-scoped [`TeamDirectory`]; every decision is committed through
/// the gateway before the next applicant is considered.
pub struct AssignmentEngine<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G> AssignmentEngine<G>
where
    G: PersistenceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn run(
        &self,
        teams: &[Team],
        applicants: &[ApplicantRecord],
    ) -> Result<AssignmentReport, DirectoryError> {
        self.run_at(teams, applicants, Utc::now())
    }

    /// Same as [`AssignmentEngine::run`] with an explicit report timestamp.
    pub fn run_at(
        &self,
        teams: &[Team],
        applicants: &[ApplicantRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<AssignmentReport, DirectoryError> {
        let mut directory = TeamDirectory::from_teams(teams)?;
        let capacity_before = directory.technical().rows();
        let (queue, rejected) = intake::pending_queue(applicants);

        info!(
            pending = queue.len(),
            rejected = rejected.len(),
            technical_teams = directory.technical().len(),
            constant_teams = directory.constant().len(),
            "starting assignment run"
        );

        let mut trail = EventTrail::default();
        let mut decisions = Vec::with_capacity(queue.len());
        let mut deferred = Vec::new();

        for entry in rejected {
            warn!(applicant = %entry.applicant_id, problem = %entry.problem, "applicant left pending");
            trail.push(AssignmentEvent::ApplicantRejected {
                applicant_id: entry.applicant_id.clone(),
                problem: entry.problem.clone(),
            });
            deferred.push(DeferredApplicant {
                applicant_id: entry.applicant_id,
                reason: DeferralReason::Malformed(entry.problem),
            });
        }

        for (index, entry) in queue.iter().enumerate() {
            match self.process(index + 1, entry, &mut directory, &mut trail) {
                Ok(decision) => decisions.push(decision),
                Err(skipped) => deferred.push(skipped),
            }
        }

        let capacity_after = directory.technical().rows();
        let report = AssignmentReport::new(
            generated_at,
            decisions,
            deferred,
            trail.into_events(),
            capacity_before,
            capacity_after,
        );

        info!(
            processed = report.summary.total_processed,
            assigned = report.summary.assigned,
            waitlisted = report.summary.waitlisted,
            deferred = report.summary.deferred,
            "assignment run finished"
        );

        Ok(report)
    }

    fn process(
        &self,
        position: usize,
        entry: &QueuedApplicant<'_>,
        directory: &mut TeamDirectory,
        trail: &mut EventTrail,
    ) -> Result<AssignmentDecision, DeferredApplicant> {
        let applicant = entry.record;
        trail.push(AssignmentEvent::ApplicantStarted {
            applicant_id: applicant.id.clone(),
            position,
            submitted_at: entry.submitted_at,
        });

        let decision = match screen(applicant) {
            Some(reason) => {
                trail.push(AssignmentEvent::Disqualified {
                    applicant_id: applicant.id.clone(),
                    reason,
                });
                waitlisted(applicant, reason.reasoning().to_string())
            }
            None => place(applicant, directory, trail),
        };

        self.commit(&decision, directory, trail)?;

        debug!(
            applicant = %decision.applicant_id,
            status = decision.status.label(),
            team = ?decision.assigned_team_id,
            rank = ?decision.preference_rank,
            "decision committed"
        );
        trail.push(AssignmentEvent::Decided {
            decision: decision.clone(),
        });

        let mut decision = decision;
        if decision.is_assigned() {
            decision.additional_enrollments = AdditionalTeamResolver::new(self.gateway.as_ref())
                .resolve(
                    &applicant.id,
                    &applicant.additional_team_choices,
                    directory,
                    trail,
                );
        }

        Ok(decision)
    }

    /// Persist team occupancy (when assigned) and then the applicant outcome.
    ///
    /// On failure the reserved seat is returned to the capacity map and the applicant is
    /// deferred; a failed applicant write also restores the team occupancy already saved.
    fn commit(
        &self,
        decision: &AssignmentDecision,
        directory: &mut TeamDirectory,
        trail: &mut EventTrail,
    ) -> Result<(), DeferredApplicant> {
        let reserved = decision.assigned_team_id.as_ref().and_then(|team_id| {
            directory
                .technical()
                .get(team_id)
                .map(|slot| (team_id.clone(), slot.occupancy))
        });

        if let Some((team_id, occupancy)) = &reserved {
            if let Err(err) = self.gateway.set_occupancy(team_id, *occupancy) {
                directory.technical_mut().release(team_id);
                return Err(commit_failed(
                    decision,
                    CommitStage::TeamOccupancy,
                    err.to_string(),
                    trail,
                ));
            }
        }

        if let Err(err) = self.gateway.record_outcome(&ApplicantOutcome::from(decision)) {
            if let Some((team_id, occupancy)) = &reserved {
                directory.technical_mut().release(team_id);
                let restored = occupancy.saturating_sub(1);
                if let Err(undo) = self.gateway.set_occupancy(team_id, restored) {
                    error!(
                        applicant = %decision.applicant_id,
                        team = %team_id,
                        occupancy = restored,
                        error = %undo,
                        "could not restore team occupancy after failed commit"
                    );
                    trail.push(AssignmentEvent::CompensationFailed {
                        applicant_id: decision.applicant_id.clone(),
                        team_id: team_id.clone(),
                        error: undo.to_string(),
                    });
                }
            }
            return Err(commit_failed(
                decision,
                CommitStage::ApplicantOutcome,
                err.to_string(),
                trail,
            ));
        }

        Ok(())
    }
}

fn commit_failed(
    decision: &AssignmentDecision,
    stage: CommitStage,
    error: String,
    trail: &mut EventTrail,
) -> DeferredApplicant {
    error!(
        applicant = %decision.applicant_id,
        stage = stage.label(),
        error = %error,
        "commit failed; applicant left pending"
    );
    trail.push(AssignmentEvent::CommitFailed {
        applicant_id: decision.applicant_id.clone(),
        stage,
        error: error.clone(),
    });
    DeferredApplicant {
        applicant_id: decision.applicant_id.clone(),
        reason: DeferralReason::CommitFailed(format!("{}: {error}", stage.label())),
    }
}

fn screen(applicant: &ApplicantRecord) -> Option<Disqualification> {
    if applicant.technical_preferences.is_empty() {
        Some(Disqualification::NoPreferences)
    } else if !applicant.has_availability {
        Some(Disqualification::NoAvailability)
    } else {
        None
    }
}

fn place(
    applicant: &ApplicantRecord,
    directory: &mut TeamDirectory,
    trail: &mut EventTrail,
) -> AssignmentDecision {
    let filtered = filter_preferences(&applicant.technical_preferences, directory.technical());

    for team_id in &filtered.unknown {
        warn!(applicant = %applicant.id, team = %team_id, "skipping unknown team preference");
        trail.push(AssignmentEvent::UnknownPreference {
            applicant_id: applicant.id.clone(),
            team_id: team_id.clone(),
        });
    }
    for team_id in &filtered.duplicates {
        trail.push(AssignmentEvent::DuplicatePreference {
            applicant_id: applicant.id.clone(),
            team_id: team_id.clone(),
        });
    }

    if filtered.teams.is_empty() {
        let listed = filtered
            .unknown
            .iter()
            .map(|team_id| team_id.0.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return waitlisted(
            applicant,
            format!("none of the preferred teams exist ({listed})."),
        );
    }

    let walk = walk_preferences(&applicant.id, &filtered, directory.technical_mut(), trail);

    match walk.outcome {
        WalkOutcome::Accepted {
            team_id,
            team_label,
            rank,
            ..
        } => {
            let mut reasoning = format!("assigned to {team_label}, preference #{rank}");
            if !walk.full_teams.is_empty() {
                let verb = if walk.full_teams.len() == 1 { "was" } else { "were" };
                reasoning.push_str(&format!("; {} {verb} full", walk.full_teams.join(", ")));
            }
            reasoning.push('.');

            AssignmentDecision {
                applicant_id: applicant.id.clone(),
                assigned_team_id: Some(team_id),
                status: DecisionStatus::Assigned,
                reasoning,
                preference_rank: Some(rank),
                additional_enrollments: Vec::new(),
            }
        }
        WalkOutcome::Exhausted => waitlisted(
            applicant,
            format!(
                "all preferred teams were full ({}).",
                walk.full_teams.join(", ")
            ),
        ),
    }
}

fn waitlisted(applicant: &ApplicantRecord, reasoning: String) -> AssignmentDecision {
    AssignmentDecision {
        applicant_id: applicant.id.clone(),
        assigned_team_id: None,
        status: DecisionStatus::Waitlisted,
        reasoning,
        preference_rank: None,
        additional_enrollments: Vec::new(),
    }
}
