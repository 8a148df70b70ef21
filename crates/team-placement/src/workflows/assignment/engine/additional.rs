use std::collections::HashSet;

use tracing::{debug, error, warn};

use super::super::directory::TeamDirectory;
use super::super::domain::{AdditionalEnrollment, ApplicantId, TeamId, TeamKind};
use super::super::events::{AdditionalSkip, AssignmentEvent, EventTrail};
use super::super::gateway::PersistenceGateway;

/// Best-effort enrollment of an assigned applicant into their chosen constant teams.
///
/// Every choice is attempted independently: a full, unknown, or failing team never
/// prevents the remaining choices from being tried.
pub(crate) struct AdditionalTeamResolver<'g, G: ?Sized> {
    gateway: &'g G,
}

impl<'g, G> AdditionalTeamResolver<'g, G>
where
    G: PersistenceGateway + ?Sized,
{
    pub(crate) fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    pub(crate) fn resolve(
        &self,
        applicant_id: &ApplicantId,
        choices: &[TeamId],
        directory: &mut TeamDirectory,
        trail: &mut EventTrail,
    ) -> Vec<AdditionalEnrollment> {
        let mut enrollments = Vec::new();
        let mut attempted: HashSet<&TeamId> = HashSet::new();

        for team_id in choices {
            if !attempted.insert(team_id) {
                continue;
            }

            match self.enroll(applicant_id, team_id, directory, trail) {
                Ok(enrollment) => enrollments.push(enrollment),
                Err(reason) => {
                    debug!(
                        applicant = %applicant_id,
                        team = %team_id,
                        reason = %reason.summary(),
                        "additional team skipped"
                    );
                    trail.push(AssignmentEvent::AdditionalSkipped {
                        applicant_id: applicant_id.clone(),
                        team_id: team_id.clone(),
                        reason,
                    });
                }
            }
        }

        enrollments
    }

    fn enroll(
        &self,
        applicant_id: &ApplicantId,
        team_id: &TeamId,
        directory: &mut TeamDirectory,
        trail: &mut EventTrail,
    ) -> Result<AdditionalEnrollment, AdditionalSkip> {
        match directory.kind_of(team_id) {
            None => {
                warn!(applicant = %applicant_id, team = %team_id, "unknown additional team");
                return Err(AdditionalSkip::UnknownTeam);
            }
            Some(TeamKind::Technical) => return Err(AdditionalSkip::NotConstant),
            Some(TeamKind::Constant) => {}
        }

        let pool = directory.constant_mut();
        let Some(slot) = pool.get(team_id) else {
            return Err(AdditionalSkip::UnknownTeam);
        };
        if !slot.has_room() {
            return Err(AdditionalSkip::Full);
        }
        let team_label = slot.label();
        let capacity = slot.capacity;

        let enrollment = AdditionalEnrollment {
            applicant_id: applicant_id.clone(),
            team_id: team_id.clone(),
        };
        if let Err(err) = self.gateway.enroll_additional(&enrollment) {
            warn!(
                applicant = %applicant_id,
                team = %team_id,
                error = %err,
                "additional enrollment rejected by gateway"
            );
            return Err(AdditionalSkip::EnrollmentFailed(err.to_string()));
        }

        let occupancy = pool.reserve(team_id).ok_or(AdditionalSkip::Full)?;
        let occupancy_recorded = match self.gateway.set_occupancy(team_id, occupancy) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    applicant = %applicant_id,
                    team = %team_id,
                    occupancy,
                    error = %err,
                    "additional enrollment saved but team occupancy was not"
                );
                false
            }
        };

        trail.push(AssignmentEvent::AdditionalEnrolled {
            applicant_id: applicant_id.clone(),
            team_id: team_id.clone(),
            team_label,
            occupancy,
            capacity,
            occupancy_recorded,
        });

        Ok(enrollment)
    }
}
