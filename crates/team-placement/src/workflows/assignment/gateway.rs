use serde::{Deserialize, Serialize};

use super::domain::{
    AdditionalEnrollment, ApplicantId, ApplicantRecord, ApplicationStatus, AssignmentDecision,
    Team, TeamId,
};

/// Applicant fields the engine is allowed to write back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantOutcome {
    pub applicant_id: ApplicantId,
    pub status: ApplicationStatus,
    pub assigned_team_id: Option<TeamId>,
    pub assignment_reason: String,
}

impl From<&AssignmentDecision> for ApplicantOutcome {
    fn from(decision: &AssignmentDecision) -> Self {
        Self {
            applicant_id: decision.applicant_id.clone(),
            status: decision.status.application_status(),
            assigned_team_id: decision.assigned_team_id.clone(),
            assignment_reason: decision.reasoning.clone(),
        }
    }
}

/// Storage abstraction owning every durable write an assignment run performs.
///
/// Calls are synchronous and are never retried by the engine.
pub trait PersistenceGateway: Send + Sync {
    fn load_teams(&self) -> Result<Vec<Team>, GatewayError>;
    fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError>;
    fn record_outcome(&self, outcome: &ApplicantOutcome) -> Result<(), GatewayError>;
    fn set_occupancy(&self, team_id: &TeamId, occupancy: u32) -> Result<(), GatewayError>;
    fn enroll_additional(&self, enrollment: &AdditionalEnrollment) -> Result<(), GatewayError>;
}

/// Error enumeration for gateway failures.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    Duplicate(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Gateway used for previews: every write succeeds and is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardingGateway;

impl PersistenceGateway for DiscardingGateway {
    fn load_teams(&self) -> Result<Vec<Team>, GatewayError> {
        Ok(Vec::new())
    }

    fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError> {
        Ok(Vec::new())
    }

    fn record_outcome(&self, _outcome: &ApplicantOutcome) -> Result<(), GatewayError> {
        Ok(())
    }

    fn set_occupancy(&self, _team_id: &TeamId, _occupancy: u32) -> Result<(), GatewayError> {
        Ok(())
    }

    fn enroll_additional(&self, _enrollment: &AdditionalEnrollment) -> Result<(), GatewayError> {
        Ok(())
    }
}
