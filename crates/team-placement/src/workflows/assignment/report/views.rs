use serde::Serialize;

use super::super::directory::CapacityRow;
use super::super::domain::{AssignmentDecision, DeferredApplicant};
use super::summary::AssignmentSummary;

#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    pub applicant_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_rank: Option<usize>,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_teams: Vec<String>,
}

impl From<&AssignmentDecision> for DecisionView {
    fn from(decision: &AssignmentDecision) -> Self {
        Self {
            applicant_id: decision.applicant_id.0.clone(),
            status: decision.status.label(),
            assigned_team_id: decision.assigned_team_id.as_ref().map(|id| id.0.clone()),
            preference_rank: decision.preference_rank,
            reasoning: decision.reasoning.clone(),
            additional_teams: decision
                .additional_enrollments
                .iter()
                .map(|enrollment| enrollment.team_id.0.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeferredView {
    pub applicant_id: String,
    pub status: &'static str,
    pub reason: String,
}

impl From<&DeferredApplicant> for DeferredView {
    fn from(entry: &DeferredApplicant) -> Self {
        Self {
            applicant_id: entry.applicant_id.0.clone(),
            status: "pending",
            reason: entry.reason.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRunView {
    pub summary: AssignmentSummary,
    pub decisions: Vec<DecisionView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<DeferredView>,
    pub capacity_before: Vec<CapacityRow>,
    pub capacity_after: Vec<CapacityRow>,
    pub log_filename: String,
    pub log: String,
}
