use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::directory::CapacityRow;
use super::super::domain::{ApplicantId, AssignmentDecision, DecisionStatus, DeferredApplicant};
use super::super::events::AssignmentEvent;
use super::log::render_log;
use super::views::{AssignmentRunView, DecisionView, DeferredView};

/// Totals for one run. `total_processed` counts every pending applicant examined,
/// including those left pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssignmentSummary {
    pub total_processed: usize,
    pub assigned: usize,
    pub waitlisted: usize,
    pub deferred: usize,
    pub additional_enrollments: usize,
    pub generated_at: DateTime<Utc>,
}

impl AssignmentSummary {
    fn tally(
        generated_at: DateTime<Utc>,
        decisions: &[AssignmentDecision],
        deferred: &[DeferredApplicant],
    ) -> Self {
        let assigned = decisions
            .iter()
            .filter(|decision| decision.status == DecisionStatus::Assigned)
            .count();
        let waitlisted = decisions.len() - assigned;
        let additional_enrollments = decisions
            .iter()
            .map(|decision| decision.additional_enrollments.len())
            .sum();

        Self {
            total_processed: decisions.len() + deferred.len(),
            assigned,
            waitlisted,
            deferred: deferred.len(),
            additional_enrollments,
            generated_at,
        }
    }
}

/// Everything a run produced: decisions in processing order, applicants left pending,
/// the structured event trail, capacity tables, and the rendered text log.
#[derive(Debug, Clone)]
pub struct AssignmentReport {
    pub summary: AssignmentSummary,
    pub decisions: Vec<AssignmentDecision>,
    pub deferred: Vec<DeferredApplicant>,
    pub events: Vec<AssignmentEvent>,
    pub capacity_before: Vec<CapacityRow>,
    pub capacity_after: Vec<CapacityRow>,
    pub log: String,
}

impl AssignmentReport {
    pub(crate) fn new(
        generated_at: DateTime<Utc>,
        decisions: Vec<AssignmentDecision>,
        deferred: Vec<DeferredApplicant>,
        events: Vec<AssignmentEvent>,
        capacity_before: Vec<CapacityRow>,
        capacity_after: Vec<CapacityRow>,
    ) -> Self {
        let summary = AssignmentSummary::tally(generated_at, &decisions, &deferred);
        let log = render_log(&summary, &events, &capacity_before, &capacity_after);

        Self {
            summary,
            decisions,
            deferred,
            events,
            capacity_before,
            capacity_after,
            log,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_processed == 0
    }

    pub fn decision_for(&self, applicant_id: &str) -> Option<&AssignmentDecision> {
        self.decisions
            .iter()
            .find(|decision| decision.applicant_id.0 == applicant_id)
    }

    pub fn deferred_for(&self, applicant_id: &str) -> Option<&DeferredApplicant> {
        self.deferred
            .iter()
            .find(|entry| entry.applicant_id.0 == applicant_id)
    }

    /// Applicant ids in the order their decisions were committed.
    pub fn processing_order(&self) -> Vec<&ApplicantId> {
        self.decisions
            .iter()
            .map(|decision| &decision.applicant_id)
            .collect()
    }

    /// Suggested download name, e.g. `assignment-log-2025-09-01T12-00-00Z.txt`.
    pub fn log_filename(&self) -> String {
        format!(
            "assignment-log-{}.txt",
            self.summary.generated_at.format("%Y-%m-%dT%H-%M-%SZ")
        )
    }

    pub fn to_view(&self) -> AssignmentRunView {
        AssignmentRunView {
            summary: self.summary,
            decisions: self.decisions.iter().map(DecisionView::from).collect(),
            deferred: self.deferred.iter().map(DeferredView::from).collect(),
            capacity_before: self.capacity_before.clone(),
            capacity_after: self.capacity_after.clone(),
            log_filename: self.log_filename(),
            log: self.log.clone(),
        }
    }
}
