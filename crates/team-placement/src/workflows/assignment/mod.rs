//! Automatic placement of pending applicants into capacity-bounded teams.
//!
//! Applicants are processed first-come-first-served against a run-scoped capacity model.
//! Each applicant lands on the first technical team in their preference order that still
//! has a seat, or is waitlisted with a recorded reason. Assigned applicants are then
//! enrolled in every chosen constant team that has room. Every write goes through a
//! [`PersistenceGateway`] as soon as the decision is made, and the run produces an
//! [`AssignmentReport`] with a structured event trail and a downloadable text log.

pub mod directory;
pub mod domain;
mod engine;
pub mod events;
pub mod gateway;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use directory::{CapacityMap, CapacityRow, CapacitySlot, DirectoryError, TeamDirectory};
pub use domain::{
    AdditionalEnrollment, ApplicantId, ApplicantRecord, ApplicationStatus, AssignmentDecision,
    DecisionStatus, DeferralReason, DeferredApplicant, Team, TeamId, TeamKind,
};
pub use engine::AssignmentEngine;
pub use events::{AdditionalSkip, AssignmentEvent, CommitStage, Disqualification};
pub use gateway::{ApplicantOutcome, DiscardingGateway, GatewayError, PersistenceGateway};
pub use report::{render_log, AssignmentReport, AssignmentSummary};
pub use router::assignment_router;
pub use service::{AssignmentService, AssignmentServiceError};
