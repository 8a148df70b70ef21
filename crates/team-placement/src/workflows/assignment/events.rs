use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicantId, AssignmentDecision, TeamId};

/// Hard disqualifiers checked before any capacity is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disqualification {
    NoPreferences,
    NoAvailability,
}

impl Disqualification {
    pub const fn reasoning(self) -> &'static str {
        match self {
            Disqualification::NoPreferences => "no team preferences provided.",
            Disqualification::NoAvailability => "no time availability provided.",
        }
    }
}

/// Write that failed while committing a primary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStage {
    TeamOccupancy,
    ApplicantOutcome,
}

impl CommitStage {
    pub const fn label(self) -> &'static str {
        match self {
            CommitStage::TeamOccupancy => "team occupancy",
            CommitStage::ApplicantOutcome => "applicant outcome",
        }
    }
}

/// Reason an additional-team choice was not enrolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AdditionalSkip {
    UnknownTeam,
    NotConstant,
    Full,
    EnrollmentFailed(String),
}

impl AdditionalSkip {
    pub fn summary(&self) -> String {
        match self {
            AdditionalSkip::UnknownTeam => "team does not exist".to_string(),
            AdditionalSkip::NotConstant => "not an additional team".to_string(),
            AdditionalSkip::Full => "team is full".to_string(),
            AdditionalSkip::EnrollmentFailed(error) => format!("enrollment failed: {error}"),
        }
    }
}

/// Structured trail of what happened during a run, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AssignmentEvent {
    ApplicantRejected {
        applicant_id: ApplicantId,
        problem: String,
    },
    ApplicantStarted {
        applicant_id: ApplicantId,
        position: usize,
        submitted_at: DateTime<Utc>,
    },
    Disqualified {
        applicant_id: ApplicantId,
        reason: Disqualification,
    },
    UnknownPreference {
        applicant_id: ApplicantId,
        team_id: TeamId,
    },
    DuplicatePreference {
        applicant_id: ApplicantId,
        team_id: TeamId,
    },
    TeamConsidered {
        applicant_id: ApplicantId,
        team_id: TeamId,
        team_label: String,
        rank: usize,
        remaining: u32,
        accepted: bool,
    },
    Decided {
        decision: AssignmentDecision,
    },
    CommitFailed {
        applicant_id: ApplicantId,
        stage: CommitStage,
        error: String,
    },
    CompensationFailed {
        applicant_id: ApplicantId,
        team_id: TeamId,
        error: String,
    },
    AdditionalEnrolled {
        applicant_id: ApplicantId,
        team_id: TeamId,
        team_label: String,
        occupancy: u32,
        capacity: u32,
        occupancy_recorded: bool,
    },
    AdditionalSkipped {
        applicant_id: ApplicantId,
        team_id: TeamId,
        reason: AdditionalSkip,
    },
}

/// Append-only event buffer threaded through a run.
#[derive(Debug, Default)]
pub(crate) struct EventTrail {
    events: Vec<AssignmentEvent>,
}

impl EventTrail {
    pub(crate) fn push(&mut self, event: AssignmentEvent) {
        self.events.push(event);
    }

    pub(crate) fn into_events(self) -> Vec<AssignmentEvent> {
        self.events
    }
}
