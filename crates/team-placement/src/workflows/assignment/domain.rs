use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for teams in either pool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which pool a team belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamKind {
    /// Primary, preference-ranked assignment target.
    Technical,
    /// Secondary pool with independent, non-exclusive enrollment.
    Constant,
}

impl TeamKind {
    pub const fn label(self) -> &'static str {
        match self {
            TeamKind::Technical => "technical",
            TeamKind::Constant => "constant",
        }
    }
}

/// Team snapshot as held by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub kind: TeamKind,
    pub capacity: u32,
    pub occupancy: u32,
}

impl Team {
    pub fn technical(id: &str, name: &str, capacity: u32, occupancy: u32) -> Self {
        Self::new(id, name, TeamKind::Technical, capacity, occupancy)
    }

    pub fn constant(id: &str, name: &str, capacity: u32, occupancy: u32) -> Self {
        Self::new(id, name, TeamKind::Constant, capacity, occupancy)
    }

    fn new(id: &str, name: &str, kind: TeamKind, capacity: u32, occupancy: u32) -> Self {
        Self {
            id: TeamId(id.to_string()),
            name: name.to_string(),
            kind,
            capacity,
            occupancy,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    pub fn has_room(&self) -> bool {
        self.occupancy < self.capacity
    }
}

/// Lifecycle status of an application with respect to team placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Assigned,
    Waitlisted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Assigned => "assigned",
            ApplicationStatus::Waitlisted => "waitlisted",
        }
    }
}

/// Applicant row as loaded from the persistence gateway.
///
/// `submitted_at` stays optional so that incomplete rows survive loading and can be
/// rejected per applicant instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    #[serde(default)]
    pub name: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub technical_preferences: Vec<TeamId>,
    #[serde(default)]
    pub additional_team_choices: Vec<TeamId>,
    pub has_availability: bool,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub assigned_team_id: Option<TeamId>,
    #[serde(default)]
    pub assignment_reason: Option<String>,
}

impl ApplicantRecord {
    /// Minimal pending applicant; callers fill in preferences and choices.
    pub fn pending(id: &str, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: ApplicantId(id.to_string()),
            name: String::new(),
            submitted_at: Some(submitted_at),
            status: ApplicationStatus::Pending,
            technical_preferences: Vec::new(),
            additional_team_choices: Vec::new(),
            has_availability: true,
            skills: Vec::new(),
            assigned_team_id: None,
            assignment_reason: None,
        }
    }

    pub fn with_preferences(mut self, preferences: &[&str]) -> Self {
        self.technical_preferences = preferences
            .iter()
            .map(|id| TeamId((*id).to_string()))
            .collect();
        self
    }

    pub fn with_additional(mut self, choices: &[&str]) -> Self {
        self.additional_team_choices = choices.iter().map(|id| TeamId((*id).to_string())).collect();
        self
    }

    pub fn without_availability(mut self) -> Self {
        self.has_availability = false;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

/// Terminal outcome of one applicant within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Assigned,
    Waitlisted,
}

impl DecisionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DecisionStatus::Assigned => "assigned",
            DecisionStatus::Waitlisted => "waitlisted",
        }
    }

    pub const fn application_status(self) -> ApplicationStatus {
        match self {
            DecisionStatus::Assigned => ApplicationStatus::Assigned,
            DecisionStatus::Waitlisted => ApplicationStatus::Waitlisted,
        }
    }
}

/// Committed decision for one applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub applicant_id: ApplicantId,
    pub assigned_team_id: Option<TeamId>,
    pub status: DecisionStatus,
    pub reasoning: String,
    /// 1-based position within the filtered preference list, set only when assigned.
    pub preference_rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_enrollments: Vec<AdditionalEnrollment>,
}

impl AssignmentDecision {
    pub fn is_assigned(&self) -> bool {
        self.status == DecisionStatus::Assigned
    }
}

/// Secondary enrollment of an assigned applicant on a constant team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdditionalEnrollment {
    pub applicant_id: ApplicantId,
    pub team_id: TeamId,
}

/// Why an applicant was left pending for a later run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DeferralReason {
    Malformed(String),
    CommitFailed(String),
}

impl DeferralReason {
    pub fn summary(&self) -> String {
        match self {
            DeferralReason::Malformed(detail) => format!("malformed application: {detail}"),
            DeferralReason::CommitFailed(detail) => format!("commit failed: {detail}"),
        }
    }
}

/// Applicant that stays pending after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredApplicant {
    pub applicant_id: ApplicantId,
    pub reason: DeferralReason,
}
