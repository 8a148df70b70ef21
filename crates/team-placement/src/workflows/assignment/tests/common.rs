use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assignment::domain::{
    AdditionalEnrollment, ApplicantId, ApplicantRecord, ApplicationStatus, Team, TeamId,
};
use crate::workflows::assignment::gateway::{ApplicantOutcome, GatewayError, PersistenceGateway};
use crate::workflows::assignment::{AssignmentEngine, AssignmentReport, AssignmentService};

pub(super) fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn run_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 2, 18, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn applicant(id: &str, minute: u32, preferences: &[&str]) -> ApplicantRecord {
    ApplicantRecord::pending(id, at(minute)).with_preferences(preferences)
}

pub(super) fn team_id(id: &str) -> TeamId {
    TeamId(id.to_string())
}

pub(super) fn applicant_id(id: &str) -> ApplicantId {
    ApplicantId(id.to_string())
}

/// Two technical teams and two constant teams with a mix of free and full seats.
pub(super) fn club_teams() -> Vec<Team> {
    vec![
        Team::technical("web", "Web Platform", 2, 0),
        Team::technical("infra", "Infrastructure", 1, 0),
        Team::constant("events", "Events", 10, 4),
        Team::constant("media", "Media", 1, 1),
    ]
}

pub(super) fn engine_for(gateway: &Arc<MemoryGateway>) -> AssignmentEngine<MemoryGateway> {
    AssignmentEngine::new(gateway.clone())
}

pub(super) fn run_engine(
    gateway: &Arc<MemoryGateway>,
    teams: &[Team],
    applicants: &[ApplicantRecord],
) -> AssignmentReport {
    engine_for(gateway)
        .run_at(teams, applicants, run_time())
        .expect("directory is valid")
}

/// Gateway backed by in-process maps with switchable failure injection.
#[derive(Default)]
pub(super) struct MemoryGateway {
    teams: Mutex<Vec<Team>>,
    applicants: Mutex<Vec<ApplicantRecord>>,
    enrollments: Mutex<Vec<AdditionalEnrollment>>,
    outcome_writes: Mutex<Vec<ApplicantOutcome>>,
    occupancy_writes: Mutex<Vec<(TeamId, u32)>>,
    failing_outcomes: Mutex<HashSet<ApplicantId>>,
    failing_occupancy: Mutex<HashMap<TeamId, usize>>,
    rejected_enrollments: Mutex<HashSet<TeamId>>,
}

impl MemoryGateway {
    pub(super) fn seeded(teams: Vec<Team>, applicants: Vec<ApplicantRecord>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.teams.lock().expect("teams mutex poisoned") = teams;
        *gateway.applicants.lock().expect("applicants mutex poisoned") = applicants;
        Arc::new(gateway)
    }

    pub(super) fn fail_outcome_for(&self, id: &str) {
        self.failing_outcomes
            .lock()
            .expect("failure mutex poisoned")
            .insert(applicant_id(id));
    }

    /// Fail the next `times` occupancy writes for a team.
    pub(super) fn fail_occupancy_for(&self, id: &str, times: usize) {
        self.failing_occupancy
            .lock()
            .expect("failure mutex poisoned")
            .insert(team_id(id), times);
    }

    pub(super) fn reject_enrollments_on(&self, id: &str) {
        self.rejected_enrollments
            .lock()
            .expect("failure mutex poisoned")
            .insert(team_id(id));
    }

    pub(super) fn team(&self, id: &str) -> Team {
        self.teams
            .lock()
            .expect("teams mutex poisoned")
            .iter()
            .find(|team| team.id.0 == id)
            .cloned()
            .expect("team present")
    }

    pub(super) fn applicant(&self, id: &str) -> ApplicantRecord {
        self.applicants
            .lock()
            .expect("applicants mutex poisoned")
            .iter()
            .find(|record| record.id.0 == id)
            .cloned()
            .expect("applicant present")
    }

    pub(super) fn enrollments(&self) -> Vec<AdditionalEnrollment> {
        self.enrollments
            .lock()
            .expect("enrollment mutex poisoned")
            .clone()
    }

    pub(super) fn outcome_writes(&self) -> Vec<ApplicantOutcome> {
        self.outcome_writes
            .lock()
            .expect("outcome mutex poisoned")
            .clone()
    }

    pub(super) fn occupancy_writes(&self) -> Vec<(TeamId, u32)> {
        self.occupancy_writes
            .lock()
            .expect("occupancy mutex poisoned")
            .clone()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_teams(&self) -> Result<Vec<Team>, GatewayError> {
        Ok(self.teams.lock().expect("teams mutex poisoned").clone())
    }

    fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError> {
        Ok(self
            .applicants
            .lock()
            .expect("applicants mutex poisoned")
            .iter()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .cloned()
            .collect())
    }

    fn record_outcome(&self, outcome: &ApplicantOutcome) -> Result<(), GatewayError> {
        if self
            .failing_outcomes
            .lock()
            .expect("failure mutex poisoned")
            .contains(&outcome.applicant_id)
        {
            return Err(GatewayError::Unavailable("applicant table locked".to_string()));
        }

        let mut applicants = self.applicants.lock().expect("applicants mutex poisoned");
        let record = applicants
            .iter_mut()
            .find(|record| record.id == outcome.applicant_id)
            .ok_or_else(|| GatewayError::NotFound(outcome.applicant_id.0.clone()))?;
        record.status = outcome.status;
        record.assigned_team_id = outcome.assigned_team_id.clone();
        record.assignment_reason = Some(outcome.assignment_reason.clone());

        self.outcome_writes
            .lock()
            .expect("outcome mutex poisoned")
            .push(outcome.clone());
        Ok(())
    }

    fn set_occupancy(&self, team_id: &TeamId, occupancy: u32) -> Result<(), GatewayError> {
        {
            let mut failing = self.failing_occupancy.lock().expect("failure mutex poisoned");
            if let Some(remaining) = failing.get_mut(team_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(GatewayError::Unavailable("team table locked".to_string()));
                }
            }
        }

        let mut teams = self.teams.lock().expect("teams mutex poisoned");
        let team = teams
            .iter_mut()
            .find(|team| &team.id == team_id)
            .ok_or_else(|| GatewayError::NotFound(team_id.0.clone()))?;
        team.occupancy = occupancy;

        self.occupancy_writes
            .lock()
            .expect("occupancy mutex poisoned")
            .push((team_id.clone(), occupancy));
        Ok(())
    }

    fn enroll_additional(&self, enrollment: &AdditionalEnrollment) -> Result<(), GatewayError> {
        if self
            .rejected_enrollments
            .lock()
            .expect("failure mutex poisoned")
            .contains(&enrollment.team_id)
        {
            return Err(GatewayError::Unavailable("enrollment table locked".to_string()));
        }

        let mut enrollments = self.enrollments.lock().expect("enrollment mutex poisoned");
        if enrollments.contains(enrollment) {
            return Err(GatewayError::Duplicate(format!(
                "{} already enrolled in {}",
                enrollment.applicant_id, enrollment.team_id
            )));
        }
        enrollments.push(enrollment.clone());
        Ok(())
    }
}

/// Gateway whose snapshot cannot be read.
pub(super) struct UnavailableGateway;

impl PersistenceGateway for UnavailableGateway {
    fn load_teams(&self) -> Result<Vec<Team>, GatewayError> {
        Err(GatewayError::Unavailable("database offline".to_string()))
    }

    fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError> {
        Err(GatewayError::Unavailable("database offline".to_string()))
    }

    fn record_outcome(&self, _outcome: &ApplicantOutcome) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("database offline".to_string()))
    }

    fn set_occupancy(&self, _team_id: &TeamId, _occupancy: u32) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("database offline".to_string()))
    }

    fn enroll_additional(&self, _enrollment: &AdditionalEnrollment) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn service_for(gateway: &Arc<MemoryGateway>) -> AssignmentService<MemoryGateway> {
    AssignmentService::new(gateway.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
