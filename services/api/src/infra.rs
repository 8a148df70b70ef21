use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use team_placement::config::RosterConfig;
use team_placement::workflows::assignment::{
    AdditionalEnrollment, ApplicantId, ApplicantOutcome, ApplicantRecord, ApplicationStatus,
    GatewayError, PersistenceGateway, Team, TeamId,
};
use team_placement::workflows::roster::{RosterImportError, RosterImporter, RosterSnapshot};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store standing in for the club database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryGateway {
    teams: Arc<Mutex<Vec<Team>>>,
    applicants: Arc<Mutex<BTreeMap<ApplicantId, ApplicantRecord>>>,
    enrollments: Arc<Mutex<HashSet<AdditionalEnrollment>>>,
}

impl InMemoryGateway {
    pub(crate) fn from_snapshot(snapshot: RosterSnapshot) -> Self {
        let applicants = snapshot
            .applicants
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        Self {
            teams: Arc::new(Mutex::new(snapshot.teams)),
            applicants: Arc::new(Mutex::new(applicants)),
            enrollments: Arc::default(),
        }
    }

    /// Seed from the configured CSV exports; missing paths leave that side empty.
    pub(crate) fn from_config(config: &RosterConfig) -> Result<Self, RosterImportError> {
        let teams = match &config.teams_csv {
            Some(path) => RosterImporter::teams_from_path(path)?,
            None => Vec::new(),
        };
        let applicants = match &config.applicants_csv {
            Some(path) => RosterImporter::applicants_from_path(path)?,
            None => Vec::new(),
        };

        info!(
            teams = teams.len(),
            applicants = applicants.len(),
            "seeded in-memory roster"
        );
        Ok(Self::from_snapshot(RosterSnapshot { teams, applicants }))
    }

    pub(crate) fn teams(&self) -> Vec<Team> {
        lock(&self.teams).map(|teams| teams.clone()).unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, GatewayError> {
    mutex
        .lock()
        .map_err(|_| GatewayError::Unavailable("in-memory store lock poisoned".to_string()))
}

impl PersistenceGateway for InMemoryGateway {
    fn load_teams(&self) -> Result<Vec<Team>, GatewayError> {
        Ok(lock(&self.teams)?.clone())
    }

    fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError> {
        Ok(lock(&self.applicants)?
            .values()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .cloned()
            .collect())
    }

    fn record_outcome(&self, outcome: &ApplicantOutcome) -> Result<(), GatewayError> {
        let mut guard = lock(&self.applicants)?;
        let record = guard
            .get_mut(&outcome.applicant_id)
            .ok_or_else(|| GatewayError::NotFound(outcome.applicant_id.to_string()))?;
        record.status = outcome.status;
        record.assigned_team_id = outcome.assigned_team_id.clone();
        record.assignment_reason = Some(outcome.assignment_reason.clone());
        Ok(())
    }

    fn set_occupancy(&self, team_id: &TeamId, occupancy: u32) -> Result<(), GatewayError> {
        let mut guard = lock(&self.teams)?;
        let team = guard
            .iter_mut()
            .find(|team| &team.id == team_id)
            .ok_or_else(|| GatewayError::NotFound(team_id.to_string()))?;
        team.occupancy = occupancy;
        Ok(())
    }

    fn enroll_additional(&self, enrollment: &AdditionalEnrollment) -> Result<(), GatewayError> {
        let mut guard = lock(&self.enrollments)?;
        if !guard.insert(enrollment.clone()) {
            return Err(GatewayError::Duplicate(format!(
                "{} is already enrolled in {}",
                enrollment.applicant_id, enrollment.team_id
            )));
        }
        Ok(())
    }
}
