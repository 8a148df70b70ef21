use std::sync::{Arc, Mutex, TryLockError};

use chrono::{DateTime, Utc};
use tracing::info;

use super::directory::DirectoryError;
use super::domain::{ApplicantRecord, Team};
use super::engine::AssignmentEngine;
use super::gateway::{DiscardingGateway, GatewayError, PersistenceGateway};
use super::report::AssignmentReport;

/// Admin-facing entry point: loads the current snapshot and runs the engine against it.
///
/// At most one committing run is active at a time.
pub struct AssignmentService<G> {
    gateway: Arc<G>,
    engine: AssignmentEngine<G>,
    run_lock: Mutex<()>,
}

impl<G> AssignmentService<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let engine = AssignmentEngine::new(gateway.clone());
        Self {
            gateway,
            engine,
            run_lock: Mutex::new(()),
        }
    }

    /// Assign every pending applicant and commit the outcomes.
    pub fn run(&self) -> Result<AssignmentReport, AssignmentServiceError> {
        self.run_at(Utc::now())
    }

    pub fn run_at(
        &self,
        generated_at: DateTime<Utc>,
    ) -> Result<AssignmentReport, AssignmentServiceError> {
        let _guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(AssignmentServiceError::RunInProgress),
        };

        let (teams, applicants) = self.snapshot()?;
        let report = self.engine.run_at(&teams, &applicants, generated_at)?;
        Ok(report)
    }

    /// Compute the report for the current snapshot without writing anything.
    pub fn preview(&self) -> Result<AssignmentReport, AssignmentServiceError> {
        let (teams, applicants) = self.snapshot()?;
        let engine = AssignmentEngine::new(Arc::new(DiscardingGateway));
        let report = engine.run(&teams, &applicants)?;
        Ok(report)
    }

    fn snapshot(&self) -> Result<(Vec<Team>, Vec<ApplicantRecord>), AssignmentServiceError> {
        let teams = self
            .gateway
            .load_teams()
            .map_err(AssignmentServiceError::TeamDirectory)?;
        let applicants = self
            .gateway
            .load_pending_applicants()
            .map_err(AssignmentServiceError::ApplicantPool)?;

        info!(
            teams = teams.len(),
            applicants = applicants.len(),
            "loaded assignment snapshot"
        );
        Ok((teams, applicants))
    }
}

/// Failures that stop a run before any applicant is processed.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentServiceError {
    #[error("team directory could not be loaded: {0}")]
    TeamDirectory(#[source] GatewayError),
    #[error("applicant pool could not be loaded: {0}")]
    ApplicantPool(#[source] GatewayError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("an assignment run is already in progress")]
    RunInProgress,
}
