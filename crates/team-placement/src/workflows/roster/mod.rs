//! CSV import of the team directory and applicant pool.

mod normalizer;
mod parser;

use crate::workflows::assignment::{ApplicantRecord, Team};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::InvalidField { row, column, value } => write!(
                f,
                "roster row {} has an invalid {} value '{}'",
                row, column, value
            ),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Teams and applicants loaded together for one run.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    pub teams: Vec<Team>,
    pub applicants: Vec<ApplicantRecord>,
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_paths<T: AsRef<Path>, A: AsRef<Path>>(
        teams: T,
        applicants: A,
    ) -> Result<RosterSnapshot, RosterImportError> {
        Ok(RosterSnapshot {
            teams: Self::teams_from_path(teams)?,
            applicants: Self::applicants_from_path(applicants)?,
        })
    }

    pub fn teams_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Team>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::teams_from_reader(file)
    }

    pub fn applicants_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ApplicantRecord>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::applicants_from_reader(file)
    }

    pub fn teams_from_reader<R: Read>(reader: R) -> Result<Vec<Team>, RosterImportError> {
        parser::parse_teams(reader)
    }

    pub fn applicants_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ApplicantRecord>, RosterImportError> {
        parser::parse_applicants(reader)
    }
}
