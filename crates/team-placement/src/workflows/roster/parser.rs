use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

use super::normalizer::{normalize_token, parse_kind, parse_status, split_list, split_team_ids};
use super::RosterImportError;
use crate::workflows::assignment::{ApplicantId, ApplicantRecord, Team, TeamId};

pub(crate) fn parse_teams<R: Read>(reader: R) -> Result<Vec<Team>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut teams = Vec::new();

    for (index, record) in csv_reader.deserialize::<TeamRow>().enumerate() {
        let row = record?;
        let kind = parse_kind(&row.kind).ok_or_else(|| RosterImportError::InvalidField {
            row: index + 1,
            column: "Kind",
            value: row.kind.clone(),
        })?;

        teams.push(Team {
            id: TeamId(normalize_token(&row.id)),
            name: normalize_token(&row.name),
            kind,
            capacity: row.capacity,
            occupancy: row.occupancy.unwrap_or(0),
        });
    }

    Ok(teams)
}

pub(crate) fn parse_applicants<R: Read>(
    reader: R,
) -> Result<Vec<ApplicantRecord>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut applicants = Vec::new();

    for (index, record) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
        let row = record?;
        let status =
            parse_status(row.status.as_deref()).ok_or_else(|| RosterImportError::InvalidField {
                row: index + 1,
                column: "Status",
                value: row.status.clone().unwrap_or_default(),
            })?;

        let submitted_at = row.submitted_at.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(applicant = %row.id, value = raw, "unreadable submission timestamp");
            }
            parsed
        });

        applicants.push(ApplicantRecord {
            id: ApplicantId(normalize_token(&row.id)),
            name: row.name.as_deref().map(normalize_token).unwrap_or_default(),
            submitted_at,
            status,
            technical_preferences: split_team_ids(row.technical_preferences.as_deref()),
            additional_team_choices: split_team_ids(row.additional_teams.as_deref()),
            has_availability: row.availability.is_some(),
            skills: split_list(row.skills.as_deref()),
            assigned_team_id: row
                .assigned_team
                .as_deref()
                .map(|id| TeamId(normalize_token(id))),
            assignment_reason: None,
        });
    }

    Ok(applicants)
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    #[serde(rename = "Team ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Kind")]
    kind: String,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(rename = "Occupancy", default)]
    occupancy: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    #[serde(rename = "Applicant ID")]
    id: String,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(
        rename = "Submitted At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    submitted_at: Option<String>,
    #[serde(
        rename = "Technical Preferences",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    technical_preferences: Option<String>,
    #[serde(
        rename = "Additional Teams",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    additional_teams: Option<String>,
    #[serde(
        rename = "Availability",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    availability: Option<String>,
    #[serde(rename = "Skills", default, deserialize_with = "empty_string_as_none")]
    skills: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(
        rename = "Assigned Team",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    assigned_team: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_timestamp_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(value)
}
