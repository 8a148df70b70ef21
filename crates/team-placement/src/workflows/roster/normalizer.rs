use crate::workflows::assignment::{ApplicationStatus, TeamId, TeamKind};

pub(crate) fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a `;` or `|` separated cell into trimmed, non-empty ids.
pub(crate) fn split_team_ids(value: Option<&str>) -> Vec<TeamId> {
    value
        .unwrap_or_default()
        .split([';', '|'])
        .map(normalize_token)
        .filter(|token| !token.is_empty())
        .map(TeamId)
        .collect()
}

pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split([';', '|'])
        .map(normalize_token)
        .filter(|token| !token.is_empty())
        .collect()
}

pub(crate) fn parse_kind(value: &str) -> Option<TeamKind> {
    match normalize_token(value).to_ascii_lowercase().as_str() {
        "technical" | "tech" => Some(TeamKind::Technical),
        "constant" | "additional" => Some(TeamKind::Constant),
        _ => None,
    }
}

/// Legacy exports mark placed applicants as `accepted`; those are treated as assigned.
pub(crate) fn parse_status(value: Option<&str>) -> Option<ApplicationStatus> {
    match normalize_token(value.unwrap_or_default())
        .to_ascii_lowercase()
        .as_str()
    {
        "" | "pending" => Some(ApplicationStatus::Pending),
        "assigned" | "accepted" => Some(ApplicationStatus::Assigned),
        "waitlisted" | "waitlist" => Some(ApplicationStatus::Waitlisted),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_token(value)
}
