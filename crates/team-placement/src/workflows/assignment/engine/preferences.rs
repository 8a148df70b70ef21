use std::collections::HashSet;

use super::super::directory::CapacityMap;
use super::super::domain::{ApplicantId, TeamId};
use super::super::events::{AssignmentEvent, EventTrail};

/// Preferences reduced to technical teams that exist, in submitted order.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FilteredPreferences {
    pub(crate) teams: Vec<TeamId>,
    pub(crate) unknown: Vec<TeamId>,
    pub(crate) duplicates: Vec<TeamId>,
}

pub(crate) fn filter_preferences(preferences: &[TeamId], map: &CapacityMap) -> FilteredPreferences {
    let mut filtered = FilteredPreferences::default();
    let mut seen: HashSet<&TeamId> = HashSet::new();

    for team_id in preferences {
        if !map.contains(team_id) {
            filtered.unknown.push(team_id.clone());
        } else if !seen.insert(team_id) {
            filtered.duplicates.push(team_id.clone());
        } else {
            filtered.teams.push(team_id.clone());
        }
    }

    filtered
}

/// Result of walking a filtered preference list against the capacity map.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WalkOutcome {
    /// A seat was reserved; `rank` is 1-based over the filtered list.
    Accepted {
        team_id: TeamId,
        team_label: String,
        rank: usize,
        occupancy: u32,
    },
    /// Every filtered preference was full (or none existed).
    Exhausted,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct PreferenceWalk {
    pub(crate) outcome: WalkOutcome,
    pub(crate) full_teams: Vec<String>,
}

/// Reserve a seat on the first preferred team with room.
pub(crate) fn walk_preferences(
    applicant_id: &ApplicantId,
    filtered: &FilteredPreferences,
    map: &mut CapacityMap,
    trail: &mut EventTrail,
) -> PreferenceWalk {
    let mut full_teams = Vec::new();

    for (index, team_id) in filtered.teams.iter().enumerate() {
        let rank = index + 1;
        let Some(slot) = map.get(team_id) else {
            continue;
        };
        let team_label = slot.label();
        let remaining = slot.remaining();

        match map.reserve(team_id) {
            Some(occupancy) => {
                trail.push(AssignmentEvent::TeamConsidered {
                    applicant_id: applicant_id.clone(),
                    team_id: team_id.clone(),
                    team_label: team_label.clone(),
                    rank,
                    remaining,
                    accepted: true,
                });
                return PreferenceWalk {
                    outcome: WalkOutcome::Accepted {
                        team_id: team_id.clone(),
                        team_label,
                        rank,
                        occupancy,
                    },
                    full_teams,
                };
            }
            None => {
                trail.push(AssignmentEvent::TeamConsidered {
                    applicant_id: applicant_id.clone(),
                    team_id: team_id.clone(),
                    team_label: team_label.clone(),
                    rank,
                    remaining,
                    accepted: false,
                });
                full_teams.push(team_label);
            }
        }
    }

    PreferenceWalk {
        outcome: WalkOutcome::Exhausted,
        full_teams,
    }
}
