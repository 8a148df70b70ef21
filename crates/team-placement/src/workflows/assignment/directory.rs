use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use super::domain::{Team, TeamId, TeamKind};

/// Run-scoped seat counter for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacitySlot {
    pub team_id: TeamId,
    pub name: String,
    pub capacity: u32,
    pub occupancy: u32,
}

impl CapacitySlot {
    fn from_team(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            name: team.name.clone(),
            capacity: team.capacity,
            occupancy: team.occupancy,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    pub fn label(&self) -> String {
        team_label(&self.name, &self.team_id)
    }

    pub fn row(&self) -> CapacityRow {
        CapacityRow {
            team_id: self.team_id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
            occupancy: self.occupancy,
            remaining: self.remaining(),
        }
    }
}

pub(crate) fn team_label(name: &str, id: &TeamId) -> String {
    if name.trim().is_empty() {
        id.0.clone()
    } else {
        format!("{name} ({id})")
    }
}

/// Point-in-time capacity line used by the report tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityRow {
    pub team_id: TeamId,
    pub name: String,
    pub capacity: u32,
    pub occupancy: u32,
    pub remaining: u32,
}

/// Capacity model for one pool, seeded from the snapshot and mutated only during a run.
///
/// Slots keep snapshot order so report tables read the same way the directory does.
#[derive(Debug, Clone, Default)]
pub struct CapacityMap {
    slots: Vec<CapacitySlot>,
    index: HashMap<TeamId, usize>,
}

impl CapacityMap {
    fn insert(&mut self, team: &Team) {
        self.index.insert(team.id.clone(), self.slots.len());
        self.slots.push(CapacitySlot::from_team(team));
    }

    pub fn contains(&self, team_id: &TeamId) -> bool {
        self.index.contains_key(team_id)
    }

    pub fn get(&self, team_id: &TeamId) -> Option<&CapacitySlot> {
        self.index.get(team_id).map(|&position| &self.slots[position])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Take one seat, returning the new occupancy, or `None` when the team is full or unknown.
    pub fn reserve(&mut self, team_id: &TeamId) -> Option<u32> {
        let slot = self.slot_mut(team_id)?;
        if !slot.has_room() {
            return None;
        }
        slot.occupancy += 1;
        Some(slot.occupancy)
    }

    /// Give back a seat taken by [`CapacityMap::reserve`].
    pub fn release(&mut self, team_id: &TeamId) {
        if let Some(slot) = self.slot_mut(team_id) {
            slot.occupancy = slot.occupancy.saturating_sub(1);
        }
    }

    pub fn rows(&self) -> Vec<CapacityRow> {
        self.slots.iter().map(CapacitySlot::row).collect()
    }

    fn slot_mut(&mut self, team_id: &TeamId) -> Option<&mut CapacitySlot> {
        let position = *self.index.get(team_id)?;
        self.slots.get_mut(position)
    }
}

/// Both team pools, split by kind, for the duration of one run.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    technical: CapacityMap,
    constant: CapacityMap,
}

impl TeamDirectory {
    pub fn from_teams(teams: &[Team]) -> Result<Self, DirectoryError> {
        let mut directory = Self::default();

        for team in teams {
            if team.id.0.trim().is_empty() {
                return Err(DirectoryError::BlankTeamId {
                    name: team.name.clone(),
                });
            }
            if directory.kind_of(&team.id).is_some() {
                return Err(DirectoryError::DuplicateTeam(team.id.clone()));
            }
            if team.occupancy > team.capacity {
                warn!(
                    team = %team.id,
                    capacity = team.capacity,
                    occupancy = team.occupancy,
                    "team snapshot is over capacity; treating as full"
                );
            }

            match team.kind {
                TeamKind::Technical => directory.technical.insert(team),
                TeamKind::Constant => directory.constant.insert(team),
            }
        }

        Ok(directory)
    }

    pub fn kind_of(&self, team_id: &TeamId) -> Option<TeamKind> {
        if self.technical.contains(team_id) {
            Some(TeamKind::Technical)
        } else if self.constant.contains(team_id) {
            Some(TeamKind::Constant)
        } else {
            None
        }
    }

    pub fn technical(&self) -> &CapacityMap {
        &self.technical
    }

    pub fn technical_mut(&mut self) -> &mut CapacityMap {
        &mut self.technical
    }

    pub fn constant(&self) -> &CapacityMap {
        &self.constant
    }

    pub fn constant_mut(&mut self) -> &mut CapacityMap {
        &mut self.constant
    }
}

/// Snapshot problems that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("team directory lists '{0}' more than once")]
    DuplicateTeam(TeamId),
    #[error("team directory contains a team without an id (name '{name}')")]
    BlankTeamId { name: String },
}
