//! World state that outlives a map visit: collected pickups, opened doors
//! and the pickup counters.

use std::collections::HashMap;

use engine::Level;
use tracing::debug;

use super::map::RpgMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WorldRecord {
    Coin { collected: bool },
    Key { collected: bool },
    Door { tile: (i32, i32), level: Level, open: bool },
}

impl WorldRecord {
    /// Inactive records stop their entity from spawning again.
    pub(crate) fn is_inactive(&self) -> bool {
        match self {
            WorldRecord::Coin { collected } | WorldRecord::Key { collected } => *collected,
            WorldRecord::Door { open, .. } => *open,
        }
    }

    /// Re-applies map changes this record implies. An open door makes its
    /// level walkable on the tile below the door.
    pub(crate) fn apply_map_actions(&self, map: &mut RpgMap) {
        if let WorldRecord::Door {
            tile: (x, y),
            level,
            open: true,
        } = self
        {
            if !map.add_level(*x, y + 1, *level) {
                debug!(map = map.name(), x, y = y + 1, "door_tile_missing");
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Registry {
    records: HashMap<String, WorldRecord>,
    coins: u32,
    keys: u32,
}

/// Copy of the registry taken at a checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegistrySnapshot(Registry);

impl Registry {
    pub(crate) fn record(&mut self, uid: impl Into<String>, record: WorldRecord) {
        self.records.insert(uid.into(), record);
    }

    pub(crate) fn get(&self, uid: &str) -> Option<&WorldRecord> {
        self.records.get(uid)
    }

    pub(crate) fn coins(&self) -> u32 {
        self.coins
    }

    pub(crate) fn keys(&self) -> u32 {
        self.keys
    }

    pub(crate) fn add_coin(&mut self) {
        self.coins += 1;
    }

    pub(crate) fn add_key(&mut self) {
        self.keys += 1;
    }

    /// Spends one key. False when there is none to spend.
    pub(crate) fn take_key(&mut self) -> bool {
        if self.keys == 0 {
            return false;
        }
        self.keys -= 1;
        true
    }

    pub(crate) fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot(self.clone())
    }

    pub(crate) fn restore(&mut self, snapshot: &RegistrySnapshot) {
        self.clone_from(&snapshot.0);
    }
}
