//! Vault: named zones of reusable values (prompts, keys, notes, snippets).
//!
//! Stored in vault.json as `{"zones": [...]}`. The manager is shared between
//! the UI-facing commands and the hotstring dispatch threads, so all state
//! sits behind a `RwLock` and every accessor returns owned snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StratumError};

/// Zones created for a fresh vault, in order
const DEFAULT_ZONES: [&str; 6] = ["Prompts", "API Keys", "Passwords", "Notes", "Snippets", "Other"];

/// Friendly lane names accepted in place of zone ids
const LANE_ALIASES: [(&str, &str); 6] = [
    ("prompts", "zone1"),
    ("api_keys", "zone2"),
    ("passwords", "zone3"),
    ("notes", "zone4"),
    ("snippets", "zone5"),
    ("other", "zone6"),
];

fn default_item_type() -> String {
    "note".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: String,
    /// Display label; falls back to the id
    #[serde(default)]
    pub label: String,
    /// "prompt", "api_key", "note", "snippet", ...
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub hotkey: String,
    #[serde(default)]
    pub hotstring: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultZone {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<VaultItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultFile {
    #[serde(default)]
    zones: Vec<VaultZone>,
}

/// Resolve a lane alias ("prompts") to its zone id; anything else is taken
/// as a zone id as-is.
pub fn zone_id_for_lane(lane: &str) -> &str {
    LANE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lane)
        .map(|(_, zone)| *zone)
        .unwrap_or(lane)
}

fn default_zones() -> Vec<VaultZone> {
    DEFAULT_ZONES
        .iter()
        .enumerate()
        .map(|(i, name)| VaultZone {
            id: format!("zone{}", i + 1),
            name: name.to_string(),
            items: Vec::new(),
        })
        .collect()
}

pub struct VaultManager {
    path: PathBuf,
    /// Zones in file order
    zones: RwLock<Vec<VaultZone>>,
}

impl VaultManager {
    pub fn new(vault_path: impl Into<PathBuf>) -> Self {
        Self {
            path: vault_path.into(),
            zones: RwLock::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the vault, creating the default zones when the file is missing.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<usize> {
        if !self.path.exists() {
            let file = VaultFile {
                zones: default_zones(),
            };
            self.write_file(&file)?;
            info!("Created default vault");
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| StratumError::io(&self.path, e))?;
        let raw = raw.trim();
        let file: VaultFile = if raw.is_empty() {
            VaultFile::default()
        } else {
            serde_json::from_str(raw).map_err(|e| StratumError::json(&self.path, e))?
        };

        let mut zones = file.zones;
        for zone in &mut zones {
            if zone.name.is_empty() {
                zone.name = zone.id.clone();
            }
            for item in &mut zone.items {
                if item.label.is_empty() {
                    item.label = item.id.clone();
                }
            }
        }

        let item_count: usize = zones.iter().map(|z| z.items.len()).sum();
        info!(zones = zones.len(), items = item_count, "Loaded vault");
        *self.zones.write() = zones;
        Ok(item_count)
    }

    pub fn save(&self) -> Result<()> {
        let file = VaultFile {
            zones: self.zones.read().clone(),
        };
        self.write_file(&file)?;
        debug!(path = %self.path.display(), "Saved vault");
        Ok(())
    }

    fn write_file(&self, file: &VaultFile) -> Result<()> {
        let content =
            serde_json::to_string_pretty(file).map_err(|e| StratumError::json(&self.path, e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StratumError::io(parent, e))?;
        }
        fs::write(&self.path, content).map_err(|e| StratumError::io(&self.path, e))
    }

    pub fn zones(&self) -> Vec<VaultZone> {
        self.zones.read().clone()
    }

    pub fn find_item(&self, item_id: &str) -> Option<VaultItem> {
        self.zones
            .read()
            .iter()
            .flat_map(|zone| zone.items.iter())
            .find(|item| item.id == item_id)
            .cloned()
    }

    /// Items of a lane (alias or zone id). With `include_pinned` the result is
    /// ordered pinned-first, then by case-insensitive label; otherwise it is
    /// in stored order. Unknown lanes yield nothing.
    pub fn get_lane_items(&self, lane: &str, include_pinned: bool) -> Vec<VaultItem> {
        let zone_id = zone_id_for_lane(lane);
        let zones = self.zones.read();
        let Some(zone) = zones.iter().find(|z| z.id == zone_id) else {
            return Vec::new();
        };

        let mut items = zone.items.clone();
        if include_pinned {
            items.sort_by_cached_key(|item| (!item.pinned, item.label.to_lowercase()));
        }
        items
    }

    /// Add an item to a lane and return its generated id.
    pub fn add_item(&self, label: &str, value: &str, lane: &str, item_type: &str) -> Result<String> {
        let zone_id = zone_id_for_lane(lane);
        let mut zones = self.zones.write();
        let zone = zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| StratumError::Vault(format!("Unknown vault lane '{}'", lane)))?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        zone.items.push(VaultItem {
            id: id.clone(),
            label: label.to_string(),
            item_type: item_type.to_string(),
            value: value.to_string(),
            pinned: false,
            hotkey: String::new(),
            hotstring: String::new(),
        });
        debug!(id = %id, zone = %zone_id, "Added vault item");
        Ok(id)
    }

    /// Remove an item from whichever zone holds it.
    pub fn delete_item(&self, item_id: &str) -> bool {
        let mut zones = self.zones.write();
        for zone in zones.iter_mut() {
            if let Some(pos) = zone.items.iter().position(|item| item.id == item_id) {
                zone.items.remove(pos);
                debug!(id = %item_id, zone = %zone.id, "Deleted vault item");
                return true;
            }
        }
        warn!(id = %item_id, "Vault item not found for delete");
        false
    }

    /// Set or clear the pinned flag. Returns false for unknown ids.
    pub fn set_pinned(&self, item_id: &str, pinned: bool) -> bool {
        let mut zones = self.zones.write();
        match zones
            .iter_mut()
            .flat_map(|zone| zone.items.iter_mut())
            .find(|item| item.id == item_id)
        {
            Some(item) => {
                item.pinned = pinned;
                true
            }
            None => false,
        }
    }
}
