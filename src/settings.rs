//! Engine settings, read from YAML (or JSON, which YAML accepts).
//! Every field has a default; a missing settings file means all defaults.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::loadout::{ContainerKind, Slot};

pub const DEFAULT_SETTINGS_PATH: &str = "loadout.yaml";
pub const SETTINGS_PATH_ENV: &str = "LOADOUT_SETTINGS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub parse: ParseSettings,
    pub loadout: LoadoutSettings,
    /// Worker threads for parallel instantiation; 0 uses every core.
    pub workers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    /// Match class names exactly instead of ignoring case.
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutSettings {
    /// Pool entry meaning "leave the unit's current item in place".
    pub keep_marker: String,
    /// Random-pool slots left untouched, rather than cleared, when empty.
    pub keep_when_empty: Vec<Slot>,
    pub capacity: CapacitySettings,
    /// Load units per item class; unlisted items use `default_item_load`.
    pub item_load: HashMap<String, u32>,
    pub default_item_load: u32,
}

impl Default for LoadoutSettings {
    fn default() -> Self {
        Self {
            keep_marker: "Default".to_string(),
            keep_when_empty: vec![Slot::Faces, Slot::Insignias],
            capacity: CapacitySettings::default(),
            item_load: HashMap::new(),
            default_item_load: 1,
        }
    }
}

impl LoadoutSettings {
    pub fn item_load(&self, item: &str) -> u32 {
        self.item_load
            .get(item)
            .copied()
            .unwrap_or(self.default_item_load)
    }

    pub fn keeps_when_empty(&self, slot: Slot) -> bool {
        self.keep_when_empty.contains(&slot)
    }
}

/// Container capacities in load units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitySettings {
    pub uniform: u32,
    pub vest: u32,
    pub backpack: u32,
    /// Capacity of specific container classes, e.g. `B_Carryall_cbr: 120`.
    pub overrides: HashMap<String, u32>,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            uniform: 20,
            vest: 40,
            backpack: 80,
            overrides: HashMap::new(),
        }
    }
}

impl CapacitySettings {
    pub fn default_for(&self, kind: ContainerKind) -> u32 {
        match kind {
            ContainerKind::Uniform => self.uniform,
            ContainerKind::Vest => self.vest,
            ContainerKind::Backpack => self.backpack,
        }
    }

    /// Capacity of a concrete container item, or the kind default.
    pub fn of_item(&self, kind: ContainerKind, item: &str) -> u32 {
        self.overrides
            .get(item)
            .copied()
            .unwrap_or_else(|| self.default_for(kind))
    }
}

/// Load settings from `path`. A missing file yields defaults; an unreadable or
/// malformed one is an error.
pub fn load_settings(path: impl AsRef<Path>) -> Result<EngineSettings, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(EngineSettings::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(EngineSettings::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| LoadError::Settings {
        path: path.to_path_buf(),
        source,
    })
}
