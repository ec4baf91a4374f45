//! Content definition tables
//!
//! Keyed lookup from subtype string to static stat/behavior config, injected
//! into areas at content-generation time. The core reads only the fields it
//! needs and treats the rest of a host's data as none of its business.
//! Unknown subtype keys are a reportable error, never a crash; unknown AI
//! tags are caught at load time by the closed `AiType` enum.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::types::SpawnKind;

/// Behavior tag resolved by the AI collaborator. Closed set, validated at
/// load: a tag outside this list fails parsing instead of silently defaulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiType {
    Passive,
    Defensive,
    Aggressive,
    Patrol,
    Stationary,
}

/// Static per-subtype configuration read by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubtypeConfig {
    pub level: u32,
    pub base_health: f32,
    pub base_attack_power: f32,
    pub base_armor: f32,
    /// Default respawn interval in seconds for definitions of this subtype
    pub respawn_time: f32,
    pub ai_type: AiType,
}

impl SubtypeConfig {
    /// Plain config for inert subtypes (resources, structures).
    pub fn inert(respawn_time: f32) -> Self {
        Self {
            level: 1,
            base_health: 1.0,
            base_attack_power: 0.0,
            base_armor: 0.0,
            respawn_time,
            ai_type: AiType::Stationary,
        }
    }
}

/// All four definition tables, keyed by subtype string.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentTables {
    #[serde(default)]
    enemies: HashMap<String, SubtypeConfig>,
    #[serde(default)]
    npcs: HashMap<String, SubtypeConfig>,
    #[serde(default)]
    resources: HashMap<String, SubtypeConfig>,
    #[serde(default)]
    structures: HashMap<String, SubtypeConfig>,
}

impl ContentTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| WorldError::TableLoad {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| WorldError::TableLoad {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Parse tables from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, WorldError> {
        serde_json::from_str(text).map_err(|e| WorldError::TableLoad {
            path: "<inline>".to_string(),
            detail: e.to_string(),
        })
    }

    /// Register a subtype. Intended for hosts that build tables in code.
    pub fn insert(&mut self, kind: SpawnKind, subtype: impl Into<String>, config: SubtypeConfig) {
        self.table_mut(kind).insert(subtype.into(), config);
    }

    /// Look up the static config for a subtype, or `None` for unknown keys.
    pub fn lookup(&self, kind: SpawnKind, subtype: &str) -> Option<&SubtypeConfig> {
        self.table(kind).get(subtype)
    }

    /// All registered subtype keys for a kind, sorted for stable iteration.
    pub fn subtypes(&self, kind: SpawnKind) -> Vec<&str> {
        let mut keys: Vec<&str> = self.table(kind).keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.enemies.len() + self.npcs.len() + self.resources.len() + self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, kind: SpawnKind) -> &HashMap<String, SubtypeConfig> {
        match kind {
            SpawnKind::Enemy => &self.enemies,
            SpawnKind::Npc => &self.npcs,
            SpawnKind::Resource => &self.resources,
            SpawnKind::Structure => &self.structures,
        }
    }

    fn table_mut(&mut self, kind: SpawnKind) -> &mut HashMap<String, SubtypeConfig> {
        match kind {
            SpawnKind::Enemy => &mut self.enemies,
            SpawnKind::Npc => &mut self.npcs,
            SpawnKind::Resource => &mut self.resources,
            SpawnKind::Structure => &mut self.structures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> &'static str {
        r#"{
            "enemies": {
                "gnoll": {
                    "level": 3,
                    "base_health": 60.0,
                    "base_attack_power": 8.0,
                    "base_armor": 2.0,
                    "respawn_time": 45.0,
                    "ai_type": "aggressive"
                }
            },
            "resources": {
                "copper_vein": {
                    "level": 1,
                    "base_health": 1.0,
                    "base_attack_power": 0.0,
                    "base_armor": 0.0,
                    "respawn_time": 120.0,
                    "ai_type": "stationary"
                }
            }
        }"#
    }

    #[test]
    fn test_parse_and_lookup() {
        let tables = ContentTables::from_json(sample_json()).unwrap();

        let gnoll = tables.lookup(SpawnKind::Enemy, "gnoll").unwrap();
        assert_eq!(gnoll.level, 3);
        assert_eq!(gnoll.ai_type, AiType::Aggressive);

        assert!(tables.lookup(SpawnKind::Enemy, "unknown").is_none());
        assert!(tables.lookup(SpawnKind::Npc, "gnoll").is_none());
    }

    #[test]
    fn test_unknown_ai_tag_fails_at_load() {
        let bad = r#"{
            "enemies": {
                "gnoll": {
                    "level": 3,
                    "base_health": 60.0,
                    "base_attack_power": 8.0,
                    "base_armor": 2.0,
                    "respawn_time": 45.0,
                    "ai_type": "berserk"
                }
            }
        }"#;

        assert!(ContentTables::from_json(bad).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();

        let tables = ContentTables::load(&path).unwrap();
        assert_eq!(tables.len(), 2);

        let missing = ContentTables::load(dir.path().join("absent.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_insert_in_code() {
        let mut tables = ContentTables::new();
        tables.insert(SpawnKind::Structure, "watchtower", SubtypeConfig::inert(0.0));

        assert!(tables.lookup(SpawnKind::Structure, "watchtower").is_some());
        assert_eq!(tables.subtypes(SpawnKind::Structure), vec!["watchtower"]);
    }
}
