//! Core identifier and tag types shared across the world systems.

use serde::{Deserialize, Serialize};

/// Unique identifier for a registered area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub u32);

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

/// Unique identifier for a tracked player context
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Opaque handle to a live entity instance, issued by the entity factory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// What a spawn definition produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Enemy,
    Npc,
    Resource,
    Structure,
}

impl SpawnKind {
    /// Short label for reports and log lines
    pub fn label(&self) -> &'static str {
        match self {
            SpawnKind::Enemy => "enemy",
            SpawnKind::Npc => "npc",
            SpawnKind::Resource => "resource",
            SpawnKind::Structure => "structure",
        }
    }
}

/// Controlling faction of an area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Friendly,
    Neutral,
    Hostile,
    Contested,
}

/// Broad biome tag attached to an area (flavor for collaborators, not physics)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeTag {
    Plains,
    Forest,
    Swamp,
    Desert,
    Tundra,
    Highlands,
    Coast,
}

/// Per-area weather setting; last write wins, no core invariants beyond that
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    Fog,
    Storm,
    Snowfall,
}

impl Default for Weather {
    fn default() -> Self {
        Weather::Clear
    }
}
