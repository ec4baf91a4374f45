//! Spawn definitions - immutable templates describing what can spawn, where,
//! and under what limits. Created at area-content-generation time and never
//! mutated afterward.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::types::SpawnKind;

/// Spawn pattern. A closed set: pattern-specific data lives in the variant,
/// never in loosely typed optional fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPattern {
    /// Plain spawn point.
    Single,
    /// Rare spawn. Plain configuration, not special-cased logic: the pool
    /// algorithm is uniform and rarity comes from `max_count`/`respawn_time`.
    Rare,
    /// Spawned instances guard a radius around the spawn position.
    Ambush { guard_radius: f32 },
    /// Spawned instances walk an ordered path; traversal is delegated to the
    /// AI collaborator, the path just travels with the spawn request.
    Patrol { path: Vec<Vec3> },
}

impl SpawnPattern {
    /// Short tag for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            SpawnPattern::Single => "single",
            SpawnPattern::Rare => "rare",
            SpawnPattern::Ambush { .. } => "ambush",
            SpawnPattern::Patrol { .. } => "patrol",
        }
    }
}

/// Immutable template for one spawn point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpawnDefinition {
    pub kind: SpawnKind,
    /// Subtype key into the content tables
    pub subtype: String,
    pub position: Vec3,
    pub level: u32,
    /// Seconds between an instance's removal and its slot re-spawning
    pub respawn_time: f32,
    /// Maximum concurrent live instances
    pub max_count: usize,
    pub pattern: SpawnPattern,
}

impl SpawnDefinition {
    pub fn new(kind: SpawnKind, subtype: impl Into<String>, position: Vec3) -> Self {
        Self {
            kind,
            subtype: subtype.into(),
            position,
            level: 1,
            respawn_time: 30.0,
            max_count: 1,
            pattern: SpawnPattern::Single,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_respawn_time(mut self, seconds: f32) -> Self {
        self.respawn_time = seconds;
        self
    }

    pub fn with_max_count(mut self, count: usize) -> Self {
        self.max_count = count;
        self
    }

    pub fn with_pattern(mut self, pattern: SpawnPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Check structural validity. Subtype existence is checked separately
    /// against the content tables at pool-creation time.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.subtype.is_empty() {
            return Err(WorldError::Configuration(format!(
                "{} definition has an empty subtype key",
                self.kind.label()
            )));
        }
        if self.max_count == 0 {
            return Err(WorldError::Configuration(format!(
                "{} '{}': max_count must be at least 1",
                self.kind.label(),
                self.subtype
            )));
        }
        if !self.respawn_time.is_finite() || self.respawn_time < 0.0 {
            return Err(WorldError::Configuration(format!(
                "{} '{}': respawn_time must be a non-negative number",
                self.kind.label(),
                self.subtype
            )));
        }
        if let SpawnPattern::Patrol { path } = &self.pattern {
            if path.len() < 2 {
                return Err(WorldError::Configuration(format!(
                    "{} '{}': patrol path needs at least two points",
                    self.kind.label(),
                    self.subtype
                )));
            }
        }
        if let SpawnPattern::Ambush { guard_radius } = self.pattern {
            if !(guard_radius > 0.0) {
                return Err(WorldError::Configuration(format!(
                    "{} '{}': ambush guard_radius must be positive",
                    self.kind.label(),
                    self.subtype
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_definition_passes() {
        let def = SpawnDefinition::new(SpawnKind::Enemy, "gnoll", Vec3::ZERO)
            .with_level(3)
            .with_max_count(4)
            .with_respawn_time(45.0);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_zero_max_count_rejected() {
        let def = SpawnDefinition::new(SpawnKind::Enemy, "gnoll", Vec3::ZERO).with_max_count(0);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_empty_subtype_rejected() {
        let def = SpawnDefinition::new(SpawnKind::Resource, "", Vec3::ZERO);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_negative_respawn_rejected() {
        let def = SpawnDefinition::new(SpawnKind::Npc, "guard", Vec3::ZERO).with_respawn_time(-1.0);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_short_patrol_path_rejected() {
        let def = SpawnDefinition::new(SpawnKind::Enemy, "gnoll", Vec3::ZERO)
            .with_pattern(SpawnPattern::Patrol { path: vec![Vec3::ZERO] });
        assert!(def.validate().is_err());

        let ok = SpawnDefinition::new(SpawnKind::Enemy, "gnoll", Vec3::ZERO).with_pattern(
            SpawnPattern::Patrol {
                path: vec![Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0)],
            },
        );
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rare_is_plain_configuration() {
        let def = SpawnDefinition::new(SpawnKind::Enemy, "wyrm", Vec3::ZERO)
            .with_pattern(SpawnPattern::Rare)
            .with_max_count(1)
            .with_respawn_time(600.0);
        assert!(def.validate().is_ok());
        assert_eq!(def.pattern.label(), "rare");
    }
}
