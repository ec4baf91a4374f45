//! Area registry
//!
//! Owns every registered area. Registration order is meaningful: when a
//! position lies on two areas' boundaries, the first-registered area wins,
//! which keeps `find_area_at` deterministic across repeated calls.

use glam::Vec3;

use crate::area::{Area, AreaMessage};
use crate::error::WorldError;
use crate::events::WorldEvent;
use crate::factory::EntityFactory;
use crate::types::{AreaId, InstanceId};
use crate::world_log::WorldLog;

/// Registry of all live areas, in registration order.
#[derive(Default)]
pub struct AreaRegistry {
    areas: Vec<Area>,
}

impl AreaRegistry {
    pub fn new() -> Self {
        Self { areas: Vec::new() }
    }

    /// Add an area. A colliding identifier is a caller error and is rejected,
    /// never silently replaced.
    pub fn register(&mut self, area: Area) -> Result<AreaId, WorldError> {
        let id = area.id();
        if self.areas.iter().any(|a| a.id() == id) {
            return Err(WorldError::DuplicateAreaId(id));
        }
        self.areas.push(area);
        Ok(id)
    }

    /// Remove an area, disposing its pools first. Returns the disposed area,
    /// or `None` if the id was not registered.
    pub fn unregister(&mut self, id: AreaId, events: &mut Vec<WorldEvent>) -> Option<Area> {
        let idx = self.areas.iter().position(|a| a.id() == id)?;
        let mut area = self.areas.remove(idx);
        area.dispose(events);
        Some(area)
    }

    /// First registered area containing the position, or `None`. A position
    /// outside every area is a valid state, not an error.
    pub fn find_area_at(&self, position: Vec3) -> Option<AreaId> {
        self.areas
            .iter()
            .find(|a| a.contains_position(position))
            .map(|a| a.id())
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id() == id)
    }

    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Advance every registered area. A failure inside one area's pools never
    /// halts the others; pools isolate per slot and log instead of erroring.
    pub fn update_all(
        &mut self,
        dt: f32,
        tick_no: u64,
        factory: &mut dyn EntityFactory,
        log: &mut WorldLog,
        events: &mut Vec<WorldEvent>,
    ) {
        for area in self.areas.iter_mut() {
            area.update(dt, tick_no, factory, log, events);
        }
    }

    /// Route a death/consumption notification to the owning area's pending
    /// queue. Returns false when no registered area owns the instance (stale
    /// id: the removal already happened, and the call stays idempotent end
    /// to end).
    pub fn notify_instance_removed(&mut self, id: InstanceId) -> bool {
        for area in self.areas.iter_mut() {
            if area.owns_instance(id) {
                area.queue_message(AreaMessage::InstanceRemoved(id));
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AreaBounds, AreaConfig};
    use crate::types::{BiomeTag, Faction};

    fn bare_area(id: u32, center: Vec3, radius: f32) -> Area {
        Area::new(AreaConfig {
            id: AreaId(id),
            name: format!("Area {}", id),
            bounds: AreaBounds::Circle { center, radius },
            level_range: (1, 1),
            faction: Faction::Neutral,
            biome: BiomeTag::Plains,
            fixed_spawns: Vec::new(),
            scatter_rules: Vec::new(),
        })
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = AreaRegistry::new();
        registry.register(bare_area(1, Vec3::ZERO, 10.0)).unwrap();

        let result = registry.register(bare_area(1, Vec3::new(100.0, 0.0, 0.0), 10.0));
        assert!(matches!(result, Err(WorldError::DuplicateAreaId(AreaId(1)))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_area_at_inside_and_outside() {
        let mut registry = AreaRegistry::new();
        registry.register(bare_area(1, Vec3::ZERO, 10.0)).unwrap();
        registry
            .register(bare_area(2, Vec3::new(50.0, 0.0, 0.0), 10.0))
            .unwrap();

        assert_eq!(registry.find_area_at(Vec3::new(3.0, 0.0, 3.0)), Some(AreaId(1)));
        assert_eq!(registry.find_area_at(Vec3::new(52.0, 0.0, 0.0)), Some(AreaId(2)));
        assert_eq!(registry.find_area_at(Vec3::new(500.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_overlap_tie_break_is_registration_order() {
        let mut registry = AreaRegistry::new();
        // Both circles contain the origin
        registry.register(bare_area(7, Vec3::new(2.0, 0.0, 0.0), 10.0)).unwrap();
        registry.register(bare_area(3, Vec3::new(-2.0, 0.0, 0.0), 10.0)).unwrap();

        for _ in 0..5 {
            assert_eq!(registry.find_area_at(Vec3::ZERO), Some(AreaId(7)));
        }
    }

    #[test]
    fn test_unregister_disposes_and_removes() {
        let mut registry = AreaRegistry::new();
        registry.register(bare_area(1, Vec3::ZERO, 10.0)).unwrap();

        let mut events = Vec::new();
        let area = registry.unregister(AreaId(1), &mut events).unwrap();
        assert!(area.is_disposed());
        assert!(registry.is_empty());
        assert!(registry.unregister(AreaId(1), &mut events).is_none());
    }
}
