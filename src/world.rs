//! World orchestrator
//!
//! Single owner of the terrain, the area registry, and the tracked player
//! contexts. One `update(dt)` call per frame drives the whole core: terrain
//! animation, every area's pools, then player transition detection. All
//! collaborator state (entity factory, content tables) is injected here; the
//! core keeps no ambient globals.

use std::collections::HashMap;

use glam::Vec3;

use crate::area::Area;
use crate::error::WorldError;
use crate::events::WorldEvent;
use crate::factory::EntityFactory;
use crate::heightfield::{HeightField, HeightFieldParams};
use crate::registry::AreaRegistry;
use crate::seeds::WorldSeeds;
use crate::spawn::ContentTables;
use crate::terrain::{ElevationBand, TerrainSurface};
use crate::types::{AreaId, InstanceId, PlayerId, Weather};
use crate::world_log::{LogCategory, WorldLog};

/// Per-player transition tracking. Area references are ids (lookup only);
/// the registry stays the sole owner of every area.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerAreaState {
    pub position: Vec3,
    pub current: Option<AreaId>,
    pub previous: Option<AreaId>,
}

/// Ticks the terrain and every registered area, routes entity-creation
/// requests to the injected factory, and fires area-transition hooks.
pub struct WorldOrchestrator {
    seeds: WorldSeeds,
    height_field: HeightField,
    surface: TerrainSurface,
    tables: ContentTables,
    registry: AreaRegistry,
    players: HashMap<PlayerId, PlayerAreaState>,
    factory: Box<dyn EntityFactory>,
    events: Vec<WorldEvent>,
    log: WorldLog,
    tick: u64,
}

impl WorldOrchestrator {
    /// Generate terrain and set up an empty world.
    pub fn new(
        params: HeightFieldParams,
        seeds: WorldSeeds,
        tables: ContentTables,
        factory: Box<dyn EntityFactory>,
    ) -> Self {
        let height_field = HeightField::generate(params, seeds.terrain);
        let surface = TerrainSurface::build(&height_field);
        Self {
            seeds,
            height_field,
            surface,
            tables,
            registry: AreaRegistry::new(),
            players: HashMap::new(),
            factory,
            events: Vec::new(),
            log: WorldLog::new(),
            tick: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Areas
    // -------------------------------------------------------------------------

    /// Register an area, generating its content first if that has not
    /// happened yet. Content seeds derive from the area id, so registration
    /// order never changes an area's layout.
    pub fn register_area(&mut self, mut area: Area) -> Result<AreaId, WorldError> {
        if !area.is_initialized() {
            let seed = self.seeds.area_content_seed(area.id());
            let grid = self.height_field.snapshot();
            area.initialize_content(
                &self.tables,
                seed,
                &|x, z| grid.height_at(x, z),
                &mut self.log,
            );
        }
        self.registry.register(area)
    }

    /// Unregister an area, disposing its pools. Players inside simply become
    /// "outside all areas" until the next update re-evaluates them; no exit
    /// hook fires for a disappearing area.
    pub fn unregister_area(&mut self, id: AreaId) -> Option<Area> {
        for state in self.players.values_mut() {
            if state.current == Some(id) {
                state.previous = state.current;
                state.current = None;
            }
        }
        self.registry.unregister(id, &mut self.events)
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    /// Pass-through environment setter; last write wins.
    pub fn set_weather(&mut self, id: AreaId, weather: Weather) -> bool {
        match self.registry.area_mut(id) {
            Some(area) => {
                area.set_weather(weather);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------------

    /// Start tracking a player context. The first update after tracking
    /// fires the enter hook for whatever area contains the position.
    pub fn track_player(&mut self, player: PlayerId, position: Vec3) {
        self.players.insert(
            player,
            PlayerAreaState {
                position,
                current: None,
                previous: None,
            },
        );
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Option<PlayerAreaState> {
        self.players.remove(&player)
    }

    pub fn set_player_position(&mut self, player: PlayerId, position: Vec3) {
        if let Some(state) = self.players.get_mut(&player) {
            state.position = position;
        }
    }

    pub fn player_state(&self, player: PlayerId) -> Option<&PlayerAreaState> {
        self.players.get(&player)
    }

    // -------------------------------------------------------------------------
    // Terrain queries
    // -------------------------------------------------------------------------

    pub fn get_height_at(&self, x: f32, z: f32) -> f32 {
        self.surface.height_at(x, z)
    }

    pub fn raycast_terrain(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        self.surface.raycast(origin, direction)
    }

    pub fn classify_elevation(&self, h: f32) -> ElevationBand {
        self.surface.classify_elevation(h)
    }

    pub fn surface(&self) -> &TerrainSurface {
        &self.surface
    }

    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    /// Swap in a freshly generated terrain grid and rebuild the surface.
    /// Snapshots taken before the call keep reading the old grid.
    pub fn regenerate_terrain(&mut self, seed: u64) {
        self.height_field.regenerate(seed);
        self.surface.rebuild(&self.height_field);
        self.events.push(WorldEvent::SurfaceChanged);
        self.log.push(
            self.tick,
            LogCategory::Terrain,
            format!("terrain regenerated from seed {}", seed),
        );
    }

    // -------------------------------------------------------------------------
    // Tick loop
    // -------------------------------------------------------------------------

    /// Advance the whole core by one frame: terrain animation, every area's
    /// pools, then player area re-evaluation.
    pub fn update(&mut self, dt: f32) {
        self.tick += 1;
        self.surface.update(dt);
        self.registry.update_all(
            dt,
            self.tick,
            self.factory.as_mut(),
            &mut self.log,
            &mut self.events,
        );
        self.update_player_areas();
    }

    /// Re-evaluate each tracked player's containing area and fire transition
    /// hooks on change: exit of the old area always precedes enter of the
    /// new, and each fires exactly once per edge.
    fn update_player_areas(&mut self) {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort_by_key(|p| p.0);

        for player in ids {
            let (position, current) = match self.players.get(&player) {
                Some(state) => (state.position, state.current),
                None => continue,
            };
            let next = self.registry.find_area_at(position);
            if next == current {
                continue;
            }

            if let Some(old) = current {
                if let Some(area) = self.registry.area_mut(old) {
                    area.fire_exit(player, self.tick, &mut self.log);
                }
                self.events.push(WorldEvent::AreaExited { player, area: old });
            }
            if let Some(new) = next {
                if let Some(area) = self.registry.area_mut(new) {
                    area.fire_enter(player, self.tick, &mut self.log);
                }
                self.events.push(WorldEvent::AreaEntered { player, area: new });
            }

            if let Some(state) = self.players.get_mut(&player) {
                state.previous = current;
                state.current = next;
            }
        }
    }

    /// Report a death/consumption observed by a collaborator. Routed to the
    /// owning area's pending queue and applied at its next update.
    pub fn notify_instance_removed(&mut self, id: InstanceId) -> bool {
        self.registry.notify_instance_removed(id)
    }

    // -------------------------------------------------------------------------
    // Observability
    // -------------------------------------------------------------------------

    /// Take all events queued since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn log(&self) -> &WorldLog {
        &self.log
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AreaBounds, AreaConfig};
    use crate::factory::SequentialFactory;
    use crate::spawn::{SpawnDefinition, SubtypeConfig};
    use crate::types::{BiomeTag, Faction, SpawnKind};

    fn demo_tables() -> ContentTables {
        let mut tables = ContentTables::new();
        tables.insert(SpawnKind::Enemy, "gnoll", SubtypeConfig::inert(5.0));
        tables
    }

    fn circle_area(id: u32, center_x: f32, radius: f32) -> Area {
        Area::new(AreaConfig {
            id: AreaId(id),
            name: format!("Area {}", id),
            bounds: AreaBounds::Circle {
                center: Vec3::new(center_x, 0.0, 0.0),
                radius,
            },
            level_range: (1, 3),
            faction: Faction::Neutral,
            biome: BiomeTag::Plains,
            fixed_spawns: Vec::new(),
            scatter_rules: Vec::new(),
        })
    }

    fn small_world() -> WorldOrchestrator {
        let params = HeightFieldParams {
            world_size: 256.0,
            resolution: 16,
            ..HeightFieldParams::default()
        };
        WorldOrchestrator::new(
            params,
            WorldSeeds::from_master(12345),
            demo_tables(),
            Box::new(SequentialFactory::new()),
        )
    }

    fn transition_events(world: &mut WorldOrchestrator) -> Vec<WorldEvent> {
        world
            .drain_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    WorldEvent::AreaEntered { .. } | WorldEvent::AreaExited { .. }
                )
            })
            .collect()
    }

    #[test]
    fn test_direct_transition_fires_exit_then_enter_once() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();
        world.register_area(circle_area(2, 30.0, 10.0)).unwrap();

        let player = PlayerId(1);
        world.track_player(player, Vec3::ZERO);
        world.update(0.1);
        assert_eq!(
            transition_events(&mut world),
            vec![WorldEvent::AreaEntered { player, area: AreaId(1) }]
        );

        // One step from inside area 1 to inside area 2
        world.set_player_position(player, Vec3::new(30.0, 0.0, 0.0));
        world.update(0.1);
        assert_eq!(
            transition_events(&mut world),
            vec![
                WorldEvent::AreaExited { player, area: AreaId(1) },
                WorldEvent::AreaEntered { player, area: AreaId(2) },
            ]
        );

        let state = world.player_state(player).unwrap();
        assert_eq!(state.current, Some(AreaId(2)));
        assert_eq!(state.previous, Some(AreaId(1)));
    }

    #[test]
    fn test_staying_inside_fires_nothing() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();

        let player = PlayerId(1);
        world.track_player(player, Vec3::ZERO);
        world.update(0.1);
        world.drain_events();

        world.set_player_position(player, Vec3::new(2.0, 0.0, 3.0));
        world.update(0.1);
        world.update(0.1);
        assert!(transition_events(&mut world).is_empty());
    }

    #[test]
    fn test_leaving_all_areas_fires_exit_only() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();

        let player = PlayerId(1);
        world.track_player(player, Vec3::ZERO);
        world.update(0.1);
        world.drain_events();

        world.set_player_position(player, Vec3::new(200.0, 0.0, 200.0));
        world.update(0.1);
        assert_eq!(
            transition_events(&mut world),
            vec![WorldEvent::AreaExited { player, area: AreaId(1) }]
        );
        assert_eq!(world.player_state(player).unwrap().current, None);
    }

    #[test]
    fn test_duplicate_area_registration_rejected() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();

        let result = world.register_area(circle_area(1, 50.0, 10.0));
        assert!(matches!(result, Err(WorldError::DuplicateAreaId(_))));
    }

    #[test]
    fn test_respawn_cycle_through_orchestrator() {
        let mut world = small_world();
        let area = Area::new(AreaConfig {
            id: AreaId(1),
            name: "Camp".to_string(),
            bounds: AreaBounds::Circle {
                center: Vec3::ZERO,
                radius: 20.0,
            },
            level_range: (1, 1),
            faction: Faction::Hostile,
            biome: BiomeTag::Plains,
            fixed_spawns: vec![SpawnDefinition::new(SpawnKind::Enemy, "gnoll", Vec3::ZERO)
                .with_respawn_time(5.0)],
            scatter_rules: Vec::new(),
        });
        let id = world.register_area(area).unwrap();

        world.update(1.0);
        let spawned = world
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                WorldEvent::InstanceSpawned { instance, area, .. } => Some((instance, area)),
                _ => None,
            })
            .expect("initial spawn");
        assert_eq!(spawned.1, id);

        assert!(world.notify_instance_removed(spawned.0));
        // Removal applies at the start of the next update; the slot then
        // needs 5 ticked seconds before it comes due again.
        for _ in 0..4 {
            world.update(1.0);
            assert_eq!(world.registry().area(id).unwrap().live_count(), 0);
        }
        world.update(1.0);
        assert_eq!(world.registry().area(id).unwrap().live_count(), 1);
    }

    #[test]
    fn test_height_queries_forward_to_surface() {
        let world = small_world();

        assert_eq!(world.get_height_at(5.0, 5.0), world.surface().height_at(5.0, 5.0));
        assert!(world
            .raycast_terrain(Vec3::new(0.0, 500.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .is_some());
    }

    #[test]
    fn test_regenerate_terrain_swaps_and_notifies() {
        let mut world = small_world();
        let before = world.get_height_at(10.0, 10.0);
        let snapshot = world.height_field().snapshot();

        world.regenerate_terrain(999);
        let events = world.drain_events();
        assert!(events.contains(&WorldEvent::SurfaceChanged));
        assert_ne!(world.get_height_at(10.0, 10.0), before);
        // The old snapshot still reads the old grid
        assert_eq!(snapshot.height_at(10.0, 10.0), before);
    }

    #[test]
    fn test_set_weather_last_write_wins() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();

        assert!(world.set_weather(AreaId(1), Weather::Storm));
        assert!(world.set_weather(AreaId(1), Weather::Fog));
        assert_eq!(
            world.registry().area(AreaId(1)).unwrap().weather(),
            Weather::Fog
        );
        assert!(!world.set_weather(AreaId(9), Weather::Rain));
    }

    #[test]
    fn test_unregister_clears_player_current() {
        let mut world = small_world();
        world.register_area(circle_area(1, 0.0, 10.0)).unwrap();
        let player = PlayerId(1);
        world.track_player(player, Vec3::ZERO);
        world.update(0.1);

        world.unregister_area(AreaId(1));
        assert_eq!(world.player_state(player).unwrap().current, None);
    }
}
