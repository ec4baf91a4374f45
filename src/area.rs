//! Areas - bounded regions owning their spawn populations
//!
//! An area is a single configurable type: region-specific behavior comes from
//! its static config (fixed placements, scatter rules) and optional hook
//! callbacks, never from subclass variants. Content is generated exactly once,
//! deterministically from the area's derived seed.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::events::WorldEvent;
use crate::factory::EntityFactory;
use crate::spawn::{ContentTables, SpawnDefinition, SpawnPattern, SpawnPool};
use crate::types::{AreaId, BiomeTag, Faction, InstanceId, PlayerId, SpawnKind, Weather};
use crate::world_log::{LogCategory, WorldLog};

/// Attempts per scattered definition before giving up on a valid position
const MAX_PLACEMENT_ATTEMPTS: usize = 50;

/// Minimum distance between a scattered spawn and a placed structure
const STRUCTURE_CLEARANCE: f32 = 6.0;

// =============================================================================
// BOUNDS
// =============================================================================

/// Region membership test on the XZ plane.
#[derive(Clone, Debug)]
pub enum AreaBounds {
    Circle { center: Vec3, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

impl AreaBounds {
    /// Whether a world position lies inside the region (boundary inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        match self {
            AreaBounds::Circle { center, radius } => {
                let dx = p.x - center.x;
                let dz = p.z - center.z;
                dx * dx + dz * dz <= radius * radius
            }
            AreaBounds::Rect { min, max } => {
                p.x >= min.x && p.x <= max.x && p.z >= min.y && p.z <= max.y
            }
        }
    }

    /// Uniformly sample an XZ point inside the region.
    fn sample_point<R: Rng>(&self, rng: &mut R) -> (f32, f32) {
        match self {
            AreaBounds::Circle { center, radius } => {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let dist = radius * rng.gen::<f32>().sqrt();
                (center.x + angle.cos() * dist, center.z + angle.sin() * dist)
            }
            AreaBounds::Rect { min, max } => (
                min.x + rng.gen::<f32>() * (max.x - min.x),
                min.y + rng.gen::<f32>() * (max.y - min.y),
            ),
        }
    }
}

// =============================================================================
// CONTENT RULES
// =============================================================================

/// Pattern template for scattered content; expanded into a concrete
/// `SpawnPattern` at content-generation time.
#[derive(Clone, Debug)]
pub enum ScatterPattern {
    Single,
    Rare,
    Ambush {
        guard_radius: f32,
    },
    /// Generates `waypoints` patrol positions on a jittered ring of `radius`
    /// around the spawn point.
    Patrol {
        waypoints: usize,
        radius: f32,
    },
}

/// One bounded-randomness content rule: spawn `count` definitions of `kind`,
/// each with a subtype picked from `subtypes` and a position picked inside the
/// area bounds (rejecting water and structure footprints).
#[derive(Clone, Debug)]
pub struct ScatterRule {
    pub kind: SpawnKind,
    pub subtypes: Vec<String>,
    pub count: usize,
    /// Max concurrent instances per generated definition
    pub max_count: usize,
    pub pattern: ScatterPattern,
    /// Respawn interval override; defaults to the subtype's table value
    pub respawn_override: Option<f32>,
}

/// Static configuration an area is constructed with.
#[derive(Clone, Debug)]
pub struct AreaConfig {
    pub id: AreaId,
    pub name: String,
    pub bounds: AreaBounds,
    pub level_range: (u32, u32),
    pub faction: Faction,
    pub biome: BiomeTag,
    /// Fixed placements, used as-is (positions chosen by the designer)
    pub fixed_spawns: Vec<SpawnDefinition>,
    /// Randomized placements, resolved at content-generation time
    pub scatter_rules: Vec<ScatterRule>,
}

/// Public descriptor handed to transition hooks and collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaDescriptor {
    pub id: AreaId,
    pub name: String,
    pub level_range: (u32, u32),
    pub faction: Faction,
    pub biome: BiomeTag,
    pub weather: Weather,
}

// =============================================================================
// HOOKS AND MESSAGES
// =============================================================================

/// Callback invoked on a player transition edge.
pub type TransitionHook = Box<dyn FnMut(PlayerId, &AreaDescriptor)>;

/// Optional per-region hooks (UI/audio/quest collaborators).
#[derive(Default)]
pub struct AreaHooks {
    pub on_enter: Option<TransitionHook>,
    pub on_exit: Option<TransitionHook>,
}

/// Cross-area and collaborator effects are queued here and applied at the
/// start of the owning area's next update, never applied mid-tick from
/// outside.
#[derive(Clone, Debug, PartialEq)]
pub enum AreaMessage {
    InstanceRemoved(InstanceId),
}

// =============================================================================
// AREA
// =============================================================================

/// A named, bounded region with its four spawn pool collections.
pub struct Area {
    config: AreaConfig,
    weather: Weather,
    enemies: Vec<SpawnPool>,
    npcs: Vec<SpawnPool>,
    resources: Vec<SpawnPool>,
    structures: Vec<SpawnPool>,
    pending: VecDeque<AreaMessage>,
    hooks: AreaHooks,
    initialized: bool,
    disposed: bool,
}

impl Area {
    pub fn new(config: AreaConfig) -> Self {
        Self {
            config,
            weather: Weather::default(),
            enemies: Vec::new(),
            npcs: Vec::new(),
            resources: Vec::new(),
            structures: Vec::new(),
            pending: VecDeque::new(),
            hooks: AreaHooks::default(),
            initialized: false,
            disposed: false,
        }
    }

    pub fn with_hooks(mut self, hooks: AreaHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn id(&self) -> AreaId {
        self.config.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    /// Last write wins; no other invariants.
    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    pub fn descriptor(&self) -> AreaDescriptor {
        AreaDescriptor {
            id: self.config.id,
            name: self.config.name.clone(),
            level_range: self.config.level_range,
            faction: self.config.faction,
            biome: self.config.biome,
            weather: self.weather,
        }
    }

    /// Membership test; boundary positions count as inside. Ties between
    /// overlapping areas are broken by the registry's registration order.
    pub fn contains_position(&self, p: Vec3) -> bool {
        self.bounds().contains(p)
    }

    pub fn bounds(&self) -> &AreaBounds {
        &self.config.bounds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// All spawn pools, enemies first.
    pub fn pools(&self) -> impl Iterator<Item = &SpawnPool> {
        self.enemies
            .iter()
            .chain(self.npcs.iter())
            .chain(self.resources.iter())
            .chain(self.structures.iter())
    }

    /// Total live instances across all pools.
    pub fn live_count(&self) -> usize {
        self.pools().map(|p| p.live_count()).sum()
    }

    pub fn owns_instance(&self, id: InstanceId) -> bool {
        self.pools().any(|p| p.owns_instance(id))
    }

    /// Queue an externally observed effect for the next update.
    pub fn queue_message(&mut self, message: AreaMessage) {
        self.pending.push_back(message);
    }

    /// Populate all spawn definitions. Called exactly once after
    /// construction; later calls are logged and ignored.
    ///
    /// Generation is deterministic from `seed`: fixed placements first, then
    /// scatter rules in declared order (structures before everything else so
    /// their footprints constrain later picks). Definitions that fail
    /// validation or reference unknown subtypes are skipped with a logged
    /// configuration error; initialization itself never aborts.
    pub fn initialize_content(
        &mut self,
        tables: &ContentTables,
        seed: u64,
        height_at: &dyn Fn(f32, f32) -> f32,
        log: &mut WorldLog,
    ) {
        if self.initialized {
            log.push(
                0,
                LogCategory::Config,
                format!("{}: initialize_content called twice, ignored", self.config.name),
            );
            return;
        }
        self.initialized = true;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut structure_footprints: Vec<(f32, f32)> = Vec::new();

        let fixed = self.config.fixed_spawns.clone();
        for definition in fixed {
            if definition.kind == SpawnKind::Structure {
                structure_footprints.push((definition.position.x, definition.position.z));
            }
            self.add_definition(definition, tables, log);
        }

        // Structures first: their footprints act as a validity predicate for
        // every later pick.
        let mut rules = self.config.scatter_rules.clone();
        rules.sort_by_key(|r| if r.kind == SpawnKind::Structure { 0 } else { 1 });

        for rule in rules {
            if rule.subtypes.is_empty() || rule.count == 0 {
                log.push(
                    0,
                    LogCategory::Config,
                    format!("{}: scatter rule with no subtypes or zero count, skipped", self.config.name),
                );
                continue;
            }

            for _ in 0..rule.count {
                let subtype = rule.subtypes[rng.gen_range(0..rule.subtypes.len())].clone();

                let Some(position) =
                    self.pick_position(&mut rng, height_at, &structure_footprints)
                else {
                    log.push(
                        0,
                        LogCategory::Config,
                        format!(
                            "{}: no valid position for {} '{}' after {} attempts, skipped",
                            self.config.name,
                            rule.kind.label(),
                            subtype,
                            MAX_PLACEMENT_ATTEMPTS
                        ),
                    );
                    continue;
                };

                if rule.kind == SpawnKind::Structure {
                    structure_footprints.push((position.x, position.z));
                }

                let level = rng.gen_range(self.config.level_range.0..=self.config.level_range.1);
                let respawn = rule
                    .respawn_override
                    .or_else(|| tables.lookup(rule.kind, &subtype).map(|c| c.respawn_time));
                let pattern = expand_pattern(&rule.pattern, position, height_at, &mut rng);

                let mut definition = SpawnDefinition::new(rule.kind, subtype, position)
                    .with_level(level)
                    .with_max_count(rule.max_count)
                    .with_pattern(pattern);
                if let Some(seconds) = respawn {
                    definition = definition.with_respawn_time(seconds);
                }

                self.add_definition(definition, tables, log);
            }
        }
    }

    /// Resolve a definition against the tables and create its pool, or skip
    /// with a logged configuration error.
    fn add_definition(
        &mut self,
        definition: SpawnDefinition,
        tables: &ContentTables,
        log: &mut WorldLog,
    ) {
        if let Err(e) = definition.validate() {
            log.push(0, LogCategory::Config, format!("{}: {}", self.config.name, e));
            return;
        }

        let Some(config) = tables.lookup(definition.kind, &definition.subtype) else {
            log.push(
                0,
                LogCategory::Config,
                format!(
                    "{}: unknown {} subtype '{}', definition skipped",
                    self.config.name,
                    definition.kind.label(),
                    definition.subtype
                ),
            );
            return;
        };

        let pool = SpawnPool::new(self.config.id, definition.clone(), config.clone());
        match definition.kind {
            SpawnKind::Enemy => self.enemies.push(pool),
            SpawnKind::Npc => self.npcs.push(pool),
            SpawnKind::Resource => self.resources.push(pool),
            SpawnKind::Structure => self.structures.push(pool),
        }
    }

    /// Reject-and-retry position pick: inside bounds, on land, clear of
    /// structure footprints.
    fn pick_position<R: Rng>(
        &self,
        rng: &mut R,
        height_at: &dyn Fn(f32, f32) -> f32,
        structure_footprints: &[(f32, f32)],
    ) -> Option<Vec3> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let (x, z) = self.config.bounds.sample_point(rng);
            let h = height_at(x, z);
            if h < 0.0 {
                continue;
            }
            let blocked = structure_footprints.iter().any(|&(sx, sz)| {
                let dx = x - sx;
                let dz = z - sz;
                dx * dx + dz * dz < STRUCTURE_CLEARANCE * STRUCTURE_CLEARANCE
            });
            if blocked {
                continue;
            }
            return Some(Vec3::new(x, h, z));
        }
        None
    }

    /// Apply queued messages, then advance every owned pool.
    pub fn update(
        &mut self,
        dt: f32,
        tick_no: u64,
        factory: &mut dyn EntityFactory,
        log: &mut WorldLog,
        events: &mut Vec<WorldEvent>,
    ) {
        if self.disposed {
            return;
        }

        while let Some(message) = self.pending.pop_front() {
            match message {
                AreaMessage::InstanceRemoved(id) => {
                    self.apply_instance_removed(id, events);
                }
            }
        }

        for pool in self
            .enemies
            .iter_mut()
            .chain(self.npcs.iter_mut())
            .chain(self.resources.iter_mut())
            .chain(self.structures.iter_mut())
        {
            pool.tick(dt, tick_no, factory, log, events);
        }
    }

    fn apply_instance_removed(&mut self, id: InstanceId, events: &mut Vec<WorldEvent>) -> bool {
        for pool in self
            .enemies
            .iter_mut()
            .chain(self.npcs.iter_mut())
            .chain(self.resources.iter_mut())
            .chain(self.structures.iter_mut())
        {
            if pool.notify_instance_removed(id, events) {
                return true;
            }
        }
        false
    }

    /// Invoke the enter hook exactly once per transition edge.
    pub(crate) fn fire_enter(&mut self, player: PlayerId, tick_no: u64, log: &mut WorldLog) {
        let descriptor = self.descriptor();
        if let Some(hook) = self.hooks.on_enter.as_mut() {
            hook(player, &descriptor);
        }
        log.push(
            tick_no,
            LogCategory::Transition,
            format!("player {} entered {}", player.0, descriptor.name),
        );
    }

    /// Invoke the exit hook exactly once per transition edge.
    pub(crate) fn fire_exit(&mut self, player: PlayerId, tick_no: u64, log: &mut WorldLog) {
        let descriptor = self.descriptor();
        if let Some(hook) = self.hooks.on_exit.as_mut() {
            hook(player, &descriptor);
        }
        log.push(
            tick_no,
            LogCategory::Transition,
            format!("player {} left {}", player.0, descriptor.name),
        );
    }

    /// Tear down pools. Live instances are reported despawned so the scene
    /// sink can release their resources; the area ignores further updates.
    pub fn dispose(&mut self, events: &mut Vec<WorldEvent>) {
        for pool in self
            .enemies
            .iter_mut()
            .chain(self.npcs.iter_mut())
            .chain(self.resources.iter_mut())
            .chain(self.structures.iter_mut())
        {
            pool.clear(events);
        }
        self.pending.clear();
        self.disposed = true;
    }
}

/// Expand a scatter-pattern template into a concrete spawn pattern.
fn expand_pattern<R: Rng>(
    template: &ScatterPattern,
    position: Vec3,
    height_at: &dyn Fn(f32, f32) -> f32,
    rng: &mut R,
) -> SpawnPattern {
    match template {
        ScatterPattern::Single => SpawnPattern::Single,
        ScatterPattern::Rare => SpawnPattern::Rare,
        ScatterPattern::Ambush { guard_radius } => SpawnPattern::Ambush {
            guard_radius: *guard_radius,
        },
        ScatterPattern::Patrol { waypoints, radius } => {
            let count = (*waypoints).max(2);
            let mut path = Vec::with_capacity(count);
            for i in 0..count {
                let angle = std::f32::consts::TAU * i as f32 / count as f32;
                let dist = radius * (0.6 + 0.4 * rng.gen::<f32>());
                let x = position.x + angle.cos() * dist;
                let z = position.z + angle.sin() * dist;
                path.push(Vec3::new(x, height_at(x, z), z));
            }
            SpawnPattern::Patrol { path }
        }
    }
}
