//! Runtime spawn pools
//!
//! A pool binds one immutable `SpawnDefinition` to its live instances. Each
//! slot walks `Empty -> Spawning -> Alive -> Empty`, with a per-slot countdown
//! gating `Empty -> Spawning`. Countdowns advance only through `tick(dt)`;
//! there is no wall-clock timer anywhere in the pool.

use crate::events::WorldEvent;
use crate::factory::{EntityFactory, SpawnRequest};
use crate::spawn::definition::SpawnDefinition;
use crate::spawn::tables::SubtypeConfig;
use crate::types::{AreaId, InstanceId};
use crate::world_log::{LogCategory, WorldLog};

/// State of one spawn slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlotState {
    /// No instance; the countdown must reach zero before the next request.
    Empty { countdown: f32 },
    /// A factory request is outstanding for this slot. Held so an
    /// asynchronous factory adapter can park the slot without double-requesting.
    Spawning,
    /// A live instance occupies this slot.
    Alive { instance: InstanceId },
}

/// Manages the live instances of one spawn definition, enforcing `max_count`
/// and running the respawn countdowns.
#[derive(Clone, Debug)]
pub struct SpawnPool {
    area: AreaId,
    definition: SpawnDefinition,
    config: SubtypeConfig,
    slots: Vec<SlotState>,
}

impl SpawnPool {
    /// Create the pool with all slots empty and due immediately.
    pub fn new(area: AreaId, definition: SpawnDefinition, config: SubtypeConfig) -> Self {
        let slots = vec![SlotState::Empty { countdown: 0.0 }; definition.max_count];
        Self {
            area,
            definition,
            config,
            slots,
        }
    }

    pub fn definition(&self) -> &SpawnDefinition {
        &self.definition
    }

    /// Number of live instances. Never exceeds the definition's `max_count`.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, SlotState::Alive { .. }))
            .count()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn owns_instance(&self, id: InstanceId) -> bool {
        self.slots
            .iter()
            .any(|s| matches!(s, SlotState::Alive { instance } if *instance == id))
    }

    /// Advance countdowns and request entities for slots that came due.
    ///
    /// A factory refusal is logged and the slot re-armed with the full
    /// respawn interval, so a persistently failing subtype retries at the
    /// respawn cadence instead of spinning.
    pub fn tick(
        &mut self,
        dt: f32,
        tick_no: u64,
        factory: &mut dyn EntityFactory,
        log: &mut WorldLog,
        events: &mut Vec<WorldEvent>,
    ) {
        let respawn = self.definition.respawn_time;
        let max_count = self.definition.max_count;
        let mut live = self.live_count();

        for idx in 0..self.slots.len() {
            let due = match &mut self.slots[idx] {
                SlotState::Empty { countdown } => {
                    *countdown -= dt;
                    *countdown <= 0.0
                }
                _ => false,
            };
            // A due slot above the cap stays due and retries once capacity frees.
            if !due || live >= max_count {
                continue;
            }

            self.slots[idx] = SlotState::Spawning;
            let request = SpawnRequest {
                kind: self.definition.kind,
                subtype: &self.definition.subtype,
                position: self.definition.position,
                level: self.definition.level,
                pattern: &self.definition.pattern,
                config: &self.config,
            };
            match factory.create_entity(&request) {
                Some(instance) => {
                    self.slots[idx] = SlotState::Alive { instance };
                    live += 1;
                    events.push(WorldEvent::InstanceSpawned {
                        area: self.area,
                        kind: self.definition.kind,
                        instance,
                        position: self.definition.position,
                    });
                }
                None => {
                    log.push(
                        tick_no,
                        LogCategory::Spawn,
                        format!(
                            "factory refused {} '{}', slot re-armed for {:.0}s",
                            self.definition.kind.label(),
                            self.definition.subtype,
                            respawn
                        ),
                    );
                    self.slots[idx] = SlotState::Empty { countdown: respawn };
                }
            }
        }
    }

    /// Mark an instance as removed (killed/consumed) and start its slot's
    /// respawn countdown. Idempotent: an id this pool does not own is ignored.
    pub fn notify_instance_removed(
        &mut self,
        id: InstanceId,
        events: &mut Vec<WorldEvent>,
    ) -> bool {
        let respawn = self.definition.respawn_time;
        for slot in self.slots.iter_mut() {
            if matches!(*slot, SlotState::Alive { instance } if instance == id) {
                *slot = SlotState::Empty { countdown: respawn };
                events.push(WorldEvent::InstanceDespawned {
                    area: self.area,
                    instance: id,
                });
                return true;
            }
        }
        false
    }

    /// Drop all live instances without starting countdowns. Used on area
    /// disposal; despawn events are still reported so the scene sink can
    /// release visuals.
    pub fn clear(&mut self, events: &mut Vec<WorldEvent>) {
        for slot in self.slots.iter_mut() {
            if let SlotState::Alive { instance } = *slot {
                events.push(WorldEvent::InstanceDespawned {
                    area: self.area,
                    instance,
                });
            }
            *slot = SlotState::Empty { countdown: 0.0 };
        }
    }
}
