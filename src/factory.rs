//! Entity factory interface
//!
//! The world core never constructs meshes, visuals, or AI. When a spawn slot
//! comes due, it hands the factory collaborator exactly the definition's
//! fields and receives back an opaque instance handle (or a refusal).

use glam::Vec3;

use crate::spawn::{SpawnPattern, SubtypeConfig};
use crate::types::{InstanceId, SpawnKind};

/// One entity-creation request, carrying the spawn definition's fields plus
/// the resolved static config for the subtype.
#[derive(Clone, Debug)]
pub struct SpawnRequest<'a> {
    pub kind: SpawnKind,
    pub subtype: &'a str,
    pub position: Vec3,
    pub level: u32,
    /// Pattern extras (patrol path, guard radius) travel with the request;
    /// traversal/behavior is the factory side's concern.
    pub pattern: &'a SpawnPattern,
    pub config: &'a SubtypeConfig,
}

/// Collaborator that owns entity construction.
///
/// `create_entity` is synchronous and non-blocking from the core's
/// perspective; returning `None` (unknown subtype, resource exhaustion) is a
/// refusal, not an error, and the requesting slot re-arms its countdown.
pub trait EntityFactory {
    fn create_entity(&mut self, request: &SpawnRequest<'_>) -> Option<InstanceId>;
}

/// Minimal factory that accepts every request and hands out sequential ids.
/// Useful for drivers and tests; real hosts supply their own implementation.
#[derive(Debug, Default)]
pub struct SequentialFactory {
    next_id: u64,
}

impl SequentialFactory {
    pub fn new() -> Self {
        SequentialFactory { next_id: 0 }
    }

    pub fn issued(&self) -> u64 {
        self.next_id
    }
}

impl EntityFactory for SequentialFactory {
    fn create_entity(&mut self, _request: &SpawnRequest<'_>) -> Option<InstanceId> {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        Some(id)
    }
}
