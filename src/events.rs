//! Events emitted for the render/scene sink
//!
//! The core reports what changed; mesh, material, and presentation work is
//! entirely the collaborator's responsibility.

use glam::Vec3;

use crate::types::{AreaId, InstanceId, PlayerId, SpawnKind};

/// One world-state change of interest to external collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    /// The terrain surface was regenerated; cached meshes are stale.
    SurfaceChanged,
    /// A spawn slot produced a live instance.
    InstanceSpawned {
        area: AreaId,
        kind: SpawnKind,
        instance: InstanceId,
        position: Vec3,
    },
    /// A live instance was removed (killed/consumed) and its slot re-armed.
    InstanceDespawned { area: AreaId, instance: InstanceId },
    /// A tracked player crossed into an area.
    AreaEntered { player: PlayerId, area: AreaId },
    /// A tracked player left an area.
    AreaExited { player: PlayerId, area: AreaId },
}
