//! Terrain surface derived from a height field
//!
//! Builds a CPU-side renderable mesh (positions, normals, triangle indices,
//! band colors) and answers point-height and ray-intersection queries. Mesh
//! upload and materials belong to the render collaborator; this module only
//! produces the data.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::heightfield::{HeightField, HeightGrid};

/// Phase advance per second for the cosmetic water animation
const WATER_WAVE_SPEED: f32 = 0.8;

/// Bisection iterations used to refine a raycast bracket
const RAYCAST_REFINE_STEPS: u32 = 24;

// =============================================================================
// ELEVATION BANDS
// =============================================================================

/// Biome-color band for an elevation value. Used by render/visual
/// collaborators for coloring; never consulted for physics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationBand {
    DeepWater,
    ShallowWater,
    Sand,
    Grass,
    Mountain,
    Snow,
}

impl ElevationBand {
    /// Classify an elevation into its band using fixed thresholds.
    pub fn classify(h: f32) -> Self {
        if h < -5.0 {
            ElevationBand::DeepWater
        } else if h < 0.0 {
            ElevationBand::ShallowWater
        } else if h < 5.0 {
            ElevationBand::Sand
        } else if h < 20.0 {
            ElevationBand::Grass
        } else if h < 30.0 {
            ElevationBand::Mountain
        } else {
            ElevationBand::Snow
        }
    }

    /// Display color (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            ElevationBand::DeepWater => (15, 40, 110),
            ElevationBand::ShallowWater => (45, 95, 190),
            ElevationBand::Sand => (210, 195, 140),
            ElevationBand::Grass => (75, 140, 60),
            ElevationBand::Mountain => (125, 110, 100),
            ElevationBand::Snow => (240, 243, 248),
        }
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ElevationBand::DeepWater => "deep water",
            ElevationBand::ShallowWater => "shallow water",
            ElevationBand::Sand => "sand",
            ElevationBand::Grass => "grass",
            ElevationBand::Mountain => "mountain",
            ElevationBand::Snow => "snow",
        }
    }
}

// =============================================================================
// MESH
// =============================================================================

/// CPU-side terrain mesh. One vertex per grid sample, two triangles per cell.
#[derive(Clone, Debug, Default)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex band color, normalized RGB
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn build_mesh(grid: &HeightGrid) -> TerrainMesh {
    let res = grid.resolution();
    let side = res + 1;
    let cell = grid.world_size() / res as f32;

    let mut positions = Vec::with_capacity(side * side);
    let mut normals = Vec::with_capacity(side * side);
    let mut colors = Vec::with_capacity(side * side);

    for j in 0..side {
        for i in 0..side {
            let x = grid.index_to_world(i);
            let z = grid.index_to_world(j);
            let h = grid.sample(i, j);
            positions.push([x, h, z]);

            // Central differences; clamped samples repeat at the border,
            // which flattens the normal there instead of inventing slope.
            let hl = grid.sample(i.saturating_sub(1), j);
            let hr = grid.sample(i + 1, j);
            let hd = grid.sample(i, j.saturating_sub(1));
            let hu = grid.sample(i, j + 1);
            let normal = Vec3::new(hl - hr, 2.0 * cell, hd - hu).normalize_or_zero();
            normals.push([normal.x, normal.y, normal.z]);

            let (r, g, b) = ElevationBand::classify(h).color();
            colors.push([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]);
        }
    }

    let mut indices = Vec::with_capacity(res * res * 6);
    for j in 0..res {
        for i in 0..res {
            let a = (j * side + i) as u32;
            let b = a + 1;
            let c = a + side as u32;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    TerrainMesh {
        positions,
        normals,
        colors,
        indices,
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Read-only queryable view over a height field, plus its renderable mesh.
pub struct TerrainSurface {
    grid: Arc<HeightGrid>,
    mesh: TerrainMesh,
    water_phase: f32,
}

impl TerrainSurface {
    /// Build the surface (mesh and query structures) from a height field.
    pub fn build(field: &HeightField) -> Self {
        let grid = field.snapshot();
        let mesh = build_mesh(&grid);
        Self {
            grid,
            mesh,
            water_phase: 0.0,
        }
    }

    /// Refresh the surface after the height field was regenerated.
    pub fn rebuild(&mut self, field: &HeightField) {
        self.grid = field.snapshot();
        self.mesh = build_mesh(&self.grid);
    }

    /// Elevation at world coordinates; same clamp contract as the height field.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.grid.height_at(x, z)
    }

    /// Band classification for an elevation value.
    pub fn classify_elevation(&self, h: f32) -> ElevationBand {
        ElevationBand::classify(h)
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Current phase of the cosmetic water animation, for render collaborators.
    pub fn water_phase(&self) -> f32 {
        self.water_phase
    }

    /// Advance cosmetic animation only; no query-visible state changes.
    pub fn update(&mut self, dt: f32) {
        self.water_phase = (self.water_phase + dt * WATER_WAVE_SPEED).rem_euclid(std::f32::consts::TAU);
    }

    /// Nearest intersection of a ray with the surface, or `None` when the ray
    /// never crosses the bounded grid.
    ///
    /// Marches across the grid volume in half-cell steps until the ray passes
    /// below the interpolated surface, then refines the bracket by bisection.
    /// A ray starting below the surface inside the volume hits immediately.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let dir = direction.try_normalize()?;

        let (t_enter, t_exit) = self.clip_to_bounds(origin, dir)?;

        let above = |t: f32| {
            let p = origin + dir * t;
            p.y - self.grid.sample_bilinear(p.x, p.z)
        };

        let mut prev_t = t_enter;
        if above(t_enter) <= 0.0 {
            return Some(origin + dir * t_enter);
        }

        let step = (self.grid.world_size() / self.grid.resolution() as f32) * 0.5;
        let mut t = t_enter;
        while t < t_exit {
            t = (t + step).min(t_exit);
            let f = above(t);
            if f <= 0.0 {
                let hit_t = refine_crossing(prev_t, t, &above);
                return Some(origin + dir * hit_t);
            }
            prev_t = t;
        }

        None
    }

    /// Clip a ray against the grid's bounding volume, returning the parameter
    /// interval inside it. Entry is clamped to zero for origins inside.
    fn clip_to_bounds(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let half = self.grid.world_size() * 0.5;
        let lo = Vec3::new(-half, self.grid.min_height() - 1.0, -half);
        let hi = Vec3::new(half, self.grid.max_height() + 1.0, half);

        let mut t_enter = 0.0f32;
        let mut t_exit = f32::MAX;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < 1e-8 {
                if o < lo[axis] || o > hi[axis] {
                    return None;
                }
            } else {
                let mut t0 = (lo[axis] - o) / d;
                let mut t1 = (hi[axis] - o) / d;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_enter = t_enter.max(t0);
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return None;
                }
            }
        }

        Some((t_enter, t_exit))
    }
}

/// Bisect a bracketed surface crossing down to a tight parameter value.
/// `t_above` must evaluate above the surface and `t_below` below it.
fn refine_crossing(mut t_above: f32, mut t_below: f32, f: &impl Fn(f32) -> f32) -> f32 {
    for _ in 0..RAYCAST_REFINE_STEPS {
        let mid = 0.5 * (t_above + t_below);
        if f(mid) > 0.0 {
            t_above = mid;
        } else {
            t_below = mid;
        }
    }
    t_below
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::HeightFieldParams;

    fn test_surface() -> TerrainSurface {
        let params = HeightFieldParams {
            world_size: 256.0,
            resolution: 16,
            ..HeightFieldParams::default()
        };
        TerrainSurface::build(&HeightField::generate(params, 42))
    }

    #[test]
    fn test_classify_elevation_thresholds() {
        assert_eq!(ElevationBand::classify(-10.0), ElevationBand::DeepWater);
        assert_eq!(ElevationBand::classify(-5.0), ElevationBand::ShallowWater);
        assert_eq!(ElevationBand::classify(-0.1), ElevationBand::ShallowWater);
        assert_eq!(ElevationBand::classify(0.0), ElevationBand::Sand);
        assert_eq!(ElevationBand::classify(5.0), ElevationBand::Grass);
        assert_eq!(ElevationBand::classify(19.9), ElevationBand::Grass);
        assert_eq!(ElevationBand::classify(20.0), ElevationBand::Mountain);
        assert_eq!(ElevationBand::classify(30.0), ElevationBand::Snow);
    }

    #[test]
    fn test_mesh_dimensions() {
        let surface = test_surface();
        let mesh = surface.mesh();

        assert_eq!(mesh.vertex_count(), 17 * 17);
        assert_eq!(mesh.triangle_count(), 16 * 16 * 2);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.colors.len(), mesh.vertex_count());
    }

    #[test]
    fn test_height_at_delegates_to_grid() {
        let params = HeightFieldParams {
            world_size: 256.0,
            resolution: 16,
            ..HeightFieldParams::default()
        };
        let field = HeightField::generate(params, 42);
        let surface = TerrainSurface::build(&field);

        assert_eq!(surface.height_at(12.0, -40.0), field.height_at(12.0, -40.0));
        // Clamp contract carries through
        assert_eq!(surface.height_at(9999.0, 0.0), field.height_at(128.0, 0.0));
    }

    #[test]
    fn test_raycast_straight_down_hits_surface() {
        let surface = test_surface();
        let origin = Vec3::new(10.0, 500.0, -20.0);

        let hit = surface
            .raycast(origin, Vec3::new(0.0, -1.0, 0.0))
            .expect("downward ray must hit");

        assert!((hit.x - 10.0).abs() < 1e-3);
        assert!((hit.z + 20.0).abs() < 1e-3);
        let expected = surface.grid.sample_bilinear(hit.x, hit.z);
        assert!((hit.y - expected).abs() < 0.05, "hit.y={} surface={}", hit.y, expected);
    }

    #[test]
    fn test_raycast_misses_outside_grid() {
        let surface = test_surface();

        // Pointing away from the volume
        assert!(surface
            .raycast(Vec3::new(0.0, 500.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
            .is_none());
        // Parallel ray far outside the extent
        assert!(surface
            .raycast(Vec3::new(0.0, 500.0, 1000.0), Vec3::new(1.0, 0.0, 0.0))
            .is_none());
        // Degenerate direction
        assert!(surface.raycast(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_raycast_from_below_hits_at_entry() {
        let surface = test_surface();
        let origin = Vec3::new(5.0, surface.grid.min_height() - 0.5, 5.0);

        // Starts inside the volume below the surface: immediate hit.
        let hit = surface.raycast(origin, Vec3::new(0.0, 1.0, 0.0));
        assert!(hit.is_some());
    }

    #[test]
    fn test_update_is_cosmetic_only() {
        let mut surface = test_surface();
        let before = surface.height_at(3.0, 4.0);

        surface.update(0.25);
        surface.update(10.0);

        assert_eq!(surface.height_at(3.0, 4.0), before);
        assert!(surface.water_phase() >= 0.0 && surface.water_phase() < std::f32::consts::TAU);
    }
}
