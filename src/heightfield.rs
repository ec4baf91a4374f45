//! Height-field generation and point queries
//!
//! Generates a sampled elevation surface using layered synthesis:
//! 1. Multi-octave Perlin noise for base terrain variation
//! 2. Radial falloff so elevation attenuates toward the world edge,
//!    producing a bounded central landmass rather than unbounded noise
//!
//! Generation is a pure function of its parameters and seed; the same inputs
//! always reproduce the identical grid, including under parallel row
//! generation.

use std::sync::Arc;

use noise::{NoiseFn, Perlin, Seedable};
use rayon::prelude::*;

/// Parameters for height-field generation
#[derive(Clone, Copy, Debug)]
pub struct HeightFieldParams {
    /// Physical extent of the square world along each axis
    pub world_size: f32,
    /// Number of grid cells per axis (the grid has `resolution + 1` samples per axis)
    pub resolution: usize,
    /// Base noise frequency per world unit (lower = larger features)
    pub base_frequency: f64,
    /// Amplitude of the first octave in elevation units
    pub base_amplitude: f32,
    /// Number of noise octaves; frequency doubles and amplitude halves per octave
    pub octaves: u32,
}

impl Default for HeightFieldParams {
    fn default() -> Self {
        Self {
            world_size: 512.0,
            resolution: 128,
            base_frequency: 0.008,
            base_amplitude: 20.0,
            octaves: 4,
        }
    }
}

/// An immutable, fully populated elevation grid.
///
/// `(resolution + 1) x (resolution + 1)` samples covering
/// `[-world_size/2, world_size/2]` on both axes. Never mutated after
/// construction; regeneration builds a whole new grid.
#[derive(Clone, Debug)]
pub struct HeightGrid {
    world_size: f32,
    resolution: usize,
    samples: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightGrid {
    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Get the stored sample at grid indices, clamped to `[0, resolution]`.
    pub fn sample(&self, i: usize, j: usize) -> f32 {
        let i = i.min(self.resolution);
        let j = j.min(self.resolution);
        self.samples[j * (self.resolution + 1) + i]
    }

    /// Map one world coordinate to a grid index, clamping to the valid range.
    fn world_to_index(&self, coord: f32) -> usize {
        let t = ((coord / self.world_size + 0.5) * self.resolution as f32).floor();
        t.clamp(0.0, self.resolution as f32) as usize
    }

    /// Elevation at world coordinates. Out-of-range coordinates never fail;
    /// they return the nearest edge sample.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let i = self.world_to_index(x);
        let j = self.world_to_index(z);
        self.sample(i, j)
    }

    /// Elevation at world coordinates using bilinear interpolation between the
    /// four surrounding samples. Clamps to the grid edge like `height_at`.
    pub fn sample_bilinear(&self, x: f32, z: f32) -> f32 {
        let res = self.resolution as f32;
        let gx = ((x / self.world_size + 0.5) * res).clamp(0.0, res);
        let gz = ((z / self.world_size + 0.5) * res).clamp(0.0, res);

        let i0 = gx.floor() as usize;
        let j0 = gz.floor() as usize;
        let i1 = (i0 + 1).min(self.resolution);
        let j1 = (j0 + 1).min(self.resolution);

        let fx = gx - gx.floor();
        let fz = gz - gz.floor();

        let v00 = self.sample(i0, j0);
        let v10 = self.sample(i1, j0);
        let v01 = self.sample(i0, j1);
        let v11 = self.sample(i1, j1);

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fz) + v1 * fz
    }

    /// World coordinate of sample index along one axis.
    pub fn index_to_world(&self, i: usize) -> f32 {
        (i as f32 / self.resolution as f32 - 0.5) * self.world_size
    }

    /// Iterate over all samples with their grid coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let side = self.resolution + 1;
        self.samples.iter().enumerate().map(move |(idx, &h)| {
            let i = idx % side;
            let j = idx / side;
            (i, j, h)
        })
    }

    /// Raw samples in row-major order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Owns the current elevation grid and its generation parameters.
///
/// The grid lives behind an `Arc`: readers take a snapshot handle and
/// regeneration swaps in a complete replacement grid, so a concurrent reader
/// never observes a half-built surface.
#[derive(Clone, Debug)]
pub struct HeightField {
    params: HeightFieldParams,
    seed: u64,
    grid: Arc<HeightGrid>,
}

impl HeightField {
    /// Deterministically generate the grid from the seed.
    pub fn generate(params: HeightFieldParams, seed: u64) -> Self {
        let grid = Arc::new(build_grid(&params, seed));
        Self { params, seed, grid }
    }

    /// Replace the grid with one generated from a new seed. The swap is
    /// atomic: snapshots taken before the call keep the old grid intact.
    pub fn regenerate(&mut self, seed: u64) {
        self.grid = Arc::new(build_grid(&self.params, seed));
        self.seed = seed;
    }

    /// Handle to the current grid; stays valid across regeneration.
    pub fn snapshot(&self) -> Arc<HeightGrid> {
        Arc::clone(&self.grid)
    }

    pub fn params(&self) -> &HeightFieldParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Elevation at world coordinates (nearest-sample, clamped).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.grid.height_at(x, z)
    }

    /// Stored sample at grid indices, clamped.
    pub fn sample(&self, i: usize, j: usize) -> f32 {
        self.grid.sample(i, j)
    }
}

/// Build a fully populated grid. Rows are generated in parallel; each sample
/// depends only on its own coordinates, so the result is independent of the
/// row schedule.
fn build_grid(params: &HeightFieldParams, seed: u64) -> HeightGrid {
    let noise = Perlin::new(1).set_seed(seed as u32);
    let side = params.resolution + 1;

    let rows: Vec<Vec<f32>> = (0..side)
        .into_par_iter()
        .map(|j| {
            let z = (j as f32 / params.resolution as f32 - 0.5) * params.world_size;
            (0..side)
                .map(|i| {
                    let x = (i as f32 / params.resolution as f32 - 0.5) * params.world_size;
                    sample_elevation(&noise, params, x, z)
                })
                .collect()
        })
        .collect();

    let samples: Vec<f32> = rows.into_iter().flatten().collect();

    let mut min_height = f32::MAX;
    let mut max_height = f32::MIN;
    for &h in &samples {
        min_height = min_height.min(h);
        max_height = max_height.max(h);
    }

    HeightGrid {
        world_size: params.world_size,
        resolution: params.resolution,
        samples,
        min_height,
        max_height,
    }
}

/// Elevation at one world position: octave noise attenuated by radial falloff.
fn sample_elevation(noise: &Perlin, params: &HeightFieldParams, x: f32, z: f32) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = params.base_amplitude;
    let mut frequency = params.base_frequency;

    for _ in 0..params.octaves {
        total += amplitude * noise.get([x as f64 * frequency, z as f64 * frequency]) as f32;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    total * radial_falloff(params.world_size, x, z)
}

/// Falloff factor `1 - 0.5 * (distance_from_center / max_distance)`.
///
/// `max_distance` is the half-diagonal, so the factor runs from 1.0 at the
/// world center down to 0.5 at the corners.
fn radial_falloff(world_size: f32, x: f32, z: f32) -> f32 {
    let max_distance = world_size * 0.5 * std::f32::consts::SQRT_2;
    let distance = (x * x + z * z).sqrt();
    1.0 - 0.5 * (distance / max_distance)
}
