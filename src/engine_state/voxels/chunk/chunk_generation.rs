//! Heightfield terrain generation.
//!
//! Terrain is a pure function of a 2D height oracle: every column samples
//! `MAX_HEIGHT_AMPLITUDE * source(x * HEIGHT_SAMPLE_SCALE, z * HEIGHT_SAMPLE_SCALE)`
//! and the cells below that height become stone, dirt or grass depending on
//! their depth.

use cgmath::Vector3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::{BlockGrid, CHUNK_SIZE};
use crate::engine_state::voxels::block::block_type::BlockType;

/// Peak terrain height above (and depth below) `y = 0`, in blocks.
pub const MAX_HEIGHT_AMPLITUDE: f32 = 16.0;
/// World to noise space scale for height sampling.
pub const HEIGHT_SAMPLE_SCALE: f32 = 0.0078125;

/// Depth below the surface at which dirt turns into stone.
const STONE_DEPTH: f32 = 4.0;
/// Depth below the surface at which grass turns into dirt.
const DIRT_DEPTH: f32 = 1.0;

/// A deterministic 2D noise oracle returning values roughly in `[-1, 1]`.
pub trait HeightSource {
    /// Samples the oracle at noise-space coordinates.
    fn height(&self, x: f32, z: f32) -> f32;
}

impl<F> HeightSource for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Fractal Perlin noise, the default terrain oracle.
pub struct FractalNoise {
    fbm: Fbm<Perlin>,
}

impl FractalNoise {
    /// Creates a fractal noise oracle.
    ///
    /// # Arguments
    /// * `seed` - Seed of the underlying Perlin noise
    /// * `octaves` - Number of summed octaves
    pub fn new(seed: u32, octaves: usize) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(seed).set_octaves(octaves),
        }
    }
}

impl HeightSource for FractalNoise {
    fn height(&self, x: f32, z: f32) -> f32 {
        self.fbm.get([x as f64, z as f64]) as f32
    }
}

/// Terrain height of the column at world position `(x, z)`.
pub fn column_height<H: HeightSource + ?Sized>(source: &H, x: f32, z: f32) -> f32 {
    MAX_HEIGHT_AMPLITUDE * source.height(x * HEIGHT_SAMPLE_SCALE, z * HEIGHT_SAMPLE_SCALE)
}

/// Block type of a cell whose bottom lies `depth` blocks below the surface.
pub fn block_for_depth(depth: f32) -> BlockType {
    if depth >= STONE_DEPTH {
        BlockType::STONE
    } else if depth >= DIRT_DEPTH {
        BlockType::DIRT
    } else if depth >= 0.0 {
        BlockType::GRASS
    } else {
        BlockType::NONE
    }
}

/// Whether a chunk whose minimum corner sits at `world_y` can contain terrain.
pub fn may_contain_terrain(world_y: f32) -> bool {
    world_y - (CHUNK_SIZE as f32 / 2.0) <= MAX_HEIGHT_AMPLITUDE
}

/// Overwrites `grid` with the terrain of the chunk at `world_position`.
///
/// Chunks entirely above the terrain amplitude skip sampling and are cleared.
///
/// # Returns
/// `true` if every generated cell is `NONE`.
pub fn generate_chunk<H: HeightSource + ?Sized>(
    grid: &mut BlockGrid,
    world_position: Vector3<f32>,
    source: &H,
) -> bool {
    if !may_contain_terrain(world_position.y) {
        grid.fill(BlockType::NONE);
        return true;
    }

    let mut only_air = true;
    for cz in 0..CHUNK_SIZE as usize {
        for cx in 0..CHUNK_SIZE as usize {
            let fx = cx as f32 + world_position.x;
            let fz = cz as f32 + world_position.z;
            let height = column_height(source, fx, fz);

            for cy in 0..CHUNK_SIZE as usize {
                let fy = cy as f32 + world_position.y;
                let block_type = block_for_depth(height - fy);
                grid.set(cx, cy, cz, block_type);
                only_air &= block_type == BlockType::NONE;
            }
        }
    }

    only_air
}
