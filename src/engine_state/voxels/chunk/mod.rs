//! # Chunk Module
//!
//! This module provides `BlockGrid`, the fixed-size cube of block types that
//! backs one chunk, and the heightfield terrain generation that fills it.
//!
//! ## Memory Layout
//!
//! A grid stores exactly one `BlockType` (one byte) per cell in a single
//! boxed slice, flattened as `x + y * CHUNK_SIZE + z * CHUNK_SIZE²`.
//! Grids are allocated once when the chunk area is created and are then
//! overwritten in place; re-centering never moves or copies them.

use super::block::block_type::BlockType;

pub mod chunk_generation;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_SIZE²).
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
/// The total number of blocks in a chunk (CHUNK_SIZE³).
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_SIZE as usize;

/// One chunk worth of block data.
#[derive(Clone, Debug)]
pub struct BlockGrid {
    blocks: Box<[BlockType]>,
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGrid {
    /// Creates a grid filled with `NONE`.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockType::NONE; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Flattened index of the cell at `(x, y, z)`.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(
            x < CHUNK_SIZE as usize && y < CHUNK_SIZE as usize && z < CHUNK_SIZE as usize,
            "cell ({x}, {y}, {z}) is outside the chunk"
        );
        x + y * CHUNK_SIZE as usize + z * CHUNK_PLANE_SIZE
    }

    /// Block type stored at `(x, y, z)`.
    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Overwrites the block type stored at `(x, y, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.blocks[Self::index(x, y, z)] = block_type;
    }

    /// Sets every cell to `block_type`.
    pub fn fill(&mut self, block_type: BlockType) {
        self.blocks.fill(block_type);
    }

    /// Whether every cell is `NONE`.
    pub fn is_only_air(&self) -> bool {
        self.blocks.iter().all(|&b| b == BlockType::NONE)
    }

    /// The raw cells in storage order.
    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks
    }
}
