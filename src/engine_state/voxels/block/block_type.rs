//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides block type identification, conversion from the compact storage
//! format, and the transparency range test used by the mesher.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::{BlockTypeSize, BLOCK_TYPE_TO_TEXTURE_INDICES};

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant order matters: every type from `NONE` up to and including
/// [`LAST_TRANSPARENT_TYPE`] is treated as transparent, everything after it is
/// opaque. New see-through blocks must be added inside that range.
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
pub enum BlockType {
    /// Empty space. Never rendered.
    #[default]
    NONE = 0,

    // Transparent blocks
    /// Still water; adjacent water cells merge into one surface.
    WATER,
    /// Clear glass.
    GLASS,

    // Opaque blocks
    /// Plain dirt.
    DIRT,
    /// Dirt with a grass top.
    GRASS,
    /// Sand.
    SAND,
    /// Compacted sand.
    SAND_STONE,
    /// Gravel.
    GRAVEL,
    /// A tree trunk.
    WOOD,
    /// Processed wood.
    WOODEN_PLANK,
    /// Clay.
    CLAY,
    /// Bricks.
    BRICKS,
    /// Cobble stone.
    COBBLE_STONE,
    /// Cobble stone overgrown with moss.
    MOSSY_COBBLE_STONE,
    /// Solid stone, the bulk of generated terrain.
    STONE,
    /// Unbreakable floor rock.
    BEDROCK,
    /// Obsidian.
    OBSIDIAN,
}

/// Number of block types, including `NONE`.
pub const NUM_BLOCK_TYPES: usize = BlockType::OBSIDIAN as usize + 1;

/// The last discriminant of the transparent range `[NONE, LAST_TRANSPARENT_TYPE]`.
pub const LAST_TRANSPARENT_TYPE: BlockType = BlockType::GLASS;

/// Human readable names, indexed by discriminant.
const BLOCK_TYPE_NAMES: [&str; NUM_BLOCK_TYPES] = [
    "None",
    "Water",
    "Glass",
    "Dirt",
    "Grass",
    "Sand",
    "Sand Stone",
    "Gravel",
    "Wood",
    "Wooden Plank",
    "Clay",
    "Bricks",
    "Cobble Stone",
    "Mossy Cobble Stone",
    "Stone",
    "Bedrock",
    "Obsidian",
];

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not name a block type.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Whether light passes through this block type.
    ///
    /// This is a range check on the discriminant rather than a per-type
    /// property so it stays a single comparison in the meshing hot loop.
    #[inline]
    pub fn is_transparent(self) -> bool {
        (self as BlockTypeSize) <= LAST_TRANSPARENT_TYPE as BlockTypeSize
    }

    /// Whether this block type hides whatever is behind it.
    #[inline]
    pub fn is_opaque(self) -> bool {
        !self.is_transparent()
    }

    /// Display name of the block type.
    pub fn name(self) -> &'static str {
        BLOCK_TYPE_NAMES[self as usize]
    }

    /// Atlas cell indices for each face, in `BlockSide` order.
    pub fn texture_indices(self) -> &'static [u32; 6] {
        &BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize]
    }

    /// Iterates every block type in discriminant order.
    pub fn all() -> impl Iterator<Item = BlockType> {
        (0..NUM_BLOCK_TYPES as BlockTypeSize).filter_map(BlockType::from_int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparency_is_a_prefix_of_the_enumeration() {
        assert!(BlockType::NONE.is_transparent());
        assert!(BlockType::WATER.is_transparent());
        assert!(BlockType::GLASS.is_transparent());
        assert!(BlockType::DIRT.is_opaque());
        assert!(BlockType::OBSIDIAN.is_opaque());

        let first_opaque = BlockType::all().position(BlockType::is_opaque).unwrap();
        assert!(BlockType::all().skip(first_opaque).all(BlockType::is_opaque));
    }

    #[test]
    fn integer_round_trip_covers_every_type() {
        assert_eq!(BlockType::all().count(), NUM_BLOCK_TYPES);
        assert_eq!(BlockType::from_int(NUM_BLOCK_TYPES as u8), None);
        assert_eq!(BlockType::from_int(14), Some(BlockType::STONE));
        assert_eq!(BlockType::MOSSY_COBBLE_STONE.name(), "Mossy Cobble Stone");
    }
}
