//! # Block Module
//!
//! This module provides the block-related data of the voxel engine: the
//! block type catalog, block faces, and the static texture atlas table.

use block_type::NUM_BLOCK_TYPES;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Number of atlas cells along each side of the texture atlas.
pub const TEX_PACK_DIMENSION: u32 = 16;

/// Maps each block type to its atlas cell index for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array holds one index per face in `BlockSide` order:
/// [Front, Up, Right, Left, Down, Back]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u32; 6]; NUM_BLOCK_TYPES] = [
    [0, 0, 0, 0, 0, 0],             // NONE (never rendered)
    [205, 205, 205, 205, 205, 205], // WATER
    [49, 49, 49, 49, 49, 49],       // GLASS
    [2, 2, 2, 2, 2, 2],             // DIRT
    [3, 146, 3, 3, 2, 3],           // GRASS (top: 146, bottom: dirt)
    [18, 18, 18, 18, 18, 18],       // SAND
    [192, 176, 192, 192, 208, 192], // SAND_STONE
    [19, 19, 19, 19, 19, 19],       // GRAVEL
    [20, 21, 20, 20, 21, 20],       // WOOD (rings on top and bottom)
    [4, 4, 4, 4, 4, 4],             // WOODEN_PLANK
    [72, 72, 72, 72, 72, 72],       // CLAY
    [7, 7, 7, 7, 7, 7],             // BRICKS
    [16, 16, 16, 16, 16, 16],       // COBBLE_STONE
    [36, 36, 36, 36, 36, 36],       // MOSSY_COBBLE_STONE
    [1, 1, 1, 1, 1, 1],             // STONE
    [17, 17, 17, 17, 17, 17],       // BEDROCK
    [37, 37, 37, 37, 37, 37],       // OBSIDIAN
];

/// Converts an atlas cell index into a normalized UV rectangle.
///
/// Rows are counted from the top of the atlas image while texture space has
/// its origin at the bottom, hence the flipped row.
///
/// # Returns
/// `[u, v, s, t]` where `(u, v)` is the lower-left and `(s, t)` the opposite
/// corner of the cell.
pub fn atlas_uv_rect(texture_index: u32) -> [f32; 4] {
    let cell = 1.0 / TEX_PACK_DIMENSION as f32;
    let atlas_x = texture_index % TEX_PACK_DIMENSION;
    let atlas_y = TEX_PACK_DIMENSION - texture_index / TEX_PACK_DIMENSION;
    [
        atlas_x as f32 * cell,
        atlas_y as f32 * cell,
        (atlas_x + 1) as f32 * cell,
        (atlas_y as f32 - 1.0) * cell,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_rect_of_first_cell_is_top_left() {
        let [u, v, s, t] = atlas_uv_rect(0);
        assert_eq!((u, v, s, t), (0.0, 1.0, 1.0 / 16.0, 15.0 / 16.0));
    }

    #[test]
    fn uv_rect_wraps_rows() {
        let [u, v, s, t] = atlas_uv_rect(18);
        assert_eq!(u, 2.0 / 16.0);
        assert_eq!(v, 15.0 / 16.0);
        assert_eq!(s, 3.0 / 16.0);
        assert_eq!(t, 14.0 / 16.0);
    }

    #[test]
    fn every_index_stays_inside_the_atlas() {
        for row in BLOCK_TYPE_TO_TEXTURE_INDICES.iter() {
            for &index in row {
                let [u, v, s, t] = atlas_uv_rect(index);
                for c in [u, v, s, t] {
                    assert!((0.0..=1.0).contains(&c));
                }
            }
        }
    }
}
