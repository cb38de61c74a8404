//! # Ambient Occlusion
//!
//! Per-vertex darkening from the solid cells around each face corner.
//!
//! Every corner of a visible face samples three cells in front of the face:
//! the two cells sharing an edge with the corner ("sides") and the cell
//! sharing only the corner ("diagonal"). The offsets are fixed per
//! `(face, cube corner)` pair and live in [`AO_OFFSETS`], keyed by
//! `(face << 4) | corner`.

use cgmath::Point3;

use super::BlockLookup;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Three `(dx, dy, dz)` offsets: side, diagonal, side.
pub type CornerOffsets = [[i32; 3]; 3];

/// Number of slots in the offset table (6 faces, 16 corner slots each).
pub const AO_TABLE_SIZE: usize = 6 << 4;

const FRONT: usize = BlockSide::FRONT as usize;
const UP: usize = BlockSide::UP as usize;
const RIGHT: usize = BlockSide::RIGHT as usize;
const LEFT: usize = BlockSide::LEFT as usize;
const DOWN: usize = BlockSide::DOWN as usize;
const BACK: usize = BlockSide::BACK as usize;

/// `(face, cube corner, offsets)` for the four corners of every face.
const AO_ENTRIES: [(usize, usize, CornerOffsets); 24] = [
    (FRONT, 0, [[-1, 0, 1], [-1, -1, 1], [0, -1, 1]]),
    (FRONT, 1, [[0, -1, 1], [1, -1, 1], [1, 0, 1]]),
    (FRONT, 2, [[1, 0, 1], [1, 1, 1], [0, 1, 1]]),
    (FRONT, 3, [[0, 1, 1], [-1, 1, 1], [-1, 0, 1]]),
    (UP, 3, [[0, 1, 1], [-1, 1, 1], [-1, 1, 0]]),
    (UP, 2, [[1, 1, 0], [1, 1, 1], [0, 1, 1]]),
    (UP, 7, [[0, 1, -1], [1, 1, -1], [1, 1, 0]]),
    (UP, 6, [[-1, 1, 0], [-1, 1, -1], [0, 1, -1]]),
    (RIGHT, 7, [[1, 1, 0], [1, 1, -1], [1, 0, -1]]),
    (RIGHT, 2, [[1, 0, 1], [1, 1, 1], [1, 1, 0]]),
    (RIGHT, 1, [[1, -1, 0], [1, -1, 1], [1, 0, 1]]),
    (RIGHT, 4, [[1, 0, -1], [1, -1, -1], [1, -1, 0]]),
    (LEFT, 3, [[-1, 1, 0], [-1, 1, 1], [-1, 0, 1]]),
    (LEFT, 6, [[-1, 0, -1], [-1, 1, -1], [-1, 1, 0]]),
    (LEFT, 5, [[-1, -1, 0], [-1, -1, -1], [-1, 0, -1]]),
    (LEFT, 0, [[-1, 0, 1], [-1, -1, 1], [-1, -1, 0]]),
    (DOWN, 1, [[0, -1, 1], [1, -1, 1], [1, -1, 0]]),
    (DOWN, 0, [[-1, -1, 0], [-1, -1, 1], [0, -1, 1]]),
    (DOWN, 5, [[0, -1, -1], [-1, -1, -1], [-1, -1, 0]]),
    (DOWN, 4, [[1, -1, 0], [1, -1, -1], [0, -1, -1]]),
    (BACK, 6, [[0, 1, -1], [-1, 1, -1], [-1, 0, -1]]),
    (BACK, 7, [[1, 0, -1], [1, 1, -1], [0, 1, -1]]),
    (BACK, 4, [[0, -1, -1], [1, -1, -1], [1, 0, -1]]),
    (BACK, 5, [[-1, 0, -1], [-1, -1, -1], [0, -1, -1]]),
];

const fn build_offset_table() -> [CornerOffsets; AO_TABLE_SIZE] {
    let mut table = [[[0; 3]; 3]; AO_TABLE_SIZE];
    let mut i = 0;
    while i < AO_ENTRIES.len() {
        let (face, corner, offsets) = AO_ENTRIES[i];
        table[(face << 4) | corner] = offsets;
        i += 1;
    }
    table
}

/// Offsets sampled for each `(face << 4) | corner` key. Unused slots are zero.
pub static AO_OFFSETS: [CornerOffsets; AO_TABLE_SIZE] = build_offset_table();

/// Table key of a face corner.
#[inline]
pub fn ao_key(side: BlockSide, corner: usize) -> usize {
    ((side as usize) << 4) | corner
}

/// Occlusion factor of one face corner, in `[0, 1]`.
///
/// Each occluding cell takes away a third of the light. A corner whose two
/// side cells are both solid is fully dark whatever the diagonal holds, so no
/// light leaks through concave edges.
///
/// # Arguments
/// * `lookup` - Neighbor-aware block access
/// * `chunk` - Spatial coordinate of the chunk being meshed
/// * `block` - Local coordinate of the block owning the face
/// * `side` - The face
/// * `corner` - Cube corner index of the vertex
pub fn get_occlusion<L: BlockLookup + ?Sized>(
    lookup: &L,
    chunk: Point3<i32>,
    block: Point3<i32>,
    side: BlockSide,
    corner: usize,
) -> f32 {
    let [side1, diagonal, side2] = AO_OFFSETS[ao_key(side, corner)];
    let occludes = |offset: [i32; 3]| {
        let neighbor = Point3::new(block.x + offset[0], block.y + offset[1], block.z + offset[2]);
        lookup.get_block_at(chunk, neighbor).is_opaque()
    };

    let side1 = occludes(side1);
    let side2 = occludes(side2);
    if side1 && side2 {
        return 0.0;
    }

    let count = side1 as u32 + side2 as u32 + occludes(diagonal) as u32;
    (3 - count) as f32 / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::face::FACE_CORNERS;

    #[test]
    fn every_face_corner_has_offsets() {
        for side in BlockSide::all() {
            for &corner in &FACE_CORNERS[side as usize] {
                assert_ne!(AO_OFFSETS[ao_key(side, corner)], [[0; 3]; 3]);
            }
        }
    }

    #[test]
    fn offsets_lie_in_front_of_the_face() {
        for side in BlockSide::all() {
            let normal = side.offset();
            for &corner in &FACE_CORNERS[side as usize] {
                for offset in AO_OFFSETS[ao_key(side, corner)] {
                    let along = offset[0] * normal.x + offset[1] * normal.y + offset[2] * normal.z;
                    assert_eq!(along, 1, "{side:?} corner {corner}: {offset:?}");
                }
            }
        }
    }

    #[test]
    fn corners_visit_all_four_quadrants() {
        for side in BlockSide::all() {
            let normal = side.offset();
            let mut quadrants: Vec<[i32; 3]> = FACE_CORNERS[side as usize]
                .iter()
                .map(|&corner| {
                    let diagonal = AO_OFFSETS[ao_key(side, corner)][1];
                    [
                        diagonal[0] - normal.x,
                        diagonal[1] - normal.y,
                        diagonal[2] - normal.z,
                    ]
                })
                .collect();
            quadrants.sort();
            quadrants.dedup();
            assert_eq!(quadrants.len(), 4, "{side:?}");
        }
    }

    #[test]
    fn sides_are_edge_neighbors_of_the_diagonal() {
        for side in BlockSide::all() {
            for &corner in &FACE_CORNERS[side as usize] {
                let [s1, d, s2] = AO_OFFSETS[ao_key(side, corner)];
                for s in [s1, s2] {
                    let differing = (0..3).filter(|&i| s[i] != d[i]).count();
                    assert_eq!(differing, 1);
                }
            }
        }
    }
}
