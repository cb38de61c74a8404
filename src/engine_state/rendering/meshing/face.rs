use cgmath::{Point3, Vector3};

use super::ChunkMesh;
use crate::engine_state::{
    rendering::vertex::VoxelVertex,
    voxels::block::{atlas_uv_rect, block_side::BlockSide, block_type::BlockType},
};

/// Corners of the unit cube, indexed by the corner numbers used in the
/// ambient occlusion table.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
];

/// Cube corners of each face in emission order, counter-clockwise seen from
/// outside. Indexed by `BlockSide`.
pub const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // FRONT
    [3, 2, 7, 6], // UP
    [7, 2, 1, 4], // RIGHT
    [3, 6, 5, 0], // LEFT
    [1, 0, 5, 4], // DOWN
    [6, 7, 4, 5], // BACK
];

/// Whether the quad should be split along its other diagonal.
///
/// `ao` holds the occlusion of the four emitted corners `[a00, a01, a11, a10]`.
/// The shared index buffer always splits along `v0 - v2`; rotating the
/// vertices by one moves the seam to `v1 - v3`.
pub fn should_flip(side: BlockSide, ao: [f32; 4]) -> bool {
    let [a00, a01, a11, a10] = ao;
    match side {
        BlockSide::FRONT => a00 + a11 > a01 + a10,
        _ => a01 + a10 > a00 + a11,
    }
}

/// Emits one face of the block whose minimum corner is `position`.
///
/// # Arguments
/// * `mesh` - Destination mesh
/// * `position` - World position of the block's minimum corner
/// * `side` - Which face to emit
/// * `block_type` - Block type, selects the atlas cell
/// * `ao` - Occlusion of the face corners in `FACE_CORNERS` order
pub fn push_face(
    mesh: &mut ChunkMesh,
    position: Point3<f32>,
    side: BlockSide,
    block_type: BlockType,
    ao: [f32; 4],
) {
    let normal = side.normal();
    let [u, v, s, t] = atlas_uv_rect(block_type.texture_indices()[side as usize]);
    // RIGHT, LEFT and BACK list their top corners first.
    let tex_coords = match side {
        BlockSide::RIGHT | BlockSide::LEFT | BlockSide::BACK => [[u, t], [s, t], [s, v], [u, v]],
        _ => [[u, v], [s, v], [s, t], [u, t]],
    };
    let corners = FACE_CORNERS[side as usize];

    let vertices: [VoxelVertex; 4] = std::array::from_fn(|i| {
        VoxelVertex::new(
            position + Vector3::from(CUBE_CORNERS[corners[i]]),
            normal,
            tex_coords[i],
            ao[i],
        )
    });

    if should_flip(side, ao) {
        let [v0, v1, v2, v3] = vertices;
        mesh.push_face([v1, v2, v3, v0]);
    } else {
        mesh.push_face(vertices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn face_corners_lie_on_the_face_plane() {
        for side in BlockSide::all() {
            let offset = side.offset();
            for &corner in &FACE_CORNERS[side as usize] {
                let c = CUBE_CORNERS[corner];
                for axis in 0..3 {
                    match offset[axis] {
                        1 => assert_eq!(c[axis], 1.0, "{side:?}"),
                        -1 => assert_eq!(c[axis], 0.0, "{side:?}"),
                        _ => {}
                    }
                }
            }
        }
    }

    #[test]
    fn winding_faces_outward() {
        for side in BlockSide::all() {
            let [a, b, c, _] = FACE_CORNERS[side as usize].map(|i| Vector3::from(CUBE_CORNERS[i]));
            let winding = (b - a).cross(c - a).normalize();
            assert!((winding - side.normal()).magnitude() < 1e-6, "{side:?}");
        }
    }

    #[test]
    fn flip_rotates_the_vertices() {
        let mut mesh = ChunkMesh::default();
        let ao = [1.0, 0.0, 1.0, 0.0];
        push_face(&mut mesh, Point3::new(0.0, 0.0, 0.0), BlockSide::FRONT, BlockType::STONE, ao);
        assert!(should_flip(BlockSide::FRONT, ao));
        let face = mesh.faces()[0];
        assert_eq!(face[0].position, [1.0, 0.0, 1.0]);
        assert_eq!(face[3].position, [0.0, 0.0, 1.0]);
        assert_eq!(face[3].occlusion, 1.0);
    }

    #[test]
    fn side_textures_stay_upright() {
        for side in [BlockSide::FRONT, BlockSide::RIGHT, BlockSide::LEFT, BlockSide::BACK] {
            let mut mesh = ChunkMesh::default();
            push_face(&mut mesh, Point3::new(0.0, 0.0, 0.0), side, BlockType::GRASS, [1.0; 4]);
            let face = mesh.faces()[0];

            let v_at = |top: bool| -> Vec<f32> {
                face.iter()
                    .filter(|vertex| (vertex.position[1] == 1.0) == top)
                    .map(|vertex| vertex.tex_coord[1])
                    .collect()
            };
            let (bottom, top) = (v_at(false), v_at(true));
            assert_eq!(bottom.len(), 2, "{side:?}");
            assert!(bottom[0] == bottom[1] && top[0] == top[1], "{side:?}");
            assert!(bottom[0] > top[0], "{side:?}: bottom {bottom:?} top {top:?}");
        }
    }

    #[test]
    fn flip_rule_differs_for_front() {
        let ao = [0.0, 1.0, 0.0, 1.0];
        assert!(!should_flip(BlockSide::FRONT, ao));
        assert!(should_flip(BlockSide::UP, ao));
        assert!(!should_flip(BlockSide::UP, [1.0; 4]));
    }
}
