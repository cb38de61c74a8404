//! Mesh generation for voxel chunks.
//!
//! This module converts one chunk's block grid into two quad lists, one for
//! opaque faces and one for transparent faces, with per-vertex ambient
//! occlusion on the opaque ones.
//!
//! # Architecture
//! - `ChunkMesh`: Growable per-slot vertex storage, reused across re-meshes
//! - `BlockLookup`: Neighbor-aware block access across chunk borders
//! - `face`: Cube corner tables, diagonal flipping and quad emission
//! - `ambient_occlusion`: The corner offset table and occlusion sampling
//!
//! # Face Visibility
//! A face of a non-empty cell is emitted when its neighbor lets it be seen:
//! - an opaque block shows a face toward any transparent neighbor
//! - a transparent block shows a face toward any neighbor of another type,
//!   so touching water cells merge into one surface
//!
//! # Performance Considerations
//! - Every cell is visited once per re-mesh, six neighbor tests each
//! - Neighbors inside the chunk are read directly; only border cells go
//!   through `BlockLookup`
//! - Mesh storage keeps its capacity, so steady-state re-meshing does not
//!   allocate

use cgmath::Point3;

use crate::engine_state::{
    geometry::Aabb,
    rendering::vertex::VoxelVertex,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{BlockGrid, CHUNK_SIZE},
    },
};

pub mod ambient_occlusion;
pub mod face;

use ambient_occlusion::get_occlusion;
use face::{push_face, FACE_CORNERS};

/// Block access that can look one cell past a chunk's border.
pub trait BlockLookup {
    /// Block at local coordinate `block` of the chunk at spatial coordinate
    /// `chunk`.
    ///
    /// Each local component may be `-1` or `CHUNK_SIZE`, which addresses the
    /// adjacent chunk. Cells outside the loaded grid read as `NONE`.
    fn get_block_at(&self, chunk: Point3<i32>, block: Point3<i32>) -> BlockType;
}

/// Quads of one chunk, four vertices per face.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    vertices: Vec<VoxelVertex>,
}

impl ChunkMesh {
    /// Removes every face while keeping the allocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Appends one face.
    pub fn push_face(&mut self, face: [VoxelVertex; 4]) {
        self.vertices.extend_from_slice(&face);
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether the mesh holds no faces.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices in emission order.
    pub fn vertices(&self) -> &[VoxelVertex] {
        &self.vertices
    }

    /// Faces as groups of four vertices.
    pub fn faces(&self) -> &[[VoxelVertex; 4]] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Whether a face of `block` toward `neighbor` is visible.
#[inline]
pub fn is_face_visible(block: BlockType, neighbor: BlockType) -> bool {
    if block.is_transparent() {
        neighbor != block
    } else {
        neighbor.is_transparent()
    }
}

/// Result of meshing one chunk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshSummary {
    /// World-space box around every cell that emitted a face
    pub bounds: Aabb,
    /// Whether the chunk holds no blocks at all
    pub only_air: bool,
}

/// Rebuilds both meshes of a chunk.
///
/// # Arguments
/// * `lookup` - Access to neighboring chunks for border cells
/// * `blocks` - The chunk's block grid
/// * `chunk` - Spatial coordinate of the chunk in the area
/// * `chunk_position` - World position of the chunk's minimum corner
/// * `opaque` - Cleared and refilled with opaque faces
/// * `transparent` - Cleared and refilled with transparent faces
///
/// # Returns
/// The bounds of the emitted geometry, or a zero-sized box at
/// `chunk_position` when nothing is visible, and the chunk's air flag.
pub fn mesh_chunk<L: BlockLookup + ?Sized>(
    lookup: &L,
    blocks: &BlockGrid,
    chunk: Point3<i32>,
    chunk_position: Point3<f32>,
    opaque: &mut ChunkMesh,
    transparent: &mut ChunkMesh,
) -> MeshSummary {
    opaque.clear();
    transparent.clear();

    let mut bounds: Option<Aabb> = None;
    let mut only_air = true;

    let block_at = |local: Point3<i32>| -> BlockType {
        let inside = |c: i32| (0..CHUNK_SIZE).contains(&c);
        if inside(local.x) && inside(local.y) && inside(local.z) {
            blocks.at(local.x as usize, local.y as usize, local.z as usize)
        } else {
            lookup.get_block_at(chunk, local)
        }
    };

    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let block_type = blocks.at(x as usize, y as usize, z as usize);
                if block_type == BlockType::NONE {
                    continue;
                }
                only_air = false;

                let local = Point3::new(x, y, z);
                let position = Point3::new(
                    chunk_position.x + x as f32,
                    chunk_position.y + y as f32,
                    chunk_position.z + z as f32,
                );
                let mut emitted = false;

                for side in BlockSide::all() {
                    let neighbor = block_at(local + side.offset());
                    if !is_face_visible(block_type, neighbor) {
                        continue;
                    }

                    if block_type.is_transparent() {
                        push_face(transparent, position, side, block_type, [1.0; 4]);
                    } else {
                        let ao = FACE_CORNERS[side as usize]
                            .map(|corner| get_occlusion(lookup, chunk, local, side, corner));
                        push_face(opaque, position, side, block_type, ao);
                    }
                    emitted = true;
                }

                if emitted {
                    let cell = Aabb::unit_cell(position);
                    bounds = Some(match bounds {
                        Some(b) => b.union(&cell),
                        None => cell,
                    });
                }
            }
        }
    }

    MeshSummary {
        bounds: bounds.unwrap_or_else(|| Aabb::degenerate(chunk_position)),
        only_air,
    }
}
