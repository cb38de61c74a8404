//! Rendering system for the voxel engine.
//!
//! This module turns the chunk area's meshes into draw calls. Meshing lives in
//! [`meshing`]; everything else here is about getting those quads on screen in
//! as few submissions as possible.
//!
//! # Architecture
//! - `vertex`: The packed vertex layout shared by the mesher and the shader
//! - `backend`: The [`DrawBackend`] seam plus a recording implementation
//! - `renderer`: The batched, frustum-culled chunk renderer
//! - `transparent_sort`: Back-to-front ordering of transparent faces
//! - `texture` and `wgpu_backend`: The GPU implementation of the backend

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod meshing;
pub mod renderer;
pub mod texture;
pub mod transparent_sort;
pub mod vertex;
pub mod wgpu_backend;

pub use backend::{DrawBackend, RecordingBackend, Topology};
pub use renderer::{ChunkRenderPass, ChunkRenderer, MAX_BATCH_FACES};
pub use vertex::VoxelVertex;

/// Debug switches read by the renderer every frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugRendererSettings {
    /// Draw face outlines instead of filled quads
    pub show_wireframe: bool,
    /// Tint each batch with its own color
    pub show_batches: bool,
    /// Shade with ambient occlusion alone, without textures
    pub show_lighting: bool,
}

/// Counters accumulated while rendering a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugRendererStats {
    /// Triangles submitted, two per face
    pub triangles: usize,
    /// Draw calls issued
    pub batches: usize,
    /// Chunks that passed the frustum test
    pub chunks_drawn: usize,
    /// Chunks rejected by the frustum test
    pub chunks_culled: usize,
    /// Transparent faces drawn
    pub transparent_faces: usize,
}

impl DebugRendererStats {
    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
