//! # Draw Backend
//!
//! The renderer never talks to the GPU directly. It drives a [`DrawBackend`],
//! which receives vertex uploads into the current batch and one indexed draw
//! per flush. Two implementations exist:
//!
//! - [`RecordingBackend`]: keeps every draw in memory, for tests and the
//!   headless statistics run
//! - `WgpuChunkBackend`: stages batches into GPU buffers and replays them in
//!   a render pass
//!
//! Every quad is drawn through one of two shared index buffers built here,
//! so a batch never carries its own indices.

use super::vertex::VoxelVertex;
use crate::engine_state::camera_state::camera::CameraUniform;

/// How the index buffer of a draw is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Two triangles per face
    Triangles,
    /// Six edges per face, including the diagonal
    Lines,
}

impl Topology {
    /// Indices consumed by one face.
    pub const fn indices_per_face(self) -> u32 {
        match self {
            Topology::Triangles => 6,
            Topology::Lines => 12,
        }
    }
}

/// The GPU submission surface used by the chunk renderer.
pub trait DrawBackend {
    /// Texture bound while drawing blocks.
    type Atlas;

    /// Receives the shared index buffers once, before the first frame.
    fn create_index_buffers(&mut self, filled: &[u32], wireframe: &[u32]);

    /// Starts a frame with the given camera and atlas.
    fn begin_frame(&mut self, camera: &CameraUniform, atlas: &Self::Atlas);

    /// Writes vertices into the current batch at `byte_offset`.
    fn upload_vertices(&mut self, byte_offset: usize, vertices: &[VoxelVertex]);

    /// Draws the current batch and starts a new one.
    fn draw_indexed(&mut self, topology: Topology, index_count: u32);

    /// Enables or disables depth writes for subsequent draws.
    fn set_depth_write(&mut self, enabled: bool);

    /// Color multiplied into subsequent draws.
    fn set_debug_tint(&mut self, tint: [f32; 4]);

    /// Whether subsequent draws show only the occlusion term, untextured.
    fn set_lighting(&mut self, enabled: bool);

    /// Finishes the frame.
    fn end_frame(&mut self);
}

/// Builds the filled index buffer for `faces` quads: `0,1,2,2,3,0` per face.
pub fn filled_indices(faces: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(faces * 6);
    for face in 0..faces as u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// Builds the wireframe index buffer for `faces` quads:
/// `0,1,1,2,2,0,2,3,3,0,0,2` per face.
pub fn wireframe_indices(faces: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(faces * 12);
    for face in 0..faces as u32 {
        let base = face * 4;
        indices.extend_from_slice(&[
            base,
            base + 1,
            base + 1,
            base + 2,
            base + 2,
            base,
            base + 2,
            base + 3,
            base + 3,
            base,
            base,
            base + 2,
        ]);
    }
    indices
}

/// A draw captured by [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedDraw {
    /// Index interpretation
    pub topology: Topology,
    /// Indices drawn
    pub index_count: u32,
    /// Depth write state at the time of the draw
    pub depth_write: bool,
    /// Tint at the time of the draw
    pub tint: [f32; 4],
    /// Lighting debug view state at the time of the draw
    pub lighting: bool,
    /// Vertices in the batch
    pub vertex_count: usize,
    /// Vertices of the batch, empty for a stats-only recorder
    pub vertices: Vec<VoxelVertex>,
}

/// A backend that keeps the draws of the current frame in memory.
#[derive(Debug)]
pub struct RecordingBackend {
    draws: Vec<RecordedDraw>,
    staging: Vec<VoxelVertex>,
    staged_vertices: usize,
    keep_vertices: bool,
    filled_index_count: usize,
    wireframe_index_count: usize,
    depth_write: bool,
    tint: [f32; 4],
    lighting: bool,
    camera_position: [f32; 3],
    frames: usize,
    in_frame: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            draws: Vec::new(),
            staging: Vec::new(),
            staged_vertices: 0,
            keep_vertices: true,
            filled_index_count: 0,
            wireframe_index_count: 0,
            depth_write: true,
            tint: [1.0; 4],
            lighting: false,
            camera_position: [0.0; 3],
            frames: 0,
            in_frame: false,
        }
    }
}

impl RecordingBackend {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that only counts vertices instead of copying them.
    pub fn stats_only() -> Self {
        Self {
            keep_vertices: false,
            ..Self::default()
        }
    }

    /// Draws of the last (or current) frame.
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Lengths of the filled and wireframe index buffers.
    pub fn index_buffer_lengths(&self) -> (usize, usize) {
        (self.filled_index_count, self.wireframe_index_count)
    }

    /// Whether depth writes are currently enabled.
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Camera position received by the last `begin_frame`.
    pub fn camera_position(&self) -> [f32; 3] {
        self.camera_position
    }

    /// Frames completed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl DrawBackend for RecordingBackend {
    type Atlas = ();

    fn create_index_buffers(&mut self, filled: &[u32], wireframe: &[u32]) {
        self.filled_index_count = filled.len();
        self.wireframe_index_count = wireframe.len();
    }

    fn begin_frame(&mut self, camera: &CameraUniform, _atlas: &()) {
        assert!(!self.in_frame, "begin_frame called twice without end_frame");
        self.in_frame = true;
        self.draws.clear();
        self.staging.clear();
        self.staged_vertices = 0;
        self.camera_position = camera.position().into();
    }

    fn upload_vertices(&mut self, byte_offset: usize, vertices: &[VoxelVertex]) {
        debug_assert!(self.in_frame, "upload outside of a frame");
        let start = byte_offset / std::mem::size_of::<VoxelVertex>();
        let end = start + vertices.len();
        self.staged_vertices = self.staged_vertices.max(end);
        if !self.keep_vertices {
            return;
        }
        if self.staging.len() < end {
            self.staging.resize(end, VoxelVertex::default());
        }
        self.staging[start..end].copy_from_slice(vertices);
    }

    fn draw_indexed(&mut self, topology: Topology, index_count: u32) {
        debug_assert!(self.in_frame, "draw outside of a frame");
        self.draws.push(RecordedDraw {
            topology,
            index_count,
            depth_write: self.depth_write,
            tint: self.tint,
            lighting: self.lighting,
            vertex_count: std::mem::take(&mut self.staged_vertices),
            vertices: std::mem::take(&mut self.staging),
        });
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn set_debug_tint(&mut self, tint: [f32; 4]) {
        self.tint = tint;
    }

    fn set_lighting(&mut self, enabled: bool) {
        self.lighting = enabled;
    }

    fn end_frame(&mut self) {
        assert!(self.in_frame, "end_frame called without begin_frame");
        self.in_frame = false;
        self.frames += 1;
    }
}
