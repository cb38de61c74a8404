//! Batched chunk renderer.
//!
//! # Architecture
//!
//! A frame is bracketed by [`ChunkRenderer::begin`] and [`ChunkRenderPass::end`].
//! Inside the bracket, [`ChunkRenderPass::render_chunk_area`] walks every slot
//! of the area and:
//! 1. Skips air-only chunks and chunks without faces
//! 2. Rejects chunks whose bounds lie outside the view frustum
//! 3. Appends opaque faces to the current batch, flushing first when the
//!    chunk would not fit
//! 4. Collects camera-facing transparent faces into a scratch list, but only
//!    on frames where the transparent view changed
//!
//! Transparent faces are then sorted back to front and drawn with depth
//! writes disabled.
//!
//! # Performance Considerations
//!
//! - One draw call per batch of up to [`MAX_BATCH_FACES`] faces, not per chunk
//! - Index buffers are shared and built once
//! - The transparent sort only runs when the camera moved or a transparent
//!   block changed; otherwise last frame's order is replayed

use cgmath::Point3;
use log::trace;

use super::{
    backend::{filled_indices, wireframe_indices, DrawBackend, Topology},
    transparent_sort::{faces_camera, sort_back_to_front},
    vertex::VoxelVertex,
    DebugRendererSettings, DebugRendererStats,
};
use crate::engine_state::{
    camera_state::{frustum::Frustum, CameraState},
    voxels::{area::ChunkArea, chunk::CHUNK_VOLUME},
};

/// Largest number of faces drawn by one call.
pub const MAX_BATCH_FACES: usize = 4 * CHUNK_VOLUME;

const VERTEX_SIZE: usize = std::mem::size_of::<VoxelVertex>();

/// Tints cycled through when batches are visualized.
pub const BATCH_TINTS: [[f32; 4]; 7] = [
    [1.0, 0.4, 0.4, 1.0],
    [0.4, 1.0, 0.4, 1.0],
    [0.4, 0.4, 1.0, 1.0],
    [1.0, 1.0, 0.4, 1.0],
    [1.0, 0.4, 1.0, 1.0],
    [0.4, 1.0, 1.0, 1.0],
    [1.0, 0.7, 0.3, 1.0],
];

const NO_TINT: [f32; 4] = [1.0; 4];

/// Owns a draw backend and the state kept between frames.
pub struct ChunkRenderer<B: DrawBackend> {
    backend: B,
    transparent_faces: Vec<[VoxelVertex; 4]>,
    rng: fastrand::Rng,
}

impl<B: DrawBackend> ChunkRenderer<B> {
    /// Creates a renderer and hands the shared index buffers to `backend`.
    pub fn new(backend: B) -> Self {
        Self::with_rng(backend, fastrand::Rng::new())
    }

    /// Like [`ChunkRenderer::new`] with a fixed pivot source for the
    /// transparent sort.
    pub fn with_rng(mut backend: B, rng: fastrand::Rng) -> Self {
        backend.create_index_buffers(
            &filled_indices(MAX_BATCH_FACES),
            &wireframe_indices(MAX_BATCH_FACES),
        );
        Self {
            backend,
            transparent_faces: Vec::new(),
            rng,
        }
    }

    /// The backend draws go to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend between frames.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Transparent faces in the order they were last drawn.
    pub fn transparent_faces(&self) -> &[[VoxelVertex; 4]] {
        &self.transparent_faces
    }

    /// Starts a frame.
    ///
    /// The frame ends when the returned pass is ended or dropped.
    pub fn begin<'r>(
        &'r mut self,
        camera: &CameraState,
        atlas: &B::Atlas,
    ) -> ChunkRenderPass<'r, B> {
        self.backend.begin_frame(camera.uniform(), atlas);
        ChunkRenderPass {
            renderer: self,
            camera_position: camera.position(),
            frustum: *camera.frustum(),
            batch_faces: 0,
        }
    }
}

/// One frame of chunk rendering.
pub struct ChunkRenderPass<'r, B: DrawBackend> {
    renderer: &'r mut ChunkRenderer<B>,
    camera_position: Point3<f32>,
    frustum: Frustum,
    batch_faces: usize,
}

impl<B: DrawBackend> ChunkRenderPass<'_, B> {
    /// Draws every visible chunk of `area`.
    ///
    /// # Arguments
    /// * `area` - The chunks to draw
    /// * `stats` - Counters to accumulate into
    /// * `settings` - Debug switches
    /// * `update_transparent` - Rebuild and re-sort the transparent faces;
    ///   when `false` the previous frame's order is drawn again
    pub fn render_chunk_area(
        &mut self,
        area: &ChunkArea,
        stats: &mut DebugRendererStats,
        settings: &DebugRendererSettings,
        update_transparent: bool,
    ) {
        let topology = if settings.show_wireframe {
            Topology::Lines
        } else {
            Topology::Triangles
        };
        self.renderer.backend.set_lighting(settings.show_lighting);
        self.renderer.backend.set_depth_write(true);

        if update_transparent {
            self.renderer.transparent_faces.clear();
        }

        for slot in 0..area.slot_count() {
            if area.is_only_air(slot) || !area.has_faces(slot) {
                continue;
            }
            if !self.frustum.intersects_aabb(&area.chunk_bounds(slot)) {
                stats.chunks_culled += 1;
                continue;
            }
            stats.chunks_drawn += 1;

            let opaque = area.opaque_mesh(slot);
            if !opaque.is_empty() {
                let faces = opaque.face_count();
                if self.batch_faces + faces >= MAX_BATCH_FACES {
                    self.flush(topology, stats, settings.show_batches);
                }
                self.renderer
                    .backend
                    .upload_vertices(self.batch_faces * 4 * VERTEX_SIZE, opaque.vertices());
                self.batch_faces += faces;
            }

            if update_transparent {
                let camera = self.camera_position;
                self.renderer.transparent_faces.extend(
                    area.transparent_mesh(slot)
                        .faces()
                        .iter()
                        .filter(|face| faces_camera(face, camera)),
                );
            }
        }
        self.flush(topology, stats, settings.show_batches);

        if update_transparent {
            let renderer = &mut *self.renderer;
            sort_back_to_front(
                &mut renderer.transparent_faces,
                self.camera_position,
                &mut renderer.rng,
            );
        }

        self.renderer.backend.set_depth_write(false);
        let count = self.renderer.transparent_faces.len();
        let mut start = 0;
        while start < count {
            let end = (start + MAX_BATCH_FACES - 1).min(count);
            let vertices: &[VoxelVertex] =
                bytemuck::cast_slice(&self.renderer.transparent_faces[start..end]);
            self.renderer.backend.upload_vertices(0, vertices);
            self.batch_faces = end - start;
            self.flush(topology, stats, settings.show_batches);
            start = end;
        }
        self.renderer.backend.set_depth_write(true);
        stats.transparent_faces += count;

        trace!(
            "rendered {} chunks ({} culled), {} triangles in {} batches",
            stats.chunks_drawn,
            stats.chunks_culled,
            stats.triangles,
            stats.batches
        );
    }

    fn flush(&mut self, topology: Topology, stats: &mut DebugRendererStats, show_batches: bool) {
        if self.batch_faces == 0 {
            return;
        }
        let tint = if show_batches {
            BATCH_TINTS[stats.batches % BATCH_TINTS.len()]
        } else {
            NO_TINT
        };
        let backend = &mut self.renderer.backend;
        backend.set_debug_tint(tint);
        backend.draw_indexed(
            topology,
            self.batch_faces as u32 * topology.indices_per_face(),
        );
        stats.triangles += 2 * self.batch_faces;
        stats.batches += 1;
        self.batch_faces = 0;
    }

    /// Ends the frame.
    pub fn end(self) {}
}

impl<B: DrawBackend> Drop for ChunkRenderPass<'_, B> {
    fn drop(&mut self) {
        self.renderer.backend.end_frame();
    }
}
