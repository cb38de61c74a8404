//! # Engine State Module
//!
//! The core engine module that ties the chunk area, the camera and the
//! renderer together into one per-frame step.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Handles camera positioning, movement and the frustum
//! * `geometry` - Boxes and rays shared by culling and picking
//! * `rendering` - Meshing, batching and the draw backends
//! * `settings` - Runtime configuration
//! * `voxels` - Block data, the sliding chunk area and picking
//!
//! ## Frame Order
//!
//! 1. The camera applies pending movement and rebuilds its frustum
//! 2. The area advances its re-centering work for the new viewer position
//! 3. The renderer draws the area, re-sorting transparent faces only when the
//!    transparent view may have changed (see [`needs_transparent_update`])
//!
//! Block edits happen between frames through [`EngineState::remove_targeted_block`]
//! and [`EngineState::place_targeted_block`].

use cgmath::Point3;
use log::debug;
use web_time::Duration;

use camera_state::CameraState;
use rendering::{ChunkRenderer, DebugRendererStats, DrawBackend};
use settings::EngineSettings;
use voxels::{
    area::{AreaError, AreaUpdate, ChunkArea},
    block::block_type::BlockType,
    chunk::chunk_generation::FractalNoise,
    picking::{ray_intersection_with_block_in_window, RayHitResult},
};

pub mod camera_state;
pub mod geometry;
pub mod rendering;
pub mod settings;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// Generic over the draw backend so the same frame logic drives the GPU and
/// the in-memory recorder.
pub struct EngineState<B: DrawBackend> {
    settings: EngineSettings,
    area: ChunkArea,
    terrain: FractalNoise,
    camera_state: CameraState,
    renderer: ChunkRenderer<B>,
    stats: DebugRendererStats,
    transparent_edit: bool,
    frames: u64,
}

impl<B: DrawBackend> EngineState<B> {
    /// Creates the engine and generates the world around `viewer`.
    ///
    /// # Arguments
    /// * `settings` - Runtime configuration
    /// * `backend` - Where draws are submitted
    /// * `viewer` - Initial camera position
    ///
    /// # Errors
    /// [`AreaError::InvalidRadius`] when the configured radius is unusable.
    pub fn new(settings: EngineSettings, backend: B, viewer: Point3<f32>) -> Result<Self, AreaError> {
        let terrain = FractalNoise::new(settings.noise_seed, settings.noise_octaves);
        let mut area = ChunkArea::create(settings.area_radius)?;
        area.initialize_chunk_area(&terrain, viewer);

        let camera_state = CameraState::new(
            &settings.camera,
            settings.viewport_width,
            settings.viewport_height,
            viewer,
        );

        Ok(Self {
            settings,
            area,
            terrain,
            camera_state,
            renderer: ChunkRenderer::new(backend),
            stats: DebugRendererStats::default(),
            transparent_edit: false,
            frames: 0,
        })
    }

    /// Runs one frame: camera update, area update, then rendering.
    ///
    /// # Returns
    /// What the area did this frame
    pub fn frame(&mut self, dt: Duration, atlas: &B::Atlas) -> AreaUpdate {
        let moved = self.camera_state.update(dt);

        let update = self
            .area
            .update_chunk_area(&self.terrain, self.camera_state.position());

        let update_transparent =
            needs_transparent_update(self.frames == 0, moved, self.transparent_edit, &update);
        self.transparent_edit = false;

        self.stats.reset();
        let mut pass = self.renderer.begin(&self.camera_state, atlas);
        pass.render_chunk_area(
            &self.area,
            &mut self.stats,
            &self.settings.debug,
            update_transparent,
        );
        pass.end();

        self.frames += 1;
        update
    }

    /// The block under the camera's crosshair, if any is in reach.
    pub fn target_block(&self) -> Option<RayHitResult> {
        ray_intersection_with_block_in_window(
            &self.area,
            self.camera_state.position(),
            self.camera_state.forward(),
            self.settings.max_pick_distance,
            self.settings.pick_window_radius,
        )
    }

    /// Clears the targeted block.
    ///
    /// # Returns
    /// `true` if the removed block was transparent
    pub fn remove_targeted_block(&mut self) -> bool {
        let Some(hit) = self.target_block() else {
            return false;
        };
        let removed = self.area.get_block_at(hit.chunk_index, hit.block_index);
        if !self
            .area
            .place_block_at_position(hit.chunk_index, hit.block_index, BlockType::NONE)
        {
            return false;
        }
        debug!("Removed {} at {:?}", removed.name(), hit.point);
        let transparent = removed.is_transparent();
        self.transparent_edit |= transparent;
        transparent
    }

    /// Places `block_type` against the targeted face.
    ///
    /// # Returns
    /// `true` if a transparent block was placed
    pub fn place_targeted_block(&mut self, block_type: BlockType) -> bool {
        let Some(hit) = self.target_block() else {
            return false;
        };
        let (chunk, block) = hit.placement_target();
        if !self.area.place_block_at_position(chunk, block, block_type) {
            return false;
        }
        let transparent = block_type.is_transparent();
        self.transparent_edit |= transparent;
        transparent
    }

    /// The resident chunks.
    pub fn area(&self) -> &ChunkArea {
        &self.area
    }

    /// The camera.
    pub fn camera_state(&self) -> &CameraState {
        &self.camera_state
    }

    /// The camera, for queuing movement.
    pub fn camera_state_mut(&mut self) -> &mut CameraState {
        &mut self.camera_state
    }

    /// The renderer and its backend.
    pub fn renderer(&self) -> &ChunkRenderer<B> {
        &self.renderer
    }

    /// Counters of the last frame.
    pub fn stats(&self) -> &DebugRendererStats {
        &self.stats
    }

    /// Active settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Mutable settings; debug switches apply from the next frame.
    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        &mut self.settings
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Whether the transparent faces must be collected and sorted again.
///
/// Besides camera movement and transparent edits, the first frame and any
/// area update that replaced transparent geometry invalidate last frame's
/// order.
pub fn needs_transparent_update(
    first_frame: bool,
    moved: bool,
    transparent_edit: bool,
    update: &AreaUpdate,
) -> bool {
    first_frame
        || moved
        || transparent_edit
        || matches!(
            update,
            AreaUpdate::Recentered { .. } | AreaUpdate::Remeshed { transparent: true, .. }
        )
}
