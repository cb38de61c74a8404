//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - The per-frame view frustum used for chunk culling
//! - Whether the view changed this frame, which decides if transparent faces
//!   must be re-sorted
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Accumulates movement and applies it per frame
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders
//! - `Frustum`: Six clip planes rebuilt whenever the camera changes

use camera::{Camera, CameraController, CameraUniform, Projection};
use cgmath::{Deg, Point3, Vector3};
use web_time::Duration;

use super::settings::CameraSettings;

pub mod camera;
pub mod frustum;

use frustum::Frustum;

/// Manages the complete camera system.
///
/// # Fields
/// - `camera`: The current camera state (position, orientation)
/// - `projection`: Perspective settings
/// - `camera_uniform`: GPU-optimized camera data for shaders
/// - `camera_controller`: Pending movement
/// - `frustum`: Clip planes of the current view
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Perspective settings
    pub projection: Projection,
    /// Pending movement
    pub camera_controller: CameraController,
    camera_uniform: CameraUniform,
    frustum: Frustum,
    moved: bool,
}

impl CameraState {
    /// Creates a camera at `position` looking along +X.
    ///
    /// # Arguments
    /// * `settings` - Field of view, clip distances and speed
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `position` - Initial position in world space
    pub fn new(settings: &CameraSettings, width: u32, height: u32, position: Point3<f32>) -> Self {
        let camera = Camera::new(position, Deg(0.0), Deg(settings.pitch_degrees));
        let projection = Projection::new(
            width,
            height,
            Deg(settings.fov_degrees),
            settings.z_near,
            settings.z_far,
        );
        let camera_controller = CameraController::new(settings.speed);

        let mut state = CameraState {
            camera,
            projection,
            camera_controller,
            camera_uniform: CameraUniform::new(),
            frustum: Frustum::from_view_projection(&cgmath::SquareMatrix::identity()),
            moved: true,
        };
        state.refresh();
        state
    }

    fn refresh(&mut self) {
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, &self.projection);
        self.frustum = Frustum::from_view_projection(
            &(self.projection.perspective_matrix() * self.camera.calc_matrix()),
        );
    }

    /// Applies pending movement and rebuilds the uniform and frustum.
    ///
    /// This method should be called once per frame before rendering.
    ///
    /// # Returns
    /// `true` if the camera moved or turned this frame
    pub fn update(&mut self, dt: Duration) -> bool {
        self.moved = self
            .camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);
        if self.moved {
            self.refresh();
        }
        self.moved
    }

    /// Updates the projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.refresh();
        self.moved = true;
    }

    /// Whether the last update changed the view.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Camera position in world space.
    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }

    /// Camera forward direction.
    pub fn forward(&self) -> Vector3<f32> {
        self.camera.forward()
    }

    /// Shader data for the current view.
    pub fn uniform(&self) -> &CameraUniform {
        &self.camera_uniform
    }

    /// Clip planes of the current view.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}
