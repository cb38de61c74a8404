//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format emitted by the mesher and consumed by
//! the chunk shader, and provides the layout description used by the pipeline.

use cgmath::{Point3, Vector3};

/// A vertex in the voxel rendering pipeline.
///
/// Produced in groups of four, one group per visible block face. The four
/// vertices of a face are always contiguous so a shared index buffer can turn
/// them into two triangles.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Occlusion: f32 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Outward unit normal of the face
    pub normal: [f32; 3],
    /// Texture atlas coordinates (normalized 0.0-1.0)
    pub tex_coord: [f32; 2],
    /// Ambient occlusion factor, 1.0 for fully lit
    pub occlusion: f32,
}

impl VoxelVertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World space position
    /// * `normal` - Face normal
    /// * `tex_coord` - Atlas UV coordinate
    /// * `occlusion` - Ambient occlusion factor in `[0, 1]`
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        tex_coord: [f32; 2],
        occlusion: f32,
    ) -> Self {
        VoxelVertex {
            position: position.into(),
            normal: normal.into(),
            tex_coord,
            occlusion,
        }
    }

    /// World space position as a point.
    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: tex_coord (vec2<f32>)
    /// - `location = 3`: occlusion (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VoxelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}
