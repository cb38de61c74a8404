//! # wgpu Draw Backend
//!
//! Implements [`DrawBackend`] on top of wgpu. Each flushed batch is staged in
//! its own vertex buffer together with its tint, so the whole frame can be
//! replayed inside a single render pass once the renderer is done.
//!
//! # Architecture
//! - Bind group 0: camera uniform
//! - Bind group 1: texture atlas and sampler
//! - Bind group 2: per-batch debug uniform (tint, lighting view)
//! - Four pipelines: filled or wireframe, each with and without depth writes
//!
//! The backend owns an offscreen color target, so it works without a window.
//! A windowed application can call [`WgpuChunkBackend::encode`] from its own
//! render pass instead.

use std::{fmt, path::Path};

use image::{ImageError, RgbaImage};
use log::{debug, info};
use wgpu::util::DeviceExt;

use super::{
    backend::{DrawBackend, Topology},
    texture::{self, Texture},
    vertex::VoxelVertex,
};
use crate::engine_state::camera_state::camera::CameraUniform;

const SHADER_SOURCE: &str = include_str!("shaders/chunk.wgsl");

/// Clear color of the offscreen target.
const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.45,
    g: 0.65,
    b: 0.9,
    a: 1.0,
};

/// Errors raised while setting up the GPU backend.
#[derive(Debug)]
pub enum BackendError {
    /// No adapter matched the request.
    NoAdapter(wgpu::RequestAdapterError),
    /// The adapter refused to create a device.
    Device(wgpu::RequestDeviceError),
    /// The atlas image could not be decoded.
    Atlas(ImageError),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NoAdapter(err) => write!(f, "no suitable GPU adapter: {}", err),
            BackendError::Device(err) => write!(f, "failed to create GPU device: {}", err),
            BackendError::Atlas(err) => write!(f, "failed to load texture atlas: {}", err),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::NoAdapter(err) => Some(err),
            BackendError::Device(err) => Some(err),
            BackendError::Atlas(err) => Some(err),
        }
    }
}

impl From<ImageError> for BackendError {
    fn from(err: ImageError) -> Self {
        BackendError::Atlas(err)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DebugUniform {
    tint: [f32; 4],
    flags: [f32; 4],
}

/// The block atlas bound while drawing.
pub struct AtlasTexture {
    /// The uploaded image
    pub texture: Texture,
    bind_group: wgpu::BindGroup,
}

struct BatchSlot {
    vertex_buffer: wgpu::Buffer,
    capacity: u64,
    debug_buffer: wgpu::Buffer,
    debug_bind_group: wgpu::BindGroup,
}

struct RecordedBatch {
    slot: usize,
    topology: Topology,
    index_count: u32,
    depth_write: bool,
}

struct ChunkPipelines {
    filled_opaque: wgpu::RenderPipeline,
    filled_transparent: wgpu::RenderPipeline,
    lines_opaque: wgpu::RenderPipeline,
    lines_transparent: wgpu::RenderPipeline,
}

impl ChunkPipelines {
    fn select(&self, topology: Topology, depth_write: bool) -> &wgpu::RenderPipeline {
        match (topology, depth_write) {
            (Topology::Triangles, true) => &self.filled_opaque,
            (Topology::Triangles, false) => &self.filled_transparent,
            (Topology::Lines, true) => &self.lines_opaque,
            (Topology::Lines, false) => &self.lines_transparent,
        }
    }
}

/// A [`DrawBackend`] drawing into an offscreen wgpu target.
pub struct WgpuChunkBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_target: Texture,
    depth_texture: Texture,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    atlas_layout: wgpu::BindGroupLayout,
    debug_layout: wgpu::BindGroupLayout,
    pipelines: ChunkPipelines,
    filled_index_buffer: Option<wgpu::Buffer>,
    wireframe_index_buffer: Option<wgpu::Buffer>,
    slots: Vec<BatchSlot>,
    batches: Vec<RecordedBatch>,
    staging: Vec<VoxelVertex>,
    atlas_bind_group: Option<wgpu::BindGroup>,
    depth_write: bool,
    tint: [f32; 4],
    lighting: bool,
}

impl WgpuChunkBackend {
    /// Creates a backend on the default adapter without any window.
    ///
    /// # Errors
    /// [`BackendError::NoAdapter`] when no GPU is available and
    /// [`BackendError::Device`] when the device cannot be created.
    pub fn new_headless(width: u32, height: u32) -> Result<Self, BackendError> {
        let (device, queue) = pollster::block_on(request_device())?;
        Ok(Self::new(device, queue, width, height))
    }

    /// Creates a backend on an existing device.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The queue draws are submitted to
    /// * `width` - Width of the offscreen target in pixels
    /// * `height` - Height of the offscreen target in pixels
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, width: u32, height: u32) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
            label: Some("camera_bind_group_layout"),
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("atlas_bind_group_layout"),
        });

        let debug_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
            label: Some("debug_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &atlas_layout, &debug_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline = |label: &str, topology: Topology, depth_write: bool| {
            create_pipeline(
                &device,
                &pipeline_layout,
                &shader,
                label,
                topology,
                depth_write,
            )
        };
        let pipelines = ChunkPipelines {
            filled_opaque: pipeline("Chunk Filled Opaque", Topology::Triangles, true),
            filled_transparent: pipeline("Chunk Filled Transparent", Topology::Triangles, false),
            lines_opaque: pipeline("Chunk Lines Opaque", Topology::Lines, true),
            lines_transparent: pipeline("Chunk Lines Transparent", Topology::Lines, false),
        };

        let color_target = Texture::create_render_target(&device, width, height, "color_target");
        let depth_texture = Texture::create_depth_texture(&device, width, height, "depth_texture");

        info!("Created wgpu chunk backend with a {}x{} target", width, height);

        Self {
            device,
            queue,
            color_target,
            depth_texture,
            camera_buffer,
            camera_bind_group,
            atlas_layout,
            debug_layout,
            pipelines,
            filled_index_buffer: None,
            wireframe_index_buffer: None,
            slots: Vec::new(),
            batches: Vec::new(),
            staging: Vec::new(),
            atlas_bind_group: None,
            depth_write: true,
            tint: [1.0; 4],
            lighting: false,
        }
    }

    /// Uploads `image` as the block atlas.
    pub fn create_atlas(&self, image: &RgbaImage) -> AtlasTexture {
        let texture = Texture::from_image(&self.device, &self.queue, image, "block_atlas");
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("atlas_bind_group"),
        });
        AtlasTexture {
            texture,
            bind_group,
        }
    }

    /// Loads the atlas at `path`, or generates a placeholder when `None`.
    pub fn load_atlas(&self, path: Option<&Path>) -> Result<AtlasTexture, BackendError> {
        let image = match path {
            Some(path) => texture::load_atlas(path)?,
            None => texture::generate_checker_atlas(16),
        };
        Ok(self.create_atlas(&image))
    }

    /// Recreates the render targets for a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.color_target =
            Texture::create_render_target(&self.device, width, height, "color_target");
        self.depth_texture =
            Texture::create_depth_texture(&self.device, width, height, "depth_texture");
    }

    /// The offscreen color target.
    pub fn color_target(&self) -> &Texture {
        &self.color_target
    }

    /// Replays the recorded batches into `pass`.
    pub fn encode(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(atlas), Some(filled), Some(wireframe)) = (
            self.atlas_bind_group.as_ref(),
            self.filled_index_buffer.as_ref(),
            self.wireframe_index_buffer.as_ref(),
        ) else {
            return;
        };

        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_bind_group(1, atlas, &[]);

        for batch in &self.batches {
            let slot = &self.slots[batch.slot];
            pass.set_pipeline(self.pipelines.select(batch.topology, batch.depth_write));
            pass.set_bind_group(2, &slot.debug_bind_group, &[]);
            pass.set_vertex_buffer(0, slot.vertex_buffer.slice(..));
            let indices = match batch.topology {
                Topology::Triangles => filled,
                Topology::Lines => wireframe,
            };
            pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..batch.index_count, 0, 0..1);
        }
    }

    fn ensure_slot(&mut self, index: usize, bytes: u64) {
        if index == self.slots.len() {
            let debug_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Batch Debug Buffer"),
                size: std::mem::size_of::<DebugUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let debug_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.debug_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: debug_buffer.as_entire_binding(),
                }],
                label: Some("batch_debug_bind_group"),
            });
            self.slots.push(BatchSlot {
                vertex_buffer: create_vertex_buffer(&self.device, bytes),
                capacity: bytes,
                debug_buffer,
                debug_bind_group,
            });
            debug!("Allocated batch slot {} ({} bytes)", index, bytes);
        } else if self.slots[index].capacity < bytes {
            let slot = &mut self.slots[index];
            slot.vertex_buffer = create_vertex_buffer(&self.device, bytes);
            slot.capacity = bytes;
        }
    }
}

impl DrawBackend for WgpuChunkBackend {
    type Atlas = AtlasTexture;

    fn create_index_buffers(&mut self, filled: &[u32], wireframe: &[u32]) {
        let create = |label: &str, indices: &[u32]| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        };
        let filled = create("Filled Index Buffer", filled);
        let wireframe = create("Wireframe Index Buffer", wireframe);
        self.filled_index_buffer = Some(filled);
        self.wireframe_index_buffer = Some(wireframe);
    }

    fn begin_frame(&mut self, camera: &CameraUniform, atlas: &AtlasTexture) {
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));
        self.atlas_bind_group = Some(atlas.bind_group.clone());
        self.batches.clear();
        self.staging.clear();
    }

    fn upload_vertices(&mut self, byte_offset: usize, vertices: &[VoxelVertex]) {
        let start = byte_offset / std::mem::size_of::<VoxelVertex>();
        let end = start + vertices.len();
        if self.staging.len() < end {
            self.staging.resize(end, VoxelVertex::default());
        }
        self.staging[start..end].copy_from_slice(vertices);
    }

    fn draw_indexed(&mut self, topology: Topology, index_count: u32) {
        let index = self.batches.len();
        let bytes = std::mem::size_of_val(self.staging.as_slice()) as u64;
        let uniform = DebugUniform {
            tint: self.tint,
            flags: [if self.lighting { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };

        self.ensure_slot(index, bytes);
        let slot = &self.slots[index];
        self.queue
            .write_buffer(&slot.vertex_buffer, 0, bytemuck::cast_slice(&self.staging));
        self.queue
            .write_buffer(&slot.debug_buffer, 0, bytemuck::cast_slice(&[uniform]));

        self.batches.push(RecordedBatch {
            slot: index,
            topology,
            index_count,
            depth_write: self.depth_write,
        });
        self.staging.clear();
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
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Chunk Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chunk Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.encode(&mut pass);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

async fn request_device() -> Result<(wgpu::Device, wgpu::Queue), BackendError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .map_err(BackendError::NoAdapter)?;

    info!("Using adapter {:?}", adapter.get_info().name);

    adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: Some("voxel-area device"),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(BackendError::Device)
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_vertex_buffer(device: &wgpu::Device, bytes: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Batch Vertex Buffer"),
        size: bytes.max(wgpu::COPY_BUFFER_ALIGNMENT),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    topology: Topology,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let (primitive_topology, cull_mode) = match topology {
        Topology::Triangles => (wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back)),
        Topology::Lines => (wgpu::PrimitiveTopology::LineList, None),
    };
    let blend = if depth_write {
        wgpu::BlendState::REPLACE
    } else {
        wgpu::BlendState::ALPHA_BLENDING
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[VoxelVertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: Texture::COLOR_FORMAT,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: primitive_topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}
