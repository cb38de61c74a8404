//! # Voxel Engine Core
//!
//! This module contains the voxel data side of the engine: block types, chunk
//! grids and their terrain, and the sliding chunk area around the viewer.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block types, faces and the texture atlas table
//! * **Chunk**: Fixed-size 3D block grids and heightfield terrain generation
//! * **Slot Map**: The bijective coordinate to slot map behind re-centering
//! * **Area**: The resident chunks, re-centering and incremental re-meshing
//! * **Picking**: Ray casts against blocks for editing
//!
//! ## Data Flow
//!
//! 1. The area generates terrain for every slot around the viewer
//! 2. Each non-empty chunk is meshed once
//! 3. When the viewer changes chunks, the area permutes its slot map,
//!    regenerates the leading plane and re-meshes it over several frames
//! 4. Block edits write a cell and re-mesh the chunks that can see it
//!
//! ## Thread Safety
//!
//! All mutation happens on the frame thread between rendering passes; nothing
//! in this module is shared across threads.

pub mod area;
pub mod block;
pub mod chunk;
pub mod picking;
pub mod slot_map;
