//! # Chunk Area Module
//!
//! This module provides `ChunkArea`, the sliding cube of chunks kept resident
//! around the viewer.
//!
//! ## Architecture
//!
//! Block grids, meshes, bounds and air flags live in per-slot arrays that are
//! allocated once. A [`ChunkSlotMap`] resolves a spatial chunk coordinate to
//! the slot that currently backs it. When the viewer crosses a chunk
//! boundary the map is permuted (toroidal wraparound) instead of moving any
//! chunk data:
//!
//! 1. Every coordinate is shifted by the clamped displacement into a scratch
//!    map, which is then swapped in.
//! 2. Slots that wrapped onto the leading plane get fresh terrain at once.
//! 3. Re-meshing of the leading plane and of the plane behind it is spread
//!    over the following frames by the [`UpdateScheduler`].
//!
//! ## Coordinates
//!
//! Spatial coordinates range over `[0, dimension)` on each axis, with the
//! viewer's chunk at `dimension / 2`. The chunk at coordinate `c` has its
//! minimum corner at `area_position + (c - dimension / 2) * CHUNK_SIZE`.
//!
//! ## Known Limitation
//!
//! A re-center moves the area by at most one chunk per axis. A viewer that
//! moves several chunks in one frame is followed one step per re-center, and
//! the excess is logged as a warning.

use std::fmt;

use cgmath::{EuclideanSpace, Point3, Vector3};
use log::{debug, info, trace, warn};

use super::{
    block::block_type::BlockType,
    chunk::{
        chunk_generation::{generate_chunk, HeightSource},
        BlockGrid, CHUNK_SIZE,
    },
    picking::correct_block_index,
    slot_map::ChunkSlotMap,
};
use crate::engine_state::{
    geometry::Aabb,
    rendering::meshing::{mesh_chunk, BlockLookup, ChunkMesh},
};

pub mod recenter;
pub mod scheduler;

use recenter::{
    chunk_origin, clamped_displacement, push_unique, viewer_chunk, wrap, AffectedPlanes,
    ChunkUpdateData, Classification,
};
use scheduler::{batch_range, FrameWork, SchedulerState, UpdateList, UpdateScheduler};

/// Errors raised while building a chunk area.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaError {
    /// The radius is not a positive, finite number.
    InvalidRadius(f32),
}

impl fmt::Display for AreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaError::InvalidRadius(radius) => {
                write!(f, "area radius must be positive and finite, got {radius}")
            }
        }
    }
}

impl std::error::Error for AreaError {}

/// What a call to [`ChunkArea::update_chunk_area`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AreaUpdate {
    /// Re-meshed one batch of a pending update list.
    Remeshed {
        /// The list the batch came from
        list: UpdateList,
        /// Chunks actually meshed (air-only chunks are skipped)
        meshed: usize,
        /// Whether a meshed chunk had transparent faces before or after
        transparent: bool,
    },
    /// The viewer changed chunks and the area moved.
    Recentered {
        /// Applied displacement in chunks, at most one per axis
        displacement: Vector3<i32>,
        /// Chunks regenerated on the leading plane
        new_chunks: usize,
        /// Chunks behind the leading plane queued for re-meshing
        surrounding_chunks: usize,
    },
    /// The viewer is still inside the center chunk.
    Unchanged,
}

/// The resident chunks around the viewer.
pub struct ChunkArea {
    /// Block data, in slot order
    chunks: Vec<BlockGrid>,
    /// Spatial coordinate to slot
    chunk_indices: ChunkSlotMap,
    /// Scratch map used while re-centering
    temp_indices: ChunkSlotMap,
    is_only_air: Vec<bool>,
    chunk_bounds: Vec<Aabb>,
    opaque_meshes: Vec<ChunkMesh>,
    transparent_meshes: Vec<ChunkMesh>,
    /// Chunk coordinate of the center chunk
    center_chunk: Point3<i32>,
    area_radius: f32,
    scheduler: UpdateScheduler,
    new_chunk_updates: Vec<ChunkUpdateData>,
    surrounding_chunk_updates: Vec<ChunkUpdateData>,
}

/// Number of chunks per axis needed to cover `radius` on both sides.
pub fn chunks_per_axis(radius: f32) -> usize {
    2 * (radius / CHUNK_SIZE as f32).ceil() as usize
}

#[inline]
fn signed(coordinate: Point3<usize>) -> Point3<i32> {
    Point3::new(coordinate.x as i32, coordinate.y as i32, coordinate.z as i32)
}

impl ChunkArea {
    /// Allocates an area large enough to cover `radius` world units around
    /// the viewer.
    ///
    /// Mesh storage starts empty and grows to what chunks actually emit; it
    /// is never released while the area lives.
    ///
    /// # Errors
    /// [`AreaError::InvalidRadius`] when `radius` is not positive and finite.
    pub fn create(radius: f32) -> Result<Self, AreaError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AreaError::InvalidRadius(radius));
        }

        let dimension = chunks_per_axis(radius);
        let slot_count = dimension * dimension * dimension;
        let plane_capacity = dimension * dimension * 3;

        info!(
            "Creating chunk area: radius {radius}, {dimension} chunks per axis, {slot_count} slots, {} KiB of block data",
            slot_count * std::mem::size_of::<BlockType>() * (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize / 1024
        );

        Ok(Self {
            chunks: (0..slot_count).map(|_| BlockGrid::new()).collect(),
            chunk_indices: ChunkSlotMap::identity(dimension),
            temp_indices: ChunkSlotMap::identity(dimension),
            is_only_air: vec![true; slot_count],
            chunk_bounds: vec![Aabb::degenerate(Point3::new(0.0, 0.0, 0.0)); slot_count],
            opaque_meshes: vec![ChunkMesh::default(); slot_count],
            transparent_meshes: vec![ChunkMesh::default(); slot_count],
            center_chunk: Point3::new(0, 0, 0),
            area_radius: radius,
            scheduler: UpdateScheduler::default(),
            new_chunk_updates: Vec::with_capacity(plane_capacity),
            surrounding_chunk_updates: Vec::with_capacity(plane_capacity),
        })
    }

    /// Chunks per axis.
    pub fn dimension(&self) -> usize {
        self.chunk_indices.dimension()
    }

    /// Total number of slots.
    pub fn slot_count(&self) -> usize {
        self.chunks.len()
    }

    /// The requested visibility radius in world units.
    pub fn area_radius(&self) -> f32 {
        self.area_radius
    }

    /// Chunk coordinate of the center chunk.
    pub fn center_chunk(&self) -> Point3<i32> {
        self.center_chunk
    }

    /// World position of the center chunk's minimum corner.
    pub fn area_position(&self) -> Point3<f32> {
        chunk_origin(self.center_chunk)
    }

    /// The live coordinate to slot map.
    pub fn chunk_indices(&self) -> &ChunkSlotMap {
        &self.chunk_indices
    }

    /// Slot backing the spatial coordinate `chunk`, if it lies in the area.
    pub fn slot_of(&self, chunk: Point3<i32>) -> Option<usize> {
        self.spatial(chunk)
            .map(|c| self.chunk_indices.at(c.x, c.y, c.z))
    }

    fn spatial(&self, chunk: Point3<i32>) -> Option<Point3<usize>> {
        let dimension = self.dimension() as i32;
        let inside = |c: i32| (0..dimension).contains(&c);
        (inside(chunk.x) && inside(chunk.y) && inside(chunk.z))
            .then(|| Point3::new(chunk.x as usize, chunk.y as usize, chunk.z as usize))
    }

    /// World position of the minimum corner of the chunk at spatial
    /// coordinate `chunk`. Coordinates outside the area are extrapolated.
    pub fn chunk_world_position(&self, chunk: Point3<i32>) -> Point3<f32> {
        let half = (self.dimension() / 2) as i32;
        chunk_origin(self.center_chunk + (chunk - Point3::new(half, half, half)))
    }

    /// Block data of a slot.
    pub fn chunk(&self, slot: usize) -> &BlockGrid {
        &self.chunks[slot]
    }

    /// Whether a slot holds only `NONE`.
    pub fn is_only_air(&self, slot: usize) -> bool {
        self.is_only_air[slot]
    }

    /// Bounds of the geometry last meshed for a slot.
    pub fn chunk_bounds(&self, slot: usize) -> Aabb {
        self.chunk_bounds[slot]
    }

    /// Opaque faces of a slot.
    pub fn opaque_mesh(&self, slot: usize) -> &ChunkMesh {
        &self.opaque_meshes[slot]
    }

    /// Transparent faces of a slot.
    pub fn transparent_mesh(&self, slot: usize) -> &ChunkMesh {
        &self.transparent_meshes[slot]
    }

    /// Whether a slot has any faces to draw.
    pub fn has_faces(&self, slot: usize) -> bool {
        !self.opaque_meshes[slot].is_empty() || !self.transparent_meshes[slot].is_empty()
    }

    /// Current scheduler state.
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Chunks regenerated by the last re-center.
    pub fn new_chunk_updates(&self) -> &[ChunkUpdateData] {
        &self.new_chunk_updates
    }

    /// Chunks queued for re-meshing by the last re-center.
    pub fn surrounding_chunk_updates(&self) -> &[ChunkUpdateData] {
        &self.surrounding_chunk_updates
    }

    /// Fills a slot with the terrain of spatial coordinate `coordinate`.
    fn generate_slot<H: HeightSource + ?Sized>(
        &mut self,
        slot: usize,
        coordinate: Point3<i32>,
        source: &H,
    ) {
        let position = self.chunk_world_position(coordinate);
        self.is_only_air[slot] = generate_chunk(&mut self.chunks[slot], position.to_vec(), source);
    }

    /// Generates every chunk around `viewer` and meshes the non-empty ones.
    ///
    /// # Arguments
    /// * `source` - Terrain height oracle
    /// * `viewer` - World position of the viewer
    pub fn initialize_chunk_area<H: HeightSource + ?Sized>(
        &mut self,
        source: &H,
        viewer: Point3<f32>,
    ) {
        self.center_chunk = viewer_chunk(viewer);
        self.chunk_indices = ChunkSlotMap::identity(self.dimension());
        self.scheduler.reset();
        self.new_chunk_updates.clear();
        self.surrounding_chunk_updates.clear();

        let coordinates: Vec<_> = self.chunk_indices.coordinates().collect();
        for &(x, y, z) in &coordinates {
            let slot = self.chunk_indices.at(x, y, z);
            self.generate_slot(slot, signed(Point3::new(x, y, z)), source);
        }

        let mut meshed = 0;
        for &(x, y, z) in &coordinates {
            let slot = self.chunk_indices.at(x, y, z);
            self.opaque_meshes[slot].clear();
            self.transparent_meshes[slot].clear();
            if self.is_only_air[slot] {
                continue;
            }
            self.update_chunk_mesh(signed(Point3::new(x, y, z)));
            meshed += 1;
        }

        info!(
            "Initialized chunk area around chunk {:?}: {} of {} chunks meshed",
            self.center_chunk,
            meshed,
            self.slot_count()
        );
    }

    /// Advances the area by one frame.
    ///
    /// Does at most one of: mesh a batch of surrounding chunks, mesh a batch
    /// of new chunks, or re-center on the viewer if it left the center chunk.
    pub fn update_chunk_area<H: HeightSource + ?Sized>(
        &mut self,
        source: &H,
        viewer: Point3<f32>,
    ) -> AreaUpdate {
        match self.scheduler.advance() {
            FrameWork::Remesh { list, batch } => {
                let (meshed, transparent) = self.remesh_batch(list, batch);
                AreaUpdate::Remeshed {
                    list,
                    meshed,
                    transparent,
                }
            }
            FrameWork::DetectCrossing => self.recenter(source, viewer),
        }
    }

    fn remesh_batch(&mut self, list: UpdateList, batch: usize) -> (usize, bool) {
        let entries = match list {
            UpdateList::Surrounding => &self.surrounding_chunk_updates,
            UpdateList::New => &self.new_chunk_updates,
        };
        let range = batch_range(batch, entries.len());
        let pending: Vec<ChunkUpdateData> = entries[range].iter().rev().copied().collect();

        let mut meshed = 0;
        let mut transparent = false;
        for data in pending {
            if self.is_only_air[data.slot] {
                continue;
            }
            transparent |= !self.transparent_meshes[data.slot].is_empty();
            self.update_chunk_mesh(signed(data.coordinate));
            transparent |= !self.transparent_meshes[data.slot].is_empty();
            meshed += 1;
        }

        trace!("Re-meshed {meshed} chunks from the {list:?} list (batch {batch})");
        (meshed, transparent)
    }

    fn recenter<H: HeightSource + ?Sized>(&mut self, source: &H, viewer: Point3<f32>) -> AreaUpdate {
        let target = viewer_chunk(viewer);
        if target == self.center_chunk {
            return AreaUpdate::Unchanged;
        }

        let previous = self.center_chunk;
        let (displacement, clamped) = clamped_displacement(previous, target);
        if clamped {
            warn!(
                "Viewer moved from chunk {previous:?} to {target:?} in one frame; re-centering by {displacement:?} only"
            );
        }
        self.center_chunk += displacement;

        self.new_chunk_updates.clear();
        self.surrounding_chunk_updates.clear();

        let dimension = self.dimension();
        let planes = AffectedPlanes::new(displacement, dimension);
        let d = dimension as i32;

        for (x, y, z) in self.chunk_indices.coordinates() {
            let xi = wrap(x as i32 - displacement.x, 0, d) as usize;
            let yi = wrap(y as i32 - displacement.y, 0, d) as usize;
            let zi = wrap(z as i32 - displacement.z, 0, d) as usize;

            let slot = self.chunk_indices.at(x, y, z);
            self.temp_indices.set(xi, yi, zi, slot);

            let data = ChunkUpdateData {
                slot,
                coordinate: Point3::new(xi, yi, zi),
            };
            match planes.classify(data.coordinate) {
                Classification::New => push_unique(&mut self.new_chunk_updates, data),
                Classification::Surrounding => {
                    push_unique(&mut self.surrounding_chunk_updates, data)
                }
                Classification::Untouched => {}
            }
        }

        self.chunk_indices.swap_with(&mut self.temp_indices);

        for i in 0..self.new_chunk_updates.len() {
            let data = self.new_chunk_updates[i];
            self.generate_slot(data.slot, signed(data.coordinate), source);
            // The old geometry belongs to the opposite side of the area.
            self.opaque_meshes[data.slot].clear();
            self.transparent_meshes[data.slot].clear();
        }

        let new_chunks = self.new_chunk_updates.len();
        let surrounding_chunks = self.surrounding_chunk_updates.len();
        self.scheduler.arm(new_chunks, surrounding_chunks);

        info!(
            "Re-centered chunk area from {previous:?} to {:?}: {new_chunks} new, {surrounding_chunks} surrounding",
            self.center_chunk
        );

        AreaUpdate::Recentered {
            displacement,
            new_chunks,
            surrounding_chunks,
        }
    }

    /// Rebuilds the meshes, bounds and air flag of the chunk at spatial
    /// coordinate `chunk`. Coordinates outside the area are ignored.
    pub fn update_chunk_mesh(&mut self, chunk: Point3<i32>) {
        let Some(slot) = self.slot_of(chunk) else {
            return;
        };

        let mut opaque = std::mem::take(&mut self.opaque_meshes[slot]);
        let mut transparent = std::mem::take(&mut self.transparent_meshes[slot]);

        let position = self.chunk_world_position(chunk);
        let summary = mesh_chunk(
            &*self,
            &self.chunks[slot],
            chunk,
            position,
            &mut opaque,
            &mut transparent,
        );

        self.opaque_meshes[slot] = opaque;
        self.transparent_meshes[slot] = transparent;
        self.chunk_bounds[slot] = summary.bounds;
        self.is_only_air[slot] = summary.only_air;
    }

    /// Block at a local coordinate that may step one cell into an adjacent
    /// chunk. Anything outside the area reads as `NONE`.
    pub fn get_block_at(&self, chunk: Point3<i32>, block: Point3<i32>) -> BlockType {
        let (chunk, block) = correct_block_index(chunk, block);
        match self.slot_of(chunk) {
            Some(slot) => self.chunks[slot].at(block.x as usize, block.y as usize, block.z as usize),
            None => BlockType::NONE,
        }
    }

    /// Writes one block and re-meshes everything that can see it.
    ///
    /// The owning chunk is always re-meshed; a block on a chunk face also
    /// re-meshes the neighbor across that face when it exists.
    ///
    /// # Returns
    /// `false` if the coordinate lies outside the area, in which case nothing
    /// changes.
    pub fn place_block_at_position(
        &mut self,
        chunk: Point3<i32>,
        block: Point3<i32>,
        block_type: BlockType,
    ) -> bool {
        let inside = |c: i32| (0..CHUNK_SIZE).contains(&c);
        if !(inside(block.x) && inside(block.y) && inside(block.z)) {
            return false;
        }
        let Some(slot) = self.slot_of(chunk) else {
            return false;
        };

        self.chunks[slot].set(block.x as usize, block.y as usize, block.z as usize, block_type);
        self.update_chunk_mesh(chunk);

        for axis in 0..3 {
            let mut step = Vector3::new(0, 0, 0);
            if block[axis] == 0 {
                step[axis] = -1;
            } else if block[axis] == CHUNK_SIZE - 1 {
                step[axis] = 1;
            } else {
                continue;
            }
            self.update_chunk_mesh(chunk + step);
        }

        debug!(
            "Placed {} at block {:?} of chunk {:?}",
            block_type.name(),
            block,
            chunk
        );
        true
    }
}

impl BlockLookup for ChunkArea {
    fn get_block_at(&self, chunk: Point3<i32>, block: Point3<i32>) -> BlockType {
        ChunkArea::get_block_at(self, chunk, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(level: f32) -> impl Fn(f32, f32) -> f32 {
        move |_x, _z| level
    }

    #[test]
    fn invalid_radius_is_rejected() {
        assert_eq!(
            ChunkArea::create(0.0).err(),
            Some(AreaError::InvalidRadius(0.0))
        );
        assert!(ChunkArea::create(f32::NAN).is_err());
        assert!(ChunkArea::create(-5.0).is_err());
    }

    #[test]
    fn dimension_covers_radius_on_both_sides() {
        assert_eq!(chunks_per_axis(32.0), 2);
        assert_eq!(chunks_per_axis(33.0), 4);
        assert_eq!(chunks_per_axis(128.0), 8);
        let area = ChunkArea::create(64.0).unwrap();
        assert_eq!(area.dimension(), 4);
        assert_eq!(area.slot_count(), 64);
    }

    #[test]
    fn chunk_positions_are_relative_to_center() {
        let mut area = ChunkArea::create(64.0).unwrap();
        area.initialize_chunk_area(&flat(-2.0), Point3::new(40.0, 5.0, -1.0));
        assert_eq!(area.center_chunk(), Point3::new(1, 0, -1));
        assert_eq!(area.area_position(), Point3::new(32.0, 0.0, -32.0));
        assert_eq!(area.chunk_world_position(Point3::new(2, 2, 2)), Point3::new(32.0, 0.0, -32.0));
        assert_eq!(area.chunk_world_position(Point3::new(0, 1, 3)), Point3::new(-32.0, -32.0, 0.0));
    }

    #[test]
    fn initialization_generates_and_meshes() {
        let mut area = ChunkArea::create(64.0).unwrap();
        // Surface at y = 8, inside the chunks at spatial y = 2.
        area.initialize_chunk_area(&flat(0.5), Point3::new(0.0, 0.0, 0.0));

        let ground = area.slot_of(Point3::new(2, 2, 2)).unwrap();
        assert!(!area.is_only_air(ground));
        assert!(area.opaque_mesh(ground).face_count() > 0);

        let sky = area.slot_of(Point3::new(2, 3, 2)).unwrap();
        assert!(area.is_only_air(sky));
        assert!(!area.has_faces(sky));
        assert!(area.scheduler_state().is_idle());
    }

    #[test]
    fn neighbor_lookup_crosses_chunks_and_stops_at_the_edge() {
        let mut area = ChunkArea::create(64.0).unwrap();
        area.initialize_chunk_area(&flat(-1.0), Point3::new(0.0, 0.0, 0.0));
        assert!(area.place_block_at_position(Point3::new(1, 2, 2), Point3::new(31, 0, 0), BlockType::SAND));

        assert_eq!(
            area.get_block_at(Point3::new(2, 2, 2), Point3::new(-1, 0, 0)),
            BlockType::SAND
        );
        assert_eq!(
            area.get_block_at(Point3::new(0, 2, 2), Point3::new(-1, 0, 0)),
            BlockType::NONE
        );
        assert_eq!(
            area.get_block_at(Point3::new(3, 2, 2), Point3::new(32, 0, 0)),
            BlockType::NONE
        );
    }

    #[test]
    fn placing_outside_the_area_is_refused() {
        let mut area = ChunkArea::create(64.0).unwrap();
        area.initialize_chunk_area(&flat(-1.0), Point3::new(0.0, 0.0, 0.0));
        assert!(!area.place_block_at_position(Point3::new(4, 0, 0), Point3::new(0, 0, 0), BlockType::STONE));
        assert!(!area.place_block_at_position(Point3::new(0, 0, 0), Point3::new(32, 0, 0), BlockType::STONE));
    }

    #[test]
    fn edge_edits_remesh_the_neighbor() {
        let mut area = ChunkArea::create(64.0).unwrap();
        // Stone fills every chunk at spatial y <= 1.
        area.initialize_chunk_area(&flat(1.0), Point3::new(0.0, 0.0, 0.0));
        let below = area.slot_of(Point3::new(2, 1, 2)).unwrap();
        let top_faces = area.opaque_mesh(below).face_count();

        // A hole in the top layer exposes the five cells around it.
        assert!(area.place_block_at_position(Point3::new(2, 1, 2), Point3::new(5, 31, 5), BlockType::NONE));
        assert!(area.opaque_mesh(below).face_count() > top_faces);
        assert!(!area.is_only_air(below));
    }

    #[test]
    fn clearing_the_last_block_sets_the_air_flag() {
        let mut area = ChunkArea::create(64.0).unwrap();
        area.initialize_chunk_area(&flat(-10.0), Point3::new(0.0, 0.0, 0.0));
        let chunk = Point3::new(2, 2, 2);
        let slot = area.slot_of(chunk).unwrap();
        assert!(area.is_only_air(slot));

        area.place_block_at_position(chunk, Point3::new(3, 3, 3), BlockType::GLASS);
        assert!(!area.is_only_air(slot));
        assert_eq!(area.transparent_mesh(slot).face_count(), 6);

        area.place_block_at_position(chunk, Point3::new(3, 3, 3), BlockType::NONE);
        assert!(area.is_only_air(slot));
        assert!(!area.has_faces(slot));
    }
}
