//! # Picking Module
//!
//! Ray casts against the blocks of the chunk area, used to find the block the
//! viewer is looking at and where a new block would go.
//!
//! ## Search Window
//!
//! Only the chunks within `window_radius` chunks of the area's center are
//! searched. Interaction range is far smaller than the area, so scanning the
//! whole area would only waste time. Each candidate chunk is rejected with a
//! single box test before its blocks are visited.

use cgmath::{Point3, Vector3};

use super::{
    area::ChunkArea,
    block::block_type::BlockType,
    chunk::CHUNK_SIZE,
};
use crate::engine_state::geometry::{inverse_direction, Aabb, RayInterval};

/// Default half-size, in chunks, of the window searched by a pick.
pub const PICK_WINDOW_RADIUS: usize = 2;

/// Where a ray met a block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHitResult {
    /// Spatial coordinate of the chunk holding the block
    pub chunk_index: Point3<i32>,
    /// Local coordinate of the block inside its chunk
    pub block_index: Point3<i32>,
    /// Ray parameter at which the block is entered
    pub t: f32,
    /// World position where the ray enters the block
    pub point: Point3<f32>,
    /// Axis-aligned normal of the face that was hit
    pub normal: Vector3<i32>,
}

impl RayHitResult {
    /// The cell in front of the hit face, rolled over into the neighboring
    /// chunk when it leaves the hit chunk.
    pub fn placement_target(&self) -> (Point3<i32>, Point3<i32>) {
        correct_block_index(self.chunk_index, self.block_index + self.normal)
    }
}

/// Casts a ray through the default pick window.
///
/// See [`ray_intersection_with_block_in_window`].
pub fn ray_intersection_with_block(
    area: &ChunkArea,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RayHitResult> {
    ray_intersection_with_block_in_window(area, origin, direction, max_distance, PICK_WINDOW_RADIUS)
}

/// Finds the closest block hit by a ray.
///
/// # Arguments
/// * `area` - The chunk area to search
/// * `origin` - Ray origin in world space
/// * `direction` - Ray direction, scales the returned `t`
/// * `max_distance` - Hits entering farther than this are ignored
/// * `window_radius` - Half-size of the searched chunk window
///
/// # Returns
/// The closest hit across the whole window, or `None` if nothing was hit.
pub fn ray_intersection_with_block_in_window(
    area: &ChunkArea,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    window_radius: usize,
) -> Option<RayHitResult> {
    let inv_direction = inverse_direction(direction);
    let half = area.dimension() / 2;
    let window = half.saturating_sub(window_radius)..(half + window_radius).min(area.dimension());
    let chunk_extent = CHUNK_SIZE as f32 + 1.0;

    let mut closest: Option<(RayInterval, Point3<i32>, Point3<i32>)> = None;

    for cz in window.clone() {
        for cy in window.clone() {
            for cx in window.clone() {
                let chunk_index = Point3::new(cx as i32, cy as i32, cz as i32);
                let Some(slot) = area.slot_of(chunk_index) else {
                    continue;
                };

                // Block data is authoritative; freshly regenerated chunks
                // are pickable before their meshes catch up.
                if area.is_only_air(slot) {
                    continue;
                }

                let chunk_position = area.chunk_world_position(chunk_index);
                let chunk_box = Aabb::new(
                    chunk_position,
                    chunk_position + Vector3::new(chunk_extent, chunk_extent, chunk_extent),
                );
                if chunk_box.intersect_ray(origin, inv_direction, max_distance).is_none() {
                    continue;
                }

                let blocks = area.chunk(slot);
                for z in 0..CHUNK_SIZE {
                    for y in 0..CHUNK_SIZE {
                        for x in 0..CHUNK_SIZE {
                            if blocks.at(x as usize, y as usize, z as usize) == BlockType::NONE {
                                continue;
                            }

                            let cell = Aabb::unit_cell(
                                chunk_position + Vector3::new(x as f32, y as f32, z as f32),
                            );
                            let Some(hit) = cell.intersect_ray(origin, inv_direction, max_distance)
                            else {
                                continue;
                            };

                            if closest.map_or(true, |(best, _, _)| hit.t_max < best.t_max) {
                                closest = Some((hit, chunk_index, Point3::new(x, y, z)));
                            }
                        }
                    }
                }
            }
        }
    }

    closest.map(|(interval, chunk_index, block_index)| {
        let t = interval.t_min;
        let point = origin + direction * t;
        RayHitResult {
            chunk_index,
            block_index,
            t,
            point,
            normal: get_hit_normal(area, chunk_index, block_index, point),
        }
    })
}

/// World-space unit box of a block.
pub fn get_block_aabb(area: &ChunkArea, chunk_index: Point3<i32>, block_index: Point3<i32>) -> Aabb {
    let chunk_position = area.chunk_world_position(chunk_index);
    Aabb::unit_cell(
        chunk_position
            + Vector3::new(
                block_index.x as f32,
                block_index.y as f32,
                block_index.z as f32,
            ),
    )
}

/// Normal of the block face containing `point`.
///
/// The offset from the block center is scaled so the dominant axis lands just
/// past ±1 and the others stay inside (-1, 1); truncation then keeps only the
/// dominant axis. The 1.001 factor pushes points lying exactly on the face
/// over the threshold.
pub fn get_hit_normal(
    area: &ChunkArea,
    chunk_index: Point3<i32>,
    block_index: Point3<i32>,
    point: Point3<f32>,
) -> Vector3<i32> {
    let block_box = get_block_aabb(area, chunk_index, block_index);
    let from_center = point - block_box.center();
    let scaled = from_center * (1.001 / 0.5);
    Vector3::new(scaled.x as i32, scaled.y as i32, scaled.z as i32)
}

/// Moves a local block index that stepped one cell outside its chunk into
/// the adjacent chunk.
///
/// # Returns
/// The corrected `(chunk_index, block_index)` pair.
pub fn correct_block_index(
    mut chunk_index: Point3<i32>,
    mut block_index: Point3<i32>,
) -> (Point3<i32>, Point3<i32>) {
    for axis in 0..3 {
        if block_index[axis] < 0 {
            block_index[axis] = CHUNK_SIZE - 1;
            chunk_index[axis] -= 1;
        } else if block_index[axis] > CHUNK_SIZE - 1 {
            block_index[axis] = 0;
            chunk_index[axis] += 1;
        }
    }
    (chunk_index, block_index)
}
