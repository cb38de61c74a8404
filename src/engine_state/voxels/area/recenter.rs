//! Pure re-centering arithmetic.
//!
//! When the viewer crosses into a neighboring chunk, every spatial coordinate
//! of the area shifts by the (clamped) displacement and wraps around the grid.
//! The coordinates that end up on the leading plane hold stale terrain and
//! must be regenerated; the plane right behind it keeps its terrain but sees
//! a new neighbor and must be re-meshed.

use cgmath::{Point3, Vector3};

use super::super::chunk::CHUNK_SIZE;

/// A chunk scheduled for generation or re-meshing after a re-center.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkUpdateData {
    /// Storage slot backing the chunk
    pub slot: usize,
    /// Spatial coordinate of the chunk after the re-center
    pub coordinate: Point3<usize>,
}

/// How a spatial coordinate is affected by a re-center.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Outside both the leading and the surrounding planes.
    Untouched,
    /// On the leading plane: needs fresh terrain and a mesh.
    New,
    /// One plane behind the leading one: needs a mesh only.
    Surrounding,
}

/// Wraps `value` into `[min, max)`.
#[inline]
pub fn wrap(value: i32, min: i32, max: i32) -> i32 {
    let range = max - min;
    (range + (value - min) % range) % range + min
}

/// Chunk coordinate containing the world position `position`.
pub fn viewer_chunk(position: Point3<f32>) -> Point3<i32> {
    let size = CHUNK_SIZE as f32;
    Point3::new(
        (position.x / size).floor() as i32,
        (position.y / size).floor() as i32,
        (position.z / size).floor() as i32,
    )
}

/// World position of the minimum corner of chunk coordinate `chunk`.
pub fn chunk_origin(chunk: Point3<i32>) -> Point3<f32> {
    Point3::new(
        (chunk.x * CHUNK_SIZE) as f32,
        (chunk.y * CHUNK_SIZE) as f32,
        (chunk.z * CHUNK_SIZE) as f32,
    )
}

/// Displacement between two center chunks, clamped to one chunk per axis.
///
/// # Returns
/// The clamped displacement and whether clamping discarded any movement.
pub fn clamped_displacement(from: Point3<i32>, to: Point3<i32>) -> (Vector3<i32>, bool) {
    let raw = to - from;
    let clamped = Vector3::new(raw.x.clamp(-1, 1), raw.y.clamp(-1, 1), raw.z.clamp(-1, 1));
    (clamped, clamped != raw)
}

/// The leading and surrounding plane indices for every axis of a move.
///
/// An axis without movement has neither plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AffectedPlanes {
    leading: [Option<usize>; 3],
    surrounding: [Option<usize>; 3],
}

impl AffectedPlanes {
    /// Computes the planes for a clamped `displacement` over a grid of side
    /// `dimension`.
    pub fn new(displacement: Vector3<i32>, dimension: usize) -> Self {
        let mut leading = [None; 3];
        let mut surrounding = [None; 3];

        for axis in 0..3 {
            match displacement[axis] {
                d if d > 0 => {
                    leading[axis] = Some(dimension - 1);
                    surrounding[axis] = dimension.checked_sub(2);
                }
                d if d < 0 => {
                    leading[axis] = Some(0);
                    surrounding[axis] = Some(1).filter(|&plane| plane < dimension);
                }
                _ => {}
            }
        }

        Self {
            leading,
            surrounding,
        }
    }

    /// Classifies a post-move spatial coordinate.
    ///
    /// A coordinate on a leading plane is `New` even if it also lies on a
    /// surrounding plane of another axis, so diagonal moves always regenerate
    /// every chunk whose terrain went stale.
    pub fn classify(&self, coordinate: Point3<usize>) -> Classification {
        let on = |planes: &[Option<usize>; 3]| {
            (0..3).any(|axis| planes[axis] == Some(coordinate[axis]))
        };

        if on(&self.leading) {
            Classification::New
        } else if on(&self.surrounding) {
            Classification::Surrounding
        } else {
            Classification::Untouched
        }
    }
}

/// Appends `data` unless an entry with the same coordinate is already listed.
pub fn push_unique(list: &mut Vec<ChunkUpdateData>, data: ChunkUpdateData) {
    if !list.iter().any(|entry| entry.coordinate == data.coordinate) {
        list.push(data);
    }
}
