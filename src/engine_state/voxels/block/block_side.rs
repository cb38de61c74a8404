//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the
//! per-face data the mesher needs: outward normal and neighbor offset.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants index the per-face texture table and the ambient
/// occlusion offset table, so the order must not change.
///
/// The order is: [FRONT, UP, RIGHT, LEFT, DOWN, BACK]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The top face (facing positive Y)
    UP = 1,

    /// The right face (facing positive X)
    RIGHT = 2,

    /// The left face (facing negative X)
    LEFT = 3,

    /// The bottom face (facing negative Y)
    DOWN = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::UP,
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::DOWN,
            BlockSide::BACK,
        ]
    }

    /// Offset from a cell to the neighbor this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::DOWN => Vector3::new(0, -1, 0),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// Unit outward normal of the face.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().cast::<f32>().unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }
}
