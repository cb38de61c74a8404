//! # View Frustum
//!
//! Six clip planes extracted from the combined view-projection matrix, used
//! to skip chunks the camera cannot see.
//!
//! A point is inside a plane when `n·p + d >= 0`. The box test is
//! conservative: a box is only rejected when all eight of its corners lie
//! outside the same plane, so a partially visible chunk is never dropped.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

use crate::engine_state::geometry::{normalize_or_unchanged, Aabb};

/// A plane `n·p + d = 0` with `n` pointing into the frustum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal, pointing to the inside half-space
    pub normal: Vector3<f32>,
    /// Signed offset from the origin
    pub distance: f32,
}

impl Plane {
    /// Builds a plane from raw coefficients, normalized by the length of the
    /// normal. A zero-length normal is kept as-is.
    pub fn from_coefficients(coefficients: Vector4<f32>) -> Self {
        let normal = coefficients.truncate();
        let length = normal.magnitude();
        if length == 0.0 {
            return Self {
                normal,
                distance: coefficients.w,
            };
        }
        Self {
            normal: normalize_or_unchanged(normal),
            distance: coefficients.w / length,
        }
    }

    /// Signed distance of `point` from the plane.
    #[inline]
    pub fn evaluate(&self, point: Point3<f32>) -> f32 {
        self.normal.x * point.x + self.normal.y * point.y + self.normal.z * point.z + self.distance
    }
}

/// The six planes of a view frustum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum of a combined `projection * view` matrix.
    ///
    /// cgmath matrices are column-major, so `row(i)` gathers the i-th
    /// component of every column.
    pub fn from_view_projection(view_projection: &Matrix4<f32>) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0), // left
                Plane::from_coefficients(r3 - r0), // right
                Plane::from_coefficients(r3 + r1), // bottom
                Plane::from_coefficients(r3 - r1), // top
                Plane::from_coefficients(r3 + r2), // near
                Plane::from_coefficients(r3 - r2), // far
            ],
        }
    }

    /// Whether any part of `aabb` may be visible.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let corners = aabb.corners();
        !self
            .planes
            .iter()
            .any(|plane| corners.iter().all(|&corner| plane.evaluate(corner) < 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{perspective, Deg};

    fn looking_down_negative_z() -> Frustum {
        let projection = perspective(Deg(90.0), 1.0, 0.1, 100.0);
        let view = Matrix4::look_to_rh(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::unit_y(),
        );
        Frustum::from_view_projection(&(projection * view))
    }

    #[test]
    fn planes_are_normalized() {
        for plane in looking_down_negative_z().planes {
            assert!((plane.normal.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_normal_is_left_unchanged() {
        let plane = Plane::from_coefficients(Vector4::new(0.0, 0.0, 0.0, 2.0));
        assert_eq!(plane.normal, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(plane.distance, 2.0);
    }

    #[test]
    fn boxes_in_front_are_kept() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::unit_cell(Point3::new(-0.5, -0.5, -10.0));
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn boxes_behind_or_beyond_far_are_culled() {
        let frustum = looking_down_negative_z();
        assert!(!frustum.intersects_aabb(&Aabb::unit_cell(Point3::new(-0.5, -0.5, 5.0))));
        assert!(!frustum.intersects_aabb(&Aabb::unit_cell(Point3::new(-0.5, -0.5, -200.0))));
    }

    #[test]
    fn straddling_boxes_are_kept() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::new(Point3::new(-5.0, -5.0, -105.0), Point3::new(5.0, 5.0, -95.0));
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn transpose_rows_match_columns() {
        let m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        );
        assert_eq!(m.row(0), m.transpose().x);
    }
}
