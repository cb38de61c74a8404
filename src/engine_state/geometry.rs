//! # Geometry Module
//!
//! Small geometric primitives shared by the frustum culler, the mesher and the
//! ray picker. Everything here works in world space on `cgmath` types.

use cgmath::{InnerSpace, Point3, Vector3};

/// An axis-aligned bounding box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Corner with the smallest coordinates
    pub min: Point3<f32>,
    /// Corner with the largest coordinates
    pub max: Point3<f32>,
}

/// The parametric interval along a ray that lies inside a box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayInterval {
    /// Entry parameter, never negative
    pub t_min: f32,
    /// Exit parameter
    pub t_max: f32,
}

impl Aabb {
    /// Creates a box from its two extreme corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// The unit box occupied by the voxel whose minimum corner is `position`.
    pub fn unit_cell(position: Point3<f32>) -> Self {
        Self {
            min: position,
            max: position + Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A box of zero volume located at `position`.
    pub fn degenerate(position: Point3<f32>) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Center point of the box.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// All eight corners, used by the conservative frustum test.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Slab-method ray intersection.
    ///
    /// `inv_direction` is the component-wise reciprocal of the ray direction so
    /// the reciprocal is computed once per ray instead of once per box.
    ///
    /// # Returns
    /// The clipped interval when the ray enters the box no farther than
    /// `max_distance`, `None` otherwise.
    pub fn intersect_ray(
        &self,
        origin: Point3<f32>,
        inv_direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayInterval> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let t1 = (self.min[axis] - origin[axis]) * inv_direction[axis];
            let t2 = (self.max[axis] - origin[axis]) * inv_direction[axis];

            t_min = t_min.max(t1.min(t2).max(0.0));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max >= t_min.max(0.0) && t_min <= max_distance {
            Some(RayInterval { t_min, t_max })
        } else {
            None
        }
    }
}

/// Reciprocal of every component, as consumed by [`Aabb::intersect_ray`].
pub fn inverse_direction(direction: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z)
}

/// Normalizes `v`, returning it unchanged when its length is zero.
pub fn normalize_or_unchanged(v: Vector3<f32>) -> Vector3<f32> {
    let length_squared = v.magnitude2();
    if length_squared == 0.0 {
        v
    } else {
        v / length_squared.sqrt()
    }
}
