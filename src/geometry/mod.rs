mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod transform;
mod triangle;

use nalgebra::{Point3, Unit, Vector3};

pub use aabb::AABB;
pub use ray_box_intersection::{UnitCubeHit, intersect_unit_cube};
pub use transform::{Matrix, Transform, TransformError, apply};
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f32;

pub const EPSILON: FloatType = 1e-6;

/// Box and sphere hit points are evaluated this far before the actual surface,
/// so that rays continuing from the hit point don't immediately hit the same surface again.
pub const SURFACE_OFFSET: FloatType = 1e-4;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

// Object space coordinates are local to a single primitive. They share the
// representation with world space, the aliases only document which space a value lives in.
pub type ObjectPoint = WorldPoint;
pub type ObjectVector = WorldVector;
pub type ObjectBox = AABB<ObjectPoint>;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: Unit<WorldVector>,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }

    /// Point on the ray that falls `SURFACE_OFFSET` short of the given distance.
    pub fn point_short_of(&self, distance: FloatType) -> WorldPoint {
        self.point_at(distance - SURFACE_OFFSET)
    }
}

/// Nearest intersection of a ray with an object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    /// World space distance between the ray origin and `point`.
    pub t: FloatType,
    pub point: WorldPoint,
    pub normal: Unit<WorldVector>,
    /// True if the ray started outside of the hit primitive.
    pub outside: bool,
}
