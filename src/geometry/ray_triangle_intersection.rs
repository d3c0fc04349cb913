use crate::geometry::{FloatType, ObjectPoint, Ray};

use super::{BarycentricCoordinates, Triangle};

impl Triangle<ObjectPoint> {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Returns distance along the ray and barycentric uv coordinates of the hit.
    ///
    /// Rays parallel to the triangle plane and degenerate (zero area) triangles never hit,
    /// neither do intersections at or behind the ray origin.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(&self, ray: &Ray) -> Option<(FloatType, BarycentricCoordinates)> {
        let [e1, e2] = self.edges();

        // Tolerances are relative to edge lengths, so that the test doesn't depend on the mesh scale.
        let tolerance = FloatType::EPSILON * e1.norm() * e2.norm();
        if e1.cross(&e2).norm() <= tolerance {
            // Zero area
            return None;
        }

        let ray_cross_e2 = ray.direction.cross(&e2);
        let det = e1.dot(&ray_cross_e2);
        if det.abs() <= tolerance {
            // Parallel to the triangle plane
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self[0];
        let u = inv_det * s.dot(&ray_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let s_cross_e1 = s.cross(&e1);
        let v = inv_det * ray.direction.dot(&s_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * e2.dot(&s_cross_e1);
        (t > 0.0).then_some((t, BarycentricCoordinates { u, v }))
    }
}
