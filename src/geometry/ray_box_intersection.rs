use crate::geometry::{FloatType, ObjectVector, Ray};

/// Crossing of a ray with the surface of the centered unit cube.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnitCubeHit {
    /// Distance along the ray
    pub t: FloatType,
    /// Axis aligned normal of the crossed face.
    /// Points against the ray direction when entering and along it when leaving.
    pub normal: ObjectVector,
    /// True if the ray starts outside of the cube
    pub outside: bool,
}

/// Intersects the ray with the cube [-0.5, 0.5]^3 using the slab method.
///
/// Returns the entry crossing if the ray starts outside of the cube and the exit crossing
/// if it starts inside, None if the cube is missed or lies behind the ray.
/// Zero direction components give infinite slab distances, parallel rays outside of a slab
/// end up with an empty interval.
pub fn intersect_unit_cube(ray: &Ray) -> Option<UnitCubeHit> {
    let mut t_min = FloatType::NEG_INFINITY;
    let mut t_max = FloatType::INFINITY;
    let mut t_min_normal = ObjectVector::zeros();
    let mut t_max_normal = ObjectVector::zeros();

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];

        let t1 = (-0.5 - origin) / direction;
        let t2 = (0.5 - origin) / direction;
        let near = t1.min(t2);
        let far = t1.max(t2);

        let mut normal = ObjectVector::zeros();
        normal[axis] = if t2 < t1 { 1.0 } else { -1.0 };

        if near > 0.0 && near > t_min {
            t_min = near;
            t_min_normal = normal;
        }
        if far < t_max {
            t_max = far;
            t_max_normal = normal;
        }
    }

    if t_max < t_min || t_max <= 0.0 {
        None
    } else if t_min <= 0.0 {
        Some(UnitCubeHit {
            t: t_max,
            normal: t_max_normal,
            outside: false,
        })
    } else {
        Some(UnitCubeHit {
            t: t_min,
            normal: t_min_normal,
            outside: true,
        })
    }
}
