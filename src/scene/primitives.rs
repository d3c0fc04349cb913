use crate::geometry::{
    FloatType, HitRecord, ObjectBox, Ray, Transform, WorldBox, intersect_unit_cube,
};

use super::{Object, StackCache};

/// Object space radius of every sphere, scale is applied through the transform.
const SPHERE_RADIUS: FloatType = 0.5;

/// Box primitive, the centered unit cube in object space.
#[derive(Clone, Debug, PartialEq)]
pub struct Cuboid {
    pub transform: Transform,
}

impl Cuboid {
    pub fn new(transform: Transform) -> Cuboid {
        Cuboid { transform }
    }

    pub fn intersect_ray(&self, ray: &Ray) -> Option<HitRecord> {
        let object_ray = self.transform.ray_to_object(ray);
        let hit = intersect_unit_cube(&object_ray)?;

        let point = self
            .transform
            .point_to_world(&object_ray.point_short_of(hit.t));

        Some(HitRecord {
            // Object space t doesn't survive non-uniform scaling, measure in world space
            t: (point - ray.origin).norm(),
            point,
            normal: self.transform.normal_to_world(&hit.normal),
            outside: hit.outside,
        })
    }
}

impl Object for Cuboid {
    fn intersect(&self, ray: &Ray, _stack: &mut StackCache) -> Option<HitRecord> {
        self.intersect_ray(ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        self.transform.box_to_world(&ObjectBox::centered_unit())
    }
}

/// Sphere primitive with radius 0.5 centered at the object space origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub transform: Transform,
}

impl Sphere {
    pub fn new(transform: Transform) -> Sphere {
        Sphere { transform }
    }

    pub fn intersect_ray(&self, ray: &Ray) -> Option<HitRecord> {
        let object_ray = self.transform.ray_to_object(ray);
        let origin = object_ray.origin.coords;

        let b = origin.dot(&object_ray.direction);
        let discriminant = b * b - (origin.norm_squared() - SPHERE_RADIUS * SPHERE_RADIUS);
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b + sqrt_disc;
        let t2 = -b - sqrt_disc;
        let (t, outside) = if t1 < 0.0 && t2 < 0.0 {
            return None;
        } else if t1 > 0.0 && t2 > 0.0 {
            (t1.min(t2), true)
        } else {
            (t1.max(t2), false)
        };

        let object_point = object_ray.point_short_of(t);
        let point = self.transform.point_to_world(&object_point);
        let normal = self.transform.normal_to_world(&object_point.coords);

        Some(HitRecord {
            t: (point - ray.origin).norm(),
            point,
            normal: if outside { normal } else { -normal },
            outside,
        })
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray, _stack: &mut StackCache) -> Option<HitRecord> {
        self.intersect_ray(ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        self.transform.box_to_world(&ObjectBox::centered_unit())
    }
}
