mod mesh;
pub mod octree;
pub mod primitives;

use thiserror::Error;

use crate::geometry::{HitRecord, Ray, TransformError, WorldBox};

pub use mesh::{Mesh, ObjOpenError};
pub use octree::{NodeIdx, Octree, OctreeNode, OctreeSettings, OctreeStatistics, StackCache, TriangleIdx};
pub use primitives::{Cuboid, Sphere};

pub(crate) use mesh::NearestTriangleHit;

/// Something a ray can hit.
pub trait Object {
    /// Finds the nearest intersection of the ray with this object.
    /// `stack` is scratch space for traversing acceleration structures, it is left empty.
    fn intersect(&self, ray: &Ray, stack: &mut StackCache) -> Option<HitRecord>;
    fn get_bounding_box(&self) -> WorldBox;
}

/// Any primitive supported by the engine.
#[derive(Clone, Debug)]
pub enum Geometry {
    Cuboid(Cuboid),
    Sphere(Sphere),
    Mesh(Mesh),
    Octree(Octree),
}

impl Object for Geometry {
    fn intersect(&self, ray: &Ray, stack: &mut StackCache) -> Option<HitRecord> {
        match self {
            Geometry::Cuboid(cuboid) => cuboid.intersect(ray, stack),
            Geometry::Sphere(sphere) => sphere.intersect(ray, stack),
            Geometry::Mesh(mesh) => mesh.intersect(ray, stack),
            Geometry::Octree(octree) => octree.intersect(ray, stack),
        }
    }

    fn get_bounding_box(&self) -> WorldBox {
        match self {
            Geometry::Cuboid(cuboid) => cuboid.get_bounding_box(),
            Geometry::Sphere(sphere) => sphere.get_bounding_box(),
            Geometry::Mesh(mesh) => mesh.get_bounding_box(),
            Geometry::Octree(octree) => octree.get_bounding_box(),
        }
    }
}

impl From<Cuboid> for Geometry {
    fn from(value: Cuboid) -> Self {
        Geometry::Cuboid(value)
    }
}

impl From<Sphere> for Geometry {
    fn from(value: Sphere) -> Self {
        Geometry::Sphere(value)
    }
}

impl From<Mesh> for Geometry {
    fn from(value: Mesh) -> Self {
        Geometry::Mesh(value)
    }
}

impl From<Octree> for Geometry {
    fn from(value: Octree) -> Self {
        Geometry::Octree(value)
    }
}

/// Errors in scene data, detected when the primitives are constructed.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("Triangle {triangle} references vertex {vertex}, but there are only {vertex_count} vertices")]
    VertexIndexOutOfRange {
        triangle: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("Mesh has no triangles")]
    EmptyMesh,

    #[error("Octree has no nodes")]
    EmptyOctree,

    #[error("Octree has {nodes} nodes, but {boxes} bounding boxes")]
    OctreeLengthMismatch { nodes: usize, boxes: usize },

    #[error("Invalid octree node {node}: {reason}")]
    InvalidOctree { node: usize, reason: String },
}

/// Collection of objects queried together.
#[derive(Clone, Debug)]
pub struct Scene<O: Object = Geometry> {
    pub objects: Vec<O>,
}

impl<O: Object> Scene<O> {
    pub fn new(objects: Vec<O>) -> Self {
        Scene { objects }
    }

    /// Finds the nearest hit over all objects.
    /// Returns index of the hit object and the hit record, the first object wins ties.
    pub fn intersect(&self, ray: &Ray, stack: &mut StackCache) -> Option<(usize, HitRecord)> {
        let mut best: Option<(usize, HitRecord)> = None;
        for (i, object) in self.objects.iter().enumerate() {
            let Some(hit) = object.intersect(ray, stack) else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, best_hit)| hit.t < best_hit.t) {
                best = Some((i, hit));
            }
        }
        best
    }

    /// Union of all object bounding boxes, None for an empty scene.
    pub fn bounding_box(&self) -> Option<WorldBox> {
        self.objects
            .iter()
            .map(|object| object.get_bounding_box())
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Transform, WorldPoint, WorldVector};

    use assert2::{assert, let_assert};

    fn at_z(z: f32) -> Transform {
        Transform::from_translation_rotation_scale(
            &WorldVector::new(0.0, 0.0, z),
            &WorldVector::zeros(),
            &WorldVector::repeat(1.0),
        )
        .unwrap()
    }

    fn scene() -> Scene {
        let mesh = Mesh::uv_sphere(at_z(9.0), 6, 8);
        let octree = Octree::build(&Mesh::uv_sphere(at_z(12.0), 6, 8), &OctreeSettings::default())
            .unwrap();
        Scene::new(vec![
            Sphere::new(at_z(6.0)).into(),
            Cuboid::new(at_z(3.0)).into(),
            mesh.into(),
            octree.into(),
        ])
    }

    #[test]
    fn nearest_object_wins() {
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 0.0), WorldVector::new(0.0, 0.0, 1.0));
        let_assert!(Some((index, hit)) = scene().intersect(&ray, &mut StackCache::default()));
        assert!(index == 1);
        assert!((hit.t - 2.5).abs() < 1e-3);
    }

    #[test]
    fn octree_is_reached_from_behind() {
        let ray = Ray::new(WorldPoint::new(0.1, 0.05, 20.0), WorldVector::new(0.0, 0.0, -1.0));
        let_assert!(Some((index, hit)) = scene().intersect(&ray, &mut StackCache::default()));
        assert!(index == 3);
        assert!(hit.outside);
    }

    #[test]
    fn first_object_wins_ties() {
        let scene = Scene::new(vec![Sphere::new(at_z(5.0)), Sphere::new(at_z(5.0))]);
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 0.0), WorldVector::new(0.0, 0.0, 1.0));
        let_assert!(Some((0, _)) = scene.intersect(&ray, &mut StackCache::default()));
    }

    #[test]
    fn miss_everything() {
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 0.0), WorldVector::new(0.0, 0.0, -1.0));
        assert!(scene().intersect(&ray, &mut StackCache::default()) == None);
    }

    #[test]
    fn bounding_box_covers_all_objects() {
        let_assert!(Some(b) = scene().bounding_box());
        // Octree boxes are slightly padded
        assert!((b.min - WorldPoint::new(-0.5, -0.5, 2.5)).norm() < 1e-2);
        assert!((b.max - WorldPoint::new(0.5, 0.5, 12.5)).norm() < 1e-2);
    }

    #[test]
    fn empty_scene() {
        let scene: Scene = Scene::new(vec![]);
        assert!(scene.bounding_box() == None);
    }
}
