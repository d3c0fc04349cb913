use std::{f32::consts::PI, fs, path::Path};

use thiserror::Error;

use crate::geometry::{
    FloatType, HitRecord, ObjectBox, ObjectPoint, ObjectVector, Ray, Transform, Triangle,
    WorldBox,
};

use super::{Object, SceneError, StackCache};

/// Indexed triangle mesh, intersected by testing every triangle.
#[derive(Clone, Debug)]
pub struct Mesh {
    transform: Transform,
    vertices: Vec<ObjectPoint>,
    triangles: Vec<Triangle<usize>>,
}

impl Mesh {
    pub fn new(
        transform: Transform,
        vertices: Vec<ObjectPoint>,
        triangles: Vec<Triangle<usize>>,
    ) -> Result<Mesh, SceneError> {
        if let Some(index) = vertices
            .iter()
            .position(|v| v.iter().any(|x| !x.is_finite()))
        {
            return Err(SceneError::NonFiniteVertex { index });
        }

        for (triangle_index, triangle) in triangles.iter().enumerate() {
            if let Some(&vertex) = triangle.iter().find(|&&i| i >= vertices.len()) {
                return Err(SceneError::VertexIndexOutOfRange {
                    triangle: triangle_index,
                    vertex,
                    vertex_count: vertices.len(),
                });
            }
        }

        Ok(Mesh {
            transform,
            vertices,
            triangles,
        })
    }

    /// Loads triangles from a Wavefront OBJ file. Other primitives are skipped.
    pub fn with_obj(p: impl AsRef<Path>, transform: Transform) -> Result<Mesh, ObjOpenError> {
        let content = fs::read_to_string(p)?;
        let parsed = wavefront_obj::obj::parse(content)?;

        let (vertices, triangles) = Self::load_obj(parsed);
        log::debug!(
            "Loaded {} vertices, {} triangles",
            vertices.len(),
            triangles.len()
        );

        Ok(Self::new(transform, vertices, triangles)?)
    }

    fn load_obj(obj: wavefront_obj::obj::ObjSet) -> (Vec<ObjectPoint>, Vec<Triangle<usize>>) {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        let mut skipped = 0usize;

        for o in obj.objects.into_iter() {
            // Face indices are local to each object
            let first_vertex = vertices.len();
            vertices.extend(
                o.vertices
                    .iter()
                    .map(|v| ObjectPoint::new(v.x as f32, v.y as f32, v.z as f32)),
            );

            for geometry in o.geometry {
                for shape in geometry.shapes {
                    let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                        skipped += 1;
                        continue;
                    };
                    triangles.push(Triangle::new(
                        first_vertex + a.0,
                        first_vertex + b.0,
                        first_vertex + c.0,
                    ));
                }
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} non-triangle primitives");
        }

        (vertices, triangles)
    }

    /// Triangulated sphere of radius 0.5 centered at the origin, with `rings` latitude bands
    /// and `segments` longitude slices. Poles are shared vertices.
    ///
    /// # Panics
    ///
    /// Panics if `rings < 2` or `segments < 3`.
    pub fn uv_sphere(transform: Transform, rings: usize, segments: usize) -> Mesh {
        assert!(rings >= 2);
        assert!(segments >= 3);

        let mut vertices = vec![ObjectPoint::new(0.0, 0.0, 0.5)];
        for ring in 1..rings {
            let theta = PI * ring as FloatType / rings as FloatType;
            for segment in 0..segments {
                let phi = 2.0 * PI * segment as FloatType / segments as FloatType;
                vertices.push(ObjectPoint::new(
                    0.5 * theta.sin() * phi.cos(),
                    0.5 * theta.sin() * phi.sin(),
                    0.5 * theta.cos(),
                ));
            }
        }
        vertices.push(ObjectPoint::new(0.0, 0.0, -0.5));
        let south_pole = vertices.len() - 1;

        let ring_vertex = |ring: usize, segment: usize| 1 + (ring - 1) * segments + segment % segments;

        let mut triangles = Vec::new();
        for segment in 0..segments {
            triangles.push(Triangle::new(
                0,
                ring_vertex(1, segment),
                ring_vertex(1, segment + 1),
            ));
            for ring in 1..rings - 1 {
                let a = ring_vertex(ring, segment);
                let b = ring_vertex(ring + 1, segment);
                let c = ring_vertex(ring + 1, segment + 1);
                let d = ring_vertex(ring, segment + 1);
                triangles.push(Triangle::new(a, b, c));
                triangles.push(Triangle::new(a, c, d));
            }
            triangles.push(Triangle::new(
                ring_vertex(rings - 1, segment),
                south_pole,
                ring_vertex(rings - 1, segment + 1),
            ));
        }

        Mesh {
            transform,
            vertices,
            triangles,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn vertices(&self) -> &[ObjectPoint] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Iterates over the triangles with vertex positions resolved.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle<ObjectPoint>> + '_ {
        self.triangles
            .iter()
            .map(|t| t.map(|i| self.vertices[*i]))
    }
}

impl Object for Mesh {
    fn intersect(&self, ray: &Ray, _stack: &mut StackCache) -> Option<HitRecord> {
        let object_ray = self.transform.ray_to_object(ray);

        let mut nearest = NearestTriangleHit::default();
        for triangle in self.triangles() {
            nearest.update(&triangle, &object_ray);
        }

        nearest.into_hit_record(&self.transform, ray, &object_ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        let bounds = ObjectBox::from_points(&self.vertices)
            .unwrap_or_else(|| ObjectBox::new(ObjectPoint::origin(), ObjectPoint::origin()));
        self.transform.box_to_world(&bounds)
    }
}

/// Running nearest triangle hit, in object space.
/// Shared by the brute force mesh scan and by octree leaves.
#[derive(Clone, Debug, Default)]
pub(crate) struct NearestTriangleHit {
    best: Option<TriangleHit>,
}

#[derive(Clone, Debug)]
struct TriangleHit {
    t: FloatType,
    point: ObjectPoint,
    /// Geometric normal, not normalized
    normal: ObjectVector,
}

impl NearestTriangleHit {
    /// Tests the triangle and keeps it if it is strictly closer than the best hit so far.
    pub fn update(&mut self, triangle: &Triangle<ObjectPoint>, object_ray: &Ray) {
        let Some((t, uv)) = triangle.intersect(object_ray) else {
            return;
        };
        if self.best.as_ref().is_some_and(|best| t >= best.t) {
            return;
        }
        self.best = Some(TriangleHit {
            t,
            point: uv.interpolate_triangle(triangle),
            normal: triangle.normal(),
        });
    }

    /// Moves the best hit to world space.
    /// The normal is flipped to face the ray origin, `outside` tells if it had to be.
    pub fn into_hit_record(
        self,
        transform: &Transform,
        ray: &Ray,
        object_ray: &Ray,
    ) -> Option<HitRecord> {
        let best = self.best?;

        let outside = best.normal.dot(&object_ray.direction) < 0.0;
        let normal = if outside { best.normal } else { -best.normal };
        let point = transform.point_to_world(&best.point);

        Some(HitRecord {
            t: (point - ray.origin).norm(),
            point,
            normal: transform.normal_to_world(&normal),
            outside,
        })
    }
}

#[derive(Debug, Error)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(#[from] SceneError),
}
