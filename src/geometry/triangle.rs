use std::ops::Index;

use crate::geometry::{FloatType, ObjectPoint, ObjectVector};

#[derive(Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.0.iter()
    }

    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> Triangle<Point2> {
        Triangle([f(&self[0]), f(&self[1]), f(&self[2])])
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Triangle<ObjectPoint> {
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [ObjectVector; 2] {
        [self[1] - self[0], self[2] - self[0]]
    }

    /// Returns a normal vector of the triangle, not normalized.
    pub fn normal(&self) -> ObjectVector {
        let [e1, e2] = self.edges();
        e1.cross(&e2)
    }

    pub fn centroid(&self) -> ObjectPoint {
        ObjectPoint::from((self[0].coords + self[1].coords + self[2].coords) / 3.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates {
    pub u: FloatType,
    pub v: FloatType,
}

impl BarycentricCoordinates {
    /// Point on the triangle at these coordinates, `u` weighs self[1] and `v` weighs self[2].
    pub fn interpolate_triangle(&self, triangle: &Triangle<ObjectPoint>) -> ObjectPoint {
        let [e1, e2] = triangle.edges();
        triangle[0] + e1 * self.u + e2 * self.v
    }
}
