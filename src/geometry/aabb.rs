use std::ops::Sub;

use crate::geometry::{FloatType, WorldPoint, WorldVector};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl AABB<WorldPoint> {
    /// The cube [-0.5, 0.5]^3, object space shape of boxes and bounds of spheres.
    pub fn centered_unit() -> Self {
        AABB::new(
            WorldPoint::new(-0.5, -0.5, -0.5),
            WorldPoint::new(0.5, 0.5, 0.5),
        )
    }

    /// Smallest box containing all the points, None if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(AABB::new(*first, *first), |acc, p| AABB {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    pub fn union(&self, other: &Self) -> Self {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grows the box by `margin` in every direction.
    pub fn padded(&self, margin: FloatType) -> Self {
        let margin = WorldVector::repeat(margin);
        AABB {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn corners(&self) -> [WorldPoint; 8] {
        std::array::from_fn(|i| {
            WorldPoint::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Check if the point is inside or on the boundary of the box.
    pub fn contains(&self, p: &WorldPoint) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};

    #[test]
    fn from_points_empty() {
        assert!(AABB::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn from_points_bounds_everything() {
        let points = [
            WorldPoint::new(1.0, -2.0, 3.0),
            WorldPoint::new(-1.0, 5.0, 0.0),
            WorldPoint::new(0.0, 0.0, 7.0),
        ];
        let_assert!(Some(b) = AABB::from_points(&points));
        assert!(b.min == WorldPoint::new(-1.0, -2.0, 0.0));
        assert!(b.max == WorldPoint::new(1.0, 5.0, 7.0));
        assert!(points.iter().all(|p| b.contains(p)));
    }

    #[test]
    fn corners_are_distinct_and_on_box() {
        let b = AABB::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 2.0, 3.0));
        let corners = b.corners();
        for (i, a) in corners.iter().enumerate() {
            assert!(b.contains(a));
            for c in &corners[i + 1..] {
                assert!(a != c);
            }
        }
    }

    #[test]
    fn padded_flat_box_gets_volume() {
        let b = AABB::new(WorldPoint::new(0.0, 0.0, 1.0), WorldPoint::new(1.0, 1.0, 1.0));
        let padded = b.padded(0.25);
        assert!(padded.size().min() == 0.5);
        assert!(padded.contains_box(&b));
        assert!(padded.center() == b.center());
    }

    #[test]
    fn union_contains_both() {
        let a = AABB::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0));
        let b = AABB::new(WorldPoint::new(-1.0, 0.5, 0.5), WorldPoint::new(0.5, 3.0, 0.7));
        let u = a.union(&b);
        assert!(u.contains_box(&a));
        assert!(u.contains_box(&b));
        assert!(u == AABB::new(WorldPoint::new(-1.0, 0.0, 0.0), WorldPoint::new(1.0, 3.0, 1.0)));
    }
}
