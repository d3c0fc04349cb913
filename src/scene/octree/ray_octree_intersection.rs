use assert2::debug_assert;

use super::{NodeIdx, Octree, OctreeNode};
use crate::{
    geometry::{HitRecord, Ray, WorldBox},
    scene::{NearestTriangleHit, Object},
};

/// Reusable work list for octree traversal.
/// Keep one per thread to avoid allocating on every ray.
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
pub struct StackCache {
    stack: Vec<NodeIdx>,
}

impl Object for Octree {
    fn intersect(&self, ray: &Ray, stack: &mut StackCache) -> Option<HitRecord> {
        debug_assert!(stack.stack.is_empty());
        stack.stack.push(self.root);

        let object_ray = self.transform.ray_to_object(ray);
        let mut nearest = NearestTriangleHit::default();

        while let Some(node_index) = stack.stack.pop() {
            if self.bounding_boxes[node_index].intersect_ray(ray).is_none() {
                // Nothing in the subtree can be hit
                continue;
            }

            match &self.nodes[node_index] {
                OctreeNode::Inner { children, .. } => stack.stack.extend(children.iter().copied()),
                OctreeNode::Leaf { triangles } => {
                    for triangle in self.triangles[triangles.clone()].iter() {
                        nearest.update(triangle, &object_ray);
                    }
                }
            }
        }

        nearest.into_hit_record(&self.transform, ray, &object_ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        self.bounding_boxes[self.root].get_bounding_box()
    }
}
