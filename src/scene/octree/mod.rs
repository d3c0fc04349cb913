mod building;
mod printing;
mod ray_octree_intersection;

use std::ops::Range;

use arrayvec::ArrayVec;
use index_vec::IndexVec;

use crate::geometry::{ObjectBox, ObjectPoint, Transform, Triangle};

use super::{Cuboid, SceneError};

pub use building::OctreeSettings;
pub use printing::OctreeStatistics;
pub use ray_octree_intersection::StackCache;

const INNER_NODE_CHILDREN: usize = 8;

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
    IMPL_RAW_CONVERSIONS = true;
}

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
    IMPL_RAW_CONVERSIONS = true;
}

/// Triangle mesh indexed by a bounding volume hierarchy with up to 8 children per node.
///
/// Nodes are stored in an arena, each node has a bounding box stored in a parallel arena.
/// Triangles are flattened so that each node covers a contiguous range of them.
#[derive(Clone, Debug)]
pub struct Octree {
    transform: Transform,
    root: NodeIdx,
    nodes: IndexVec<NodeIdx, OctreeNode>,
    /// Node boxes, already composed with the octree transform
    bounding_boxes: IndexVec<NodeIdx, Cuboid>,
    triangles: IndexVec<TriangleIdx, Triangle<ObjectPoint>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OctreeNode {
    Inner {
        children: ArrayVec<NodeIdx, INNER_NODE_CHILDREN>,
        /// All triangles in the subtree
        triangles: Range<TriangleIdx>,
    },
    Leaf {
        triangles: Range<TriangleIdx>,
    },
}

impl OctreeNode {
    pub fn triangles(&self) -> Range<TriangleIdx> {
        match self {
            OctreeNode::Inner { triangles, .. } | OctreeNode::Leaf { triangles } => {
                triangles.clone()
            }
        }
    }

    pub fn children(&self) -> &[NodeIdx] {
        match self {
            OctreeNode::Inner { children, .. } => children,
            OctreeNode::Leaf { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, OctreeNode::Leaf { .. })
    }
}

impl Octree {
    /// Assembles an octree from prebuilt arrays.
    ///
    /// `boxes` are object space bounding boxes of the nodes, in the same order as `nodes`.
    /// Every node index must be smaller than the indices of its children, node triangle
    /// ranges must be in bounds and contain the ranges of the children, and every triangle
    /// must fit into the boxes of the nodes that cover it.
    pub fn from_parts(
        transform: Transform,
        nodes: IndexVec<NodeIdx, OctreeNode>,
        boxes: IndexVec<NodeIdx, ObjectBox>,
        triangles: IndexVec<TriangleIdx, Triangle<ObjectPoint>>,
        root: NodeIdx,
    ) -> Result<Octree, SceneError> {
        if nodes.is_empty() {
            return Err(SceneError::EmptyOctree);
        }
        if nodes.len() != boxes.len() {
            return Err(SceneError::OctreeLengthMismatch {
                nodes: nodes.len(),
                boxes: boxes.len(),
            });
        }
        if root.index() >= nodes.len() {
            return Err(invalid(root, "root index out of range"));
        }

        for (index, node) in nodes.iter_enumerated() {
            let range = node.triangles();
            if range.start > range.end {
                return Err(invalid(index, "inverted triangle range"));
            }
            if range.end.index() > triangles.len() {
                return Err(invalid(index, "triangle range out of bounds"));
            }

            let node_box = &boxes[index];
            if !triangles[range.clone()]
                .iter()
                .all(|triangle| triangle.iter().all(|p| node_box.contains(p)))
            {
                return Err(invalid(index, "triangle outside of the node box"));
            }

            for &child in node.children() {
                if child <= index {
                    return Err(invalid(index, "child index not greater than parent index"));
                }
                if child.index() >= nodes.len() {
                    return Err(invalid(index, "child index out of range"));
                }
                let child_range = nodes[child].triangles();
                if child_range.start < range.start || child_range.end > range.end {
                    return Err(invalid(index, "child triangles outside of the parent range"));
                }
                if !node_box.contains_box(&boxes[child]) {
                    return Err(invalid(index, "child box outside of the parent box"));
                }
            }
        }

        let bounding_boxes = boxes
            .iter()
            .map(|b| Ok(Cuboid::new(transform.compose(&Transform::from_box(b)?))))
            .collect::<Result<IndexVec<NodeIdx, _>, SceneError>>()?;

        Ok(Octree {
            transform,
            root,
            nodes,
            bounding_boxes,
            triangles,
        })
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn root(&self) -> NodeIdx {
        self.root
    }

    pub fn nodes(&self) -> &IndexVec<NodeIdx, OctreeNode> {
        &self.nodes
    }

    /// World space box of a node, as a box primitive.
    pub fn node_box(&self, node: NodeIdx) -> &Cuboid {
        &self.bounding_boxes[node]
    }

    pub fn triangles(&self) -> &IndexVec<TriangleIdx, Triangle<ObjectPoint>> {
        &self.triangles
    }
}

fn invalid(node: NodeIdx, reason: &str) -> SceneError {
    SceneError::InvalidOctree {
        node: node.index(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use assert2::{assert, let_assert};
    use index_vec::index_vec;

    fn triangle_at(z: f32) -> Triangle<ObjectPoint> {
        Triangle::new(
            ObjectPoint::new(0.0, 0.0, z),
            ObjectPoint::new(1.0, 0.0, z),
            ObjectPoint::new(0.0, 1.0, z),
        )
    }

    fn unit_box(z0: f32, z1: f32) -> ObjectBox {
        ObjectBox::new(ObjectPoint::new(0.0, 0.0, z0), ObjectPoint::new(1.0, 1.0, z1))
    }

    fn tri_range(start: u32, end: u32) -> Range<TriangleIdx> {
        TriangleIdx::from(start)..TriangleIdx::from(end)
    }

    /// Root with two leaves, one triangle each.
    fn parts() -> (
        IndexVec<NodeIdx, OctreeNode>,
        IndexVec<NodeIdx, ObjectBox>,
        IndexVec<TriangleIdx, Triangle<ObjectPoint>>,
    ) {
        let nodes = index_vec![
            OctreeNode::Inner {
                children: [NodeIdx::from(1u32), NodeIdx::from(2u32)].into_iter().collect(),
                triangles: tri_range(0, 2),
            },
            OctreeNode::Leaf { triangles: tri_range(0, 1) },
            OctreeNode::Leaf { triangles: tri_range(1, 2) },
        ];
        let boxes = index_vec![unit_box(-1.0, 3.0), unit_box(-0.5, 0.5), unit_box(1.5, 2.5)];
        let triangles = index_vec![triangle_at(0.0), triangle_at(2.0)];
        (nodes, boxes, triangles)
    }

    fn assemble(
        (nodes, boxes, triangles): (
            IndexVec<NodeIdx, OctreeNode>,
            IndexVec<NodeIdx, ObjectBox>,
            IndexVec<TriangleIdx, Triangle<ObjectPoint>>,
        ),
    ) -> Result<Octree, SceneError> {
        Octree::from_parts(Transform::identity(), nodes, boxes, triangles, NodeIdx::from(0u32))
    }

    #[test]
    fn valid_parts() {
        let_assert!(Ok(octree) = assemble(parts()));
        assert!(octree.nodes().len() == 3);
        let b = octree.node_box(NodeIdx::from(2u32)).transform.forward();
        assert!(b[(2, 3)] == 2.0);
        assert!(b[(2, 2)] == 1.0);
    }

    #[test]
    fn empty() {
        let_assert!(
            Err(SceneError::EmptyOctree) = Octree::from_parts(
                Transform::identity(),
                IndexVec::new(),
                IndexVec::new(),
                IndexVec::new(),
                NodeIdx::from(0u32)
            )
        );
    }

    #[test]
    fn mismatched_lengths() {
        let (nodes, mut boxes, triangles) = parts();
        boxes.pop();
        let_assert!(
            Err(SceneError::OctreeLengthMismatch { nodes: 3, boxes: 2 }) =
                assemble((nodes, boxes, triangles))
        );
    }

    #[test]
    fn root_out_of_range() {
        let (nodes, boxes, triangles) = parts();
        let_assert!(
            Err(SceneError::InvalidOctree { node: 7, .. }) = Octree::from_parts(
                Transform::identity(),
                nodes,
                boxes,
                triangles,
                NodeIdx::from(7u32)
            )
        );
    }

    #[test]
    fn child_before_parent() {
        let (mut nodes, boxes, triangles) = parts();
        nodes[NodeIdx::from(2u32)] = OctreeNode::Inner {
            children: [NodeIdx::from(1u32)].into_iter().collect(),
            triangles: tri_range(1, 2),
        };
        let_assert!(Err(SceneError::InvalidOctree { node: 2, .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn child_out_of_range() {
        let (mut nodes, boxes, triangles) = parts();
        nodes[NodeIdx::from(0u32)] = OctreeNode::Inner {
            children: [NodeIdx::from(1u32), NodeIdx::from(5u32)].into_iter().collect(),
            triangles: tri_range(0, 2),
        };
        let_assert!(Err(SceneError::InvalidOctree { node: 0, .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn inverted_range() {
        let (mut nodes, boxes, triangles) = parts();
        nodes[NodeIdx::from(1u32)] = OctreeNode::Leaf { triangles: tri_range(1, 0) };
        let_assert!(Err(SceneError::InvalidOctree { node: 1, .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn triangle_range_out_of_bounds() {
        let (mut nodes, boxes, triangles) = parts();
        nodes[NodeIdx::from(2u32)] = OctreeNode::Leaf { triangles: tri_range(1, 3) };
        let_assert!(Err(SceneError::InvalidOctree { .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn triangle_outside_box() {
        let (nodes, mut boxes, triangles) = parts();
        boxes[NodeIdx::from(1u32)] = unit_box(0.5, 1.0);
        let_assert!(Err(SceneError::InvalidOctree { node: 1, .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn child_box_outside_parent() {
        let (nodes, mut boxes, triangles) = parts();
        boxes[NodeIdx::from(2u32)] = unit_box(1.5, 3.5);
        let_assert!(Err(SceneError::InvalidOctree { node: 0, .. }) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn flat_box_is_rejected() {
        let nodes = index_vec![OctreeNode::Leaf { triangles: tri_range(0, 1) }];
        let boxes = index_vec![unit_box(0.0, 0.0)];
        let triangles = index_vec![triangle_at(0.0)];
        let_assert!(Err(SceneError::Transform(_)) = assemble((nodes, boxes, triangles)));
    }

    #[test]
    fn node_accessors() {
        let (nodes, _, _) = parts();
        let root = &nodes[NodeIdx::from(0u32)];
        assert!(!root.is_leaf());
        assert!(root.children().len() == 2);
        assert!(root.triangles() == tri_range(0, 2));
        assert!(nodes[NodeIdx::from(1u32)].children().is_empty());
    }
}
