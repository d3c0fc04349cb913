use std::array;

use arrayvec::ArrayVec;
use bon::bon;
use index_vec::IndexVec;
use itertools::Itertools as _;

use crate::{
    geometry::{FloatType, ObjectBox, ObjectPoint, Triangle},
    scene::{Mesh, SceneError},
};

use super::{INNER_NODE_CHILDREN, NodeIdx, Octree, OctreeNode, TriangleIdx};

/// Node boxes are grown by this fraction of the largest mesh extent, so that
/// flat nodes still have invertible box transforms.
const BOX_PADDING: FloatType = 1e-3;
const MIN_BOX_PADDING: FloatType = 1e-4;

/// Limits for octree subdivision.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeSettings {
    /// Nodes at this depth are always leaves, root has depth 0
    pub max_depth: usize,
    /// Nodes with at most this many triangles are not subdivided
    pub max_leaf_triangles: usize,
}

#[bon]
impl OctreeSettings {
    #[builder]
    pub fn new(
        #[builder(default = 10)] max_depth: usize,
        #[builder(default = 16)] max_leaf_triangles: usize,
    ) -> Self {
        OctreeSettings {
            max_depth,
            max_leaf_triangles,
        }
    }
}

impl Default for OctreeSettings {
    fn default() -> Self {
        OctreeSettings::builder().build()
    }
}

impl Octree {
    /// Builds an octree over the triangles of a mesh. The octree shares the mesh transform.
    ///
    /// Triangles are split by their centroids into the octants of the node box,
    /// each child gets the box of its own triangles (a loose octree), so every triangle
    /// is fully inside the boxes of all nodes that cover it.
    pub fn build(mesh: &Mesh, settings: &OctreeSettings) -> Result<Octree, SceneError> {
        let mut triangles: Vec<Triangle<ObjectPoint>> = mesh.triangles().collect();
        let bounds = ObjectBox::from_points(triangles.iter().flat_map(|t| t.iter()))
            .ok_or(SceneError::EmptyMesh)?;

        let mut builder = Builder {
            settings,
            margin: (bounds.size().max() * BOX_PADDING).max(MIN_BOX_PADDING),
            nodes: IndexVec::new(),
            boxes: IndexVec::new(),
        };
        let root = builder.build_recursive(&mut triangles, 0, 0);

        log::debug!(
            "Built octree: {} triangles, {} nodes, {} leaves",
            triangles.len(),
            builder.nodes.len(),
            builder.nodes.iter().filter(|node| node.is_leaf()).count(),
        );

        Octree::from_parts(
            mesh.transform().clone(),
            builder.nodes,
            builder.boxes,
            triangles.into_iter().collect(),
            root,
        )
    }
}

struct Builder<'a> {
    settings: &'a OctreeSettings,
    margin: FloatType,
    nodes: IndexVec<NodeIdx, OctreeNode>,
    boxes: IndexVec<NodeIdx, ObjectBox>,
}

impl Builder<'_> {
    /// Builds a subtree over a nonempty slice of triangles, reordering the slice so that
    /// the triangles of every node stay contiguous.
    /// `offset` is the position of the slice in the final triangle array.
    fn build_recursive(
        &mut self,
        triangles: &mut [Triangle<ObjectPoint>],
        offset: usize,
        depth: usize,
    ) -> NodeIdx {
        let node_box = ObjectBox::from_points(triangles.iter().flat_map(|t| t.iter()))
            .unwrap_or_else(|| unreachable!("Octree nodes are never empty"))
            .padded(self.margin);
        let range = TriangleIdx::new(offset)..TriangleIdx::new(offset + triangles.len());

        // Create placeholder leaf that might get replaced by an inner node later
        let node_index = self.nodes.push(OctreeNode::Leaf {
            triangles: range.clone(),
        });
        self.boxes.push(node_box.clone());

        if triangles.len() <= self.settings.max_leaf_triangles || depth >= self.settings.max_depth
        {
            return node_index;
        }

        let split_indices = split_triangles(triangles, &node_box.center());
        if split_indices
            .iter()
            .tuple_windows()
            .any(|(start, end)| end - start == triangles.len())
        {
            // Centroids can't be separated any more
            return node_index;
        }

        let mut children = ArrayVec::new();
        for (&start, &end) in split_indices.iter().tuple_windows() {
            if start == end {
                continue;
            }
            children.push(self.build_recursive(&mut triangles[start..end], offset + start, depth + 1));
        }

        self.nodes[node_index] = OctreeNode::Inner {
            children,
            triangles: range,
        };

        node_index
    }
}

/// Octant of the point relative to the center, one bit per axis.
fn octant(point: &ObjectPoint, center: &ObjectPoint) -> usize {
    (0..3).fold(0, |acc, axis| {
        acc | (usize::from(point[axis] > center[axis]) << axis)
    })
}

/// Sorts the triangles by the octant of their centroid and returns indices where the
/// octants start. Array is one larger than INNER_NODE_CHILDREN, first item is always 0,
/// last item is always triangles.len().
fn split_triangles(
    triangles: &mut [Triangle<ObjectPoint>],
    center: &ObjectPoint,
) -> [usize; INNER_NODE_CHILDREN + 1] {
    triangles.sort_by_cached_key(|t| octant(&t.centroid(), center));
    array::from_fn(|i| triangles.partition_point(|t| octant(&t.centroid(), center) < i))
}
