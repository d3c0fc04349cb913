use std::fmt::Display;

use crate::{scene::Object as _, util::Stats};

use super::{NodeIdx, Octree, OctreeNode};

/// Shape of a built octree.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeStatistics {
    pub node_count: usize,
    pub triangle_count: usize,
    /// Depth of leaves, root has depth 0
    pub depth: Stats,
    pub inner_node_children: Stats,
    pub leaf_triangles: Stats,
}

impl Display for OctreeStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes: {}", self.node_count)?;
        writeln!(f, "Triangles: {}", self.triangle_count)?;
        writeln!(f, "Leaf depth: {}", self.depth)?;
        writeln!(f, "Inner node child count: {}", self.inner_node_children)?;
        write!(f, "Leaf node fill: {}", self.leaf_triangles)
    }
}

impl Octree {
    pub fn print_tree(&self) {
        self.print_recursive(0, self.root);
    }

    pub fn print_statistics(&self) {
        println!("{}", self.statistics());
    }

    pub fn statistics(&self) -> OctreeStatistics {
        OctreeStatistics {
            node_count: self.nodes.len(),
            triangle_count: self.triangles.len(),
            depth: self.depth_statistics_recursive(self.root),
            inner_node_children: self
                .nodes
                .iter()
                .filter(|node| !node.is_leaf())
                .map(|node| node.children().len())
                .collect(),
            leaf_triangles: self
                .nodes
                .iter()
                .filter(|node| node.is_leaf())
                .map(|node| {
                    let range = node.triangles();
                    range.end.index() - range.start.index()
                })
                .collect(),
        }
    }

    fn depth_statistics_recursive(&self, node: NodeIdx) -> Stats {
        let children = self.nodes[node].children();
        if children.is_empty() {
            return [0].into_iter().collect();
        }

        let mut ret = children
            .iter()
            .map(|child| self.depth_statistics_recursive(*child))
            .fold(Stats::default(), |a, b| a.merge(&b));

        ret.min += 1;
        ret.max += 1;
        ret.avg += 1.0;

        ret
    }

    fn print_recursive(&self, indent: usize, node_index: NodeIdx) {
        let node = &self.nodes[node_index];
        let node_box = self.bounding_boxes[node_index].get_bounding_box();
        println!(
            "{}- {}{}: {:?}-{:?}",
            "  ".repeat(indent),
            if node.is_leaf() { "L" } else { "I" },
            node_index.index(),
            node_box.min,
            node_box.max,
        );

        match node {
            OctreeNode::Inner { children, .. } => {
                for child in children {
                    self.print_recursive(indent + 1, *child);
                }
            }
            OctreeNode::Leaf { triangles } => {
                let indent = "  ".repeat(indent + 1);
                for triangle in self.triangles[triangles.clone()].iter() {
                    println!(
                        "{}{:?}, {:?}, {:?}",
                        indent, triangle[0], triangle[1], triangle[2]
                    );
                }
            }
        }
    }
}
