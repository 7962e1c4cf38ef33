// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::planar_distance;

/// A graph node projected into planar coordinates, see [Graph::project](crate::Graph::project).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarNode {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl PlanarNode {
    #[inline]
    fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree)
/// over [PlanarNodes](PlanarNode), used to snap arbitrary points to their closest graph node.
///
/// Coordinates must come from a single projected [Crs](crate::Crs), as the tree
/// uses plain euclidean geometry.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: PlanarNode,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [PlanarNode] to the given point.
    pub fn find_nearest_node(&self, x: f64, y: f64) -> PlanarNode {
        self.find_nearest_node_impl([x, y], false).0
    }

    fn find_nearest_node_impl(&self, at: [f64; 2], y_divides: bool) -> (PlanarNode, f64) {
        let mut best = self.pivot;
        let mut best_dist = planar_distance(at, best.xy());

        let axis = if y_divides { 1 } else { 0 };
        let (first, second) = if at[axis] < self.pivot.xy()[axis] {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(at, !y_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // The other half-plane can only contain a closer node
        // if the splitting line is closer than the current best.
        if let Some(ref branch) = second {
            let dist_to_axis = (at[axis] - self.pivot.xy()[axis]).abs();
            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(at, !y_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [PlanarNodes](PlanarNode).
    /// Returns `None` if there are no nodes.
    pub fn from_iter<I: IntoIterator<Item = PlanarNode>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [PlanarNodes](PlanarNode).
    /// Nodes will be reordered in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [PlanarNode]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [PlanarNode], y_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                let axis = if y_divides { 1 } else { 0 };
                let median = nodes.len() / 2;
                nodes.select_nth_unstable_by(median, |a, b| a.xy()[axis].total_cmp(&b.xy()[axis]));

                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !y_divides).map(Box::new),
                    right: Self::build_impl(right, !y_divides).map(Box::new),
                })
            }
        }
    }
}
