// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

use crate::{earth_distance, Bounds, Edge, Error, Node, PlanarNode, Position, Projection};

/// Represents a street network as a set of [Nodes](Node)
/// and [Edges](Edge) (street segments) between them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(pub(crate) BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.0.values().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.values().map(|(node, _)| node)
    }

    /// Returns an iterator over all [Edges](Edge) in the graph,
    /// together with the id of the node they start at.
    pub fn edges(&self) -> impl Iterator<Item = (i64, &Edge)> {
        self.0
            .iter()
            .flat_map(|(&from, (_, edges))| edges.iter().map(move |e| (from, e)))
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved. Moving a node might
    /// violate the [Edge] length invariant.
    pub fn set_node(&mut self, node: Node) {
        assert_ne!(node.id, 0);

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                e.get_mut().0 = node;
            }
        }
    }

    /// Deletes a [Node] with a given `id`.
    ///
    /// Outgoing edges are removed, incoming edges are left dangling
    /// (searches ignore edges to non-existing nodes).
    pub fn delete_node(&mut self, id: i64) {
        self.0.remove(&id);
    }

    /// Finds the closest [Node] to the given position by great-circle distance.
    ///
    /// This function requires computing the distance to every [Node] in the graph;
    /// use a [KDTree](crate::KDTree) (or a [Snapper](crate::Snapper)) for repeated lookups.
    pub fn find_nearest_node(&self, p: Position) -> Option<Node> {
        self.iter()
            .map(|&nd| (earth_distance(p.lat, p.lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the length of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.get_edges(from_id)
            .iter()
            .find(|e| e.to == to_id)
            .map(|e| e.length)
            .unwrap_or(f64::INFINITY)
    }

    /// Creates or updates an [Edge] from a node with a given id.
    /// Edges from non-existing nodes are ignored.
    ///
    /// Parallel streets between the same pair of nodes collapse into one edge,
    /// keeping the shorter length.
    pub fn set_edge(&mut self, from_id: i64, edge: Edge) {
        assert_ne!(from_id, 0);
        assert_ne!(edge.to, 0);

        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                candidate.length = candidate.length.min(edge.length);
            } else {
                edges.push(edge);
            }
        }
    }

    /// Removes an edge from one node to another.
    pub fn delete_edge(&mut self, from_id: i64, to_id: i64) {
        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            if let Some(idx) = edges.iter().position(|e| e.to == to_id) {
                edges.swap_remove(idx);
            }
        }
    }

    /// Returns a copy of the graph with every edge reversed.
    ///
    /// Searching from a target over the reversed graph yields
    /// distances *towards* that target in the original graph.
    pub fn reversed(&self) -> Self {
        let mut r = Self(
            self.0
                .iter()
                .map(|(&id, &(node, _))| (id, (node, Vec::default())))
                .collect(),
        );

        for (from, edge) in self.edges() {
            if let Some((_, edges)) = r.0.get_mut(&edge.to) {
                edges.push(Edge {
                    to: from,
                    length: edge.length,
                });
            }
        }

        r
    }

    /// Removes all nodes outside of the largest weakly connected component
    /// (edge direction is ignored when determining connectivity).
    ///
    /// Returns the number of removed nodes.
    pub fn retain_largest_component(&mut self) -> usize {
        let mut components = DisjointSet::default();
        for &id in self.0.keys() {
            components.insert(id);
        }
        for (from, edge) in self.edges() {
            if self.0.contains_key(&edge.to) {
                components.union(from, edge.to);
            }
        }

        // Root to (size, smallest node id) of each component
        let mut sizes: HashMap<i64, (usize, i64)> = HashMap::default();
        for &id in self.0.keys() {
            let (size, smallest) = sizes.entry(components.find(id)).or_insert((0, id));
            *size += 1;
            *smallest = id.min(*smallest);
        }

        // Ties are resolved towards the component containing the smallest node id
        let largest = match sizes
            .iter()
            .max_by(|(_, (a_size, a_smallest)), (_, (b_size, b_smallest))| {
                a_size.cmp(b_size).then_with(|| b_smallest.cmp(a_smallest))
            })
            .map(|(&root, _)| root)
        {
            Some(root) => root,
            None => return 0,
        };

        let before = self.0.len();
        self.0.retain(|&id, _| components.find(id) == largest);
        for (_, edges) in self.0.values_mut() {
            edges.retain(|e| components.find(e.to) == largest);
        }

        let removed = before - self.0.len();
        if removed > 0 {
            log::info!(
                "removed {} nodes outside of the largest connected component ({} nodes remain)",
                removed,
                self.0.len()
            );
        }
        removed
    }

    /// Returns the smallest [Bounds] covering all nodes, or `None` for an empty graph.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_positions(self.iter().map(Node::position))
    }

    /// Returns all nodes projected into planar coordinates.
    pub fn project(&self, projection: &Projection) -> Result<Vec<PlanarNode>, Error> {
        self.iter()
            .map(|nd| {
                let [x, y] = projection.project(nd.position())?;
                Ok(PlanarNode { id: nd.id, x, y })
            })
            .collect()
    }
}

/// Union-find over node ids, with path halving and union by size.
#[derive(Debug, Default)]
struct DisjointSet {
    parent: HashMap<i64, i64>,
    size: HashMap<i64, usize>,
}

impl DisjointSet {
    fn insert(&mut self, id: i64) {
        self.parent.entry(id).or_insert(id);
        self.size.entry(id).or_insert(1);
    }

    fn find(&mut self, mut id: i64) -> i64 {
        while let Some(&parent) = self.parent.get(&id) {
            if parent == id {
                break;
            }
            let grandparent = self.parent.get(&parent).copied().unwrap_or(parent);
            self.parent.insert(id, grandparent);
            id = grandparent;
        }
        id
    }

    fn union(&mut self, a: i64, b: i64) {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return;
        }

        let a_size = self.size.get(&a).copied().unwrap_or(1);
        let b_size = self.size.get(&b).copied().unwrap_or(1);
        let (small, large) = if a_size < b_size { (a, b) } else { (b, a) };
        self.parent.insert(small, large);
        self.size.insert(large, a_size + b_size);
    }
}
