// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Matching sources to their nearest destinations, either as the crow flies
//! ([StraightLineIndex]) or over the street network ([closest_by_network]).

mod candidates;
mod network;
mod snap;
mod straight;

pub use candidates::closest_among_candidates;
pub use network::closest_by_network;
pub use snap::Snapper;
pub use straight::{closest_straight_line, StraightLineIndex};

/// One of the nearest destinations of a point, see [StraightLineIndex::nearest].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Neighbor {
    /// Index into the destination list.
    pub index: usize,

    /// Straight-line distance, in units of the index' [Crs](crate::Crs).
    pub distance: f64,
}

/// Source matched with its nearest destination by straight-line distance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Assignment {
    /// Index into the source list.
    pub source: usize,

    /// Index into the destination list.
    pub destination: usize,

    pub distance: f64,
}

/// Shortest path over the street network towards a destination.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Route {
    /// Index into the destination list.
    pub destination: usize,

    /// Length of the route, in meters.
    pub distance: f64,

    /// Ids of the graph nodes along the route, from the origin
    /// node to the node closest to the destination.
    pub nodes: Vec<i64>,
}

impl Route {
    /// Human readable distance, as used for map annotations (e.g. `"1234 m"`).
    pub fn label(&self) -> String {
        format!("{:.0} m", self.distance)
    }
}

/// Maps every distinct destination node to the first destination snapped onto it.
fn first_destination_by_node(destination_nodes: &[i64]) -> std::collections::HashMap<i64, usize> {
    let mut by_node = std::collections::HashMap::with_capacity(destination_nodes.len());
    for (idx, &node) in destination_nodes.iter().enumerate() {
        by_node.entry(node).or_insert(idx);
    }
    by_node
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::{Edge, Graph, Node, Position};

    /// Builds a pedestrian grid of `size × size` nodes around Derby, with streets
    /// between horizontal and vertical neighbors. Node ids are `row * 100 + col + 1`.
    ///
    /// Grid spacing is 0.001° in both directions (≈111 m north-south, ≈67 m east-west).
    pub(crate) fn grid(size: i64) -> Graph {
        let mut g = Graph::default();
        for row in 0..size {
            for col in 0..size {
                g.set_node(Node {
                    id: id(row, col),
                    lat: 52.9 + row as f64 * 0.001,
                    lon: -1.48 + col as f64 * 0.001,
                });
            }
        }

        for row in 0..size {
            for col in 0..size {
                if col + 1 < size {
                    street(&mut g, id(row, col), id(row, col + 1));
                }
                if row + 1 < size {
                    street(&mut g, id(row, col), id(row + 1, col));
                }
            }
        }
        g
    }

    pub(crate) fn id(row: i64, col: i64) -> i64 {
        row * 100 + col + 1
    }

    pub(crate) fn at(g: &Graph, row: i64, col: i64) -> Position {
        g.get_node(id(row, col)).unwrap().position()
    }

    fn street(g: &mut Graph, a: i64, b: i64) {
        let na = g.get_node(a).unwrap();
        let nb = g.get_node(b).unwrap();
        let length = crate::earth_distance(na.lat, na.lon, nb.lat, nb.lon);
        g.set_edge(a, Edge { to: b, length });
        g.set_edge(b, Edge { to: a, length });
    }
}
