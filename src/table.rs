// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rayon::prelude::*;

use crate::{single_source_dijkstra, Graph, Route, SearchError, ShortestPathTree};

/// Precomputed shortest paths from every node of a graph
/// towards a fixed set of destination nodes.
///
/// One full search is run per destination (in parallel) over the reversed graph.
/// Only the resulting shortest path trees are stored; distances and paths for
/// a specific origin are reconstructed on demand.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    destinations: Vec<i64>,
    trees: Vec<ShortestPathTree>,
}

impl DistanceTable {
    /// Computes shortest paths from all nodes to all of the `destinations` (graph node ids).
    pub fn compute(
        g: &Graph,
        destinations: &[i64],
        step_limit: usize,
    ) -> Result<Self, SearchError> {
        log::info!(
            "computing all distances and paths to {} destination nodes",
            destinations.len()
        );

        let reversed = g.reversed();
        let trees = destinations
            .par_iter()
            .map(|&destination| {
                let tree = single_source_dijkstra(&reversed, destination, step_limit)?;
                log::debug!(
                    "destination node {} is reachable from {} nodes",
                    destination,
                    tree.len()
                );
                Ok(tree)
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        Ok(Self {
            destinations: destinations.to_vec(),
            trees,
        })
    }

    /// Destination node ids, in the order provided to [DistanceTable::compute].
    pub fn destinations(&self) -> &[i64] {
        &self.destinations
    }

    /// Returns the shortest distance from `origin` to the destination at `destination_idx`,
    /// or `None` if the destination is unreachable (or the index is out of bounds).
    pub fn distance(&self, origin: i64, destination_idx: usize) -> Option<f64> {
        self.trees.get(destination_idx)?.distance(origin)
    }

    /// Returns the shortest path from `origin` to the destination at `destination_idx`,
    /// starting with `origin`, or `None` if the destination is unreachable.
    pub fn path(&self, origin: i64, destination_idx: usize) -> Option<Vec<i64>> {
        let mut path = self.trees.get(destination_idx)?.path(origin)?;
        path.reverse();
        Some(path)
    }

    /// Returns [Routes](Route) from `origin` to all reachable destinations,
    /// ordered by destination index.
    pub fn routes_from(&self, origin: i64) -> Vec<Route> {
        (0..self.trees.len())
            .filter_map(|destination| {
                Some(Route {
                    destination,
                    distance: self.distance(origin, destination)?,
                    nodes: self.path(origin, destination)?,
                })
            })
            .collect()
    }
}
