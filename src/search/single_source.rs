// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use super::queue::{self, Labels};
use crate::{Graph, SearchError};

/// Shortest paths from a single root node, as found by
/// [single_source_dijkstra] or [single_source_dijkstra_to].
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    root: i64,
    labels: Labels,
}

impl ShortestPathTree {
    pub fn root(&self) -> i64 {
        self.root
    }

    /// Returns the number of nodes reached by the search (including the root).
    pub fn len(&self) -> usize {
        self.labels.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.costs.is_empty()
    }

    /// Returns the length of the shortest path from the root to `node`,
    /// or `None` if `node` wasn't reached.
    pub fn distance(&self, node: i64) -> Option<f64> {
        self.labels.costs.get(&node).copied()
    }

    /// Returns the shortest path from the root to `node` (both inclusive),
    /// or `None` if `node` wasn't reached.
    pub fn path(&self, node: i64) -> Option<Vec<i64>> {
        self.labels.path(node)
    }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest paths from `from_id` to every reachable node in the graph.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [SearchError::StepLimitExceeded]. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn single_source_dijkstra(
    g: &Graph,
    from_id: i64,
    step_limit: usize,
) -> Result<ShortestPathTree, SearchError> {
    let labels = queue::run(g, &[from_id], step_limit, |_| false)?;
    Ok(ShortestPathTree {
        root: from_id,
        labels,
    })
}

/// Same as [single_source_dijkstra], but stops as soon as all `targets` are settled.
///
/// Distances and paths to the targets are exact; other nodes in the returned tree
/// might carry non-final distances. Targets not present in the graph (or unreachable)
/// are simply missing from the result.
pub fn single_source_dijkstra_to(
    g: &Graph,
    from_id: i64,
    targets: &[i64],
    step_limit: usize,
) -> Result<ShortestPathTree, SearchError> {
    let mut remaining: HashSet<i64> = targets
        .iter()
        .copied()
        .filter(|&t| g.get_node(t).is_some())
        .collect();

    let labels = queue::run(g, &[from_id], step_limit, |settled| {
        remaining.remove(&settled);
        remaining.is_empty()
    })?;

    Ok(ShortestPathTree {
        root: from_id,
        labels,
    })
}
