// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::queue::{self, Labels};
use crate::{Graph, SearchError};

/// Shortest paths from the closest of several seed nodes, as found by [multi_source_dijkstra].
#[derive(Debug, Clone)]
pub struct MultiSourceTree {
    labels: Labels,
}

impl MultiSourceTree {
    /// Returns the number of nodes reached by the search (including the seeds).
    pub fn len(&self) -> usize {
        self.labels.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.costs.is_empty()
    }

    /// Returns the distance from the closest seed to `node`,
    /// or `None` if `node` wasn't reached.
    pub fn distance(&self, node: i64) -> Option<f64> {
        self.labels.costs.get(&node).copied()
    }

    /// Returns the closest seed to `node`, or `None` if `node` wasn't reached.
    pub fn source(&self, node: i64) -> Option<i64> {
        self.labels.origins.get(&node).copied()
    }

    /// Returns the shortest path from the closest seed to `node` (both inclusive),
    /// or `None` if `node` wasn't reached.
    pub fn path(&self, node: i64) -> Option<Vec<i64>> {
        self.labels.path(node)
    }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find, for every reachable node, the closest of the provided `sources`
/// and the shortest path from it.
///
/// Equally distant sources are resolved in favor of the one listed first.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [SearchError::StepLimitExceeded]. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn multi_source_dijkstra(
    g: &Graph,
    sources: &[i64],
    step_limit: usize,
) -> Result<MultiSourceTree, SearchError> {
    let labels = queue::run(g, sources, step_limit, |_| false)?;
    Ok(MultiSourceTree { labels })
}
