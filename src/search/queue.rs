// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::{Edge, Graph, SearchError};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs (and earlier pushes) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Result of a [Dijkstra search](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// from one or more seed nodes.
#[derive(Debug, Clone, Default)]
pub(super) struct Labels {
    /// Best known cost of reaching every visited node.
    pub(super) costs: HashMap<i64, f64>,

    /// Seed node from which every visited node was reached.
    pub(super) origins: HashMap<i64, i64>,

    /// Predecessor of every visited node, except for the seeds.
    pub(super) came_from: HashMap<i64, i64>,
}

impl Labels {
    /// Walks the predecessor chain back from `last`, returning the path in
    /// the seed-to-`last` order, or `None` if `last` was never reached.
    pub(super) fn path(&self, mut last: i64) -> Option<Vec<i64>> {
        if !self.costs.contains_key(&last) {
            return None;
        }

        let mut path = vec![last];
        while let Some(&nd) = self.came_from.get(&last) {
            path.push(nd);
            last = nd;
        }

        path.reverse();
        Some(path)
    }
}

/// Runs Dijkstra's algorithm from all `seeds` at once.
///
/// `on_settle` is called once for every node whose cost becomes final,
/// in the order of non-decreasing cost; returning `true` stops the search.
/// Ties between equal costs are resolved in favor of the earlier push,
/// so seeds are expanded in the provided order.
pub(super) fn run<F: FnMut(i64) -> bool>(
    g: &Graph,
    seeds: &[i64],
    step_limit: usize,
    mut on_settle: F,
) -> Result<Labels, SearchError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut labels = Labels::default();
    let mut seq: u64 = 0;
    let mut steps: usize = 0;

    for &seed in seeds {
        if g.get_node(seed).is_none() {
            return Err(SearchError::InvalidReference(seed));
        }
        if labels.costs.contains_key(&seed) {
            continue;
        }

        labels.costs.insert(seed, 0.0);
        labels.origins.insert(seed, seed);
        queue.push(QueueItem {
            at: seed,
            cost: 0.0,
            seq,
        });
        seq += 1;
    }

    while let Some(item) = queue.pop() {
        // Instead of decreasing keys, multiple items might be kept in the queue for the same node.
        if item.cost > labels.costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        if on_settle(item.at) {
            break;
        }

        steps += 1;
        if steps > step_limit {
            return Err(SearchError::StepLimitExceeded);
        }

        let origin = labels.origins.get(&item.at).copied().unwrap_or(item.at);

        for &Edge {
            to: neighbor_id,
            length,
        } in g.get_edges(item.at)
        {
            // Dangling edges are silently ignored
            if g.get_node(neighbor_id).is_none() {
                continue;
            }

            let neighbor_cost = item.cost + length;
            if neighbor_cost
                >= labels
                    .costs
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            labels.costs.insert(neighbor_id, neighbor_cost);
            labels.origins.insert(neighbor_id, origin);
            labels.came_from.insert(neighbor_id, item.at);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                seq,
            });
            seq += 1;
        }
    }

    Ok(labels)
}
