// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::{earth_distance, Edge, Graph, Node};

use super::{model, FeatureSink, Options};

/// Helper object used for storing state related to converting [OSM features](model::Feature)
/// into a street network [Graph].
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options<'a>,
    unused_nodes: HashSet<i64>,
    nodes_outside_bbox: usize,
    ways: usize,
    skipped_ways: usize,
}

impl<'a> GraphBuilder<'a> {
    pub(super) fn new(g: &'a mut Graph, options: &'a Options<'a>) -> Self {
        Self {
            g,
            options,
            unused_nodes: HashSet::default(),
            nodes_outside_bbox: 0,
            ways: 0,
            skipped_ways: 0,
        }
    }

    fn add_node(&mut self, n: Node) {
        if self.options.bbox.is_some_and(|bbox| !bbox.contains(n.position())) {
            self.nodes_outside_bbox += 1;
            return;
        }

        self.g.set_node(n);
        self.unused_nodes.insert(n.id);
    }

    fn add_way(&mut self, w: model::Way) {
        if !self.options.profile.is_routable(&w.tags) {
            self.skipped_ways += 1;
            return;
        }

        let (forward, backward) = self.options.profile.way_direction(&w.tags);

        // Nodes outside of the bbox split the way into independent stretches
        let stretches: Vec<&[i64]> = w
            .nodes
            .split(|&id| self.g.get_node(id).is_none())
            .filter(|stretch| stretch.len() >= 2)
            .collect();

        for &stretch in &stretches {
            self.create_edges(stretch, forward, backward);
        }

        if !stretches.is_empty() {
            self.ways += 1;
        } else {
            log::debug!("way {} has less than 2 known nodes", w.id);
            self.skipped_ways += 1;
        }
    }

    fn create_edges(&mut self, nodes: &[i64], forward: bool, backward: bool) {
        for pair in nodes.windows(2) {
            let (Some(left), Some(right)) = (self.g.get_node(pair[0]), self.g.get_node(pair[1])) else {
                continue;
            };

            // Repeated nodes create self-loops, which are useless for routing
            if left.id == right.id {
                continue;
            }

            let length = earth_distance(left.lat, left.lon, right.lat, right.lon);
            if forward {
                self.g.set_edge(left.id, Edge { to: right.id, length });
            }
            if backward {
                self.g.set_edge(right.id, Edge { to: left.id, length });
            }

            self.unused_nodes.remove(&left.id);
            self.unused_nodes.remove(&right.id);
        }
    }

    /// Removes all nodes not referenced by any routable way.
    fn cleanup(&mut self) {
        for &id in &self.unused_nodes {
            self.g.delete_node(id);
        }

        log::info!(
            "loaded {} {} ways ({} nodes, {} edges); skipped {} ways, {} nodes outside of the bbox and {} unused nodes",
            self.ways,
            self.options.profile.name,
            self.g.len(),
            self.g.edge_count(),
            self.skipped_ways,
            self.nodes_outside_bbox,
            self.unused_nodes.len(),
        );
        self.unused_nodes.clear();
    }
}

impl FeatureSink for GraphBuilder<'_> {
    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => self.add_node(n.node),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn finish(&mut self) {
        self.cleanup();
    }
}
