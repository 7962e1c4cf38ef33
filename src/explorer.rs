// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Interactive exploration of routes from a user-picked origin
//! (e.g. a click on a map) to a fixed set of destinations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{single_source_dijkstra_to, DistanceTable, Error, Graph, Node, Route, SearchError, Snapper};

/// Source of [Routes](Route) from an origin node to a fixed set of destinations.
pub trait RouteProvider {
    /// Returns routes from `origin` to all reachable destinations, ordered by destination index.
    fn routes_from(&self, origin: i64) -> Result<Vec<Route>, SearchError>;
}

/// [RouteProvider] running a new search for every query.
#[derive(Debug, Clone)]
pub struct LiveSearch<'g> {
    g: &'g Graph,
    destinations: Vec<i64>,
    step_limit: usize,
}

impl<'g> LiveSearch<'g> {
    /// Creates a provider routing towards the given destination nodes.
    pub fn new(g: &'g Graph, destinations: Vec<i64>, step_limit: usize) -> Self {
        Self {
            g,
            destinations,
            step_limit,
        }
    }
}

impl RouteProvider for LiveSearch<'_> {
    fn routes_from(&self, origin: i64) -> Result<Vec<Route>, SearchError> {
        let tree = single_source_dijkstra_to(self.g, origin, &self.destinations, self.step_limit)?;
        Ok(self
            .destinations
            .iter()
            .enumerate()
            .filter_map(|(destination, &node)| {
                Some(Route {
                    destination,
                    distance: tree.distance(node)?,
                    nodes: tree.path(node)?,
                })
            })
            .collect())
    }
}

impl RouteProvider for DistanceTable {
    fn routes_from(&self, origin: i64) -> Result<Vec<Route>, SearchError> {
        Ok(DistanceTable::routes_from(self, origin))
    }
}

/// Currently selected origin with routes towards all reachable destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub origin: Node,
    pub routes: Vec<Route>,
}

impl Selection {
    /// Returns distance annotations for every route, e.g. `"1234 m"`.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.routes.iter().map(Route::label)
    }
}

/// Keeps track of a selected origin node and its routes to destinations,
/// re-computing them whenever a new point is picked.
///
/// Clicks are expected in the planar coordinates of the [Snapper]'s [Crs](crate::Crs).
#[derive(Debug)]
pub struct RouteExplorer<'g, P: RouteProvider> {
    g: &'g Graph,
    snapper: Snapper,
    provider: P,
    selection: Option<Selection>,
}

impl<'g, P: RouteProvider> RouteExplorer<'g, P> {
    pub fn new(g: &'g Graph, snapper: Snapper, provider: P) -> Self {
        Self {
            g,
            snapper,
            provider,
            selection: None,
        }
    }

    pub fn snapper(&self) -> &Snapper {
        &self.snapper
    }

    /// Returns the current selection, if any point was picked yet.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Selects a specific graph node as the origin.
    pub fn select_node(&mut self, id: i64) -> Result<&Selection, Error> {
        let origin = self.g.get_node(id).ok_or(Error::UnknownNode(id))?;
        let routes = self.provider.routes_from(id)?;
        log::debug!(
            "selected node {} with routes to {} destinations",
            id,
            routes.len()
        );
        let selection: &Selection = self.selection.insert(Selection { origin, routes });
        Ok(selection)
    }

    /// Selects a random graph node as the origin.
    pub fn select_random(&mut self, seed: u64) -> Result<&Selection, Error> {
        if self.g.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let nth = rng.random_range(0..self.g.len());
        let id = self.g.iter().nth(nth).map(|n| n.id).ok_or(Error::EmptyGraph)?;
        self.select_node(id)
    }

    /// Handles a click at the given planar coordinates by selecting the closest node.
    ///
    /// Clicks without coordinates (e.g. outside of the map) are ignored and
    /// leave the current selection untouched.
    pub fn on_click(&mut self, x: Option<f64>, y: Option<f64>) -> Result<Option<&Selection>, Error> {
        match (x, y) {
            (Some(x), Some(y)) => {
                let id = self.snapper.snap_xy(x, y);
                self.select_node(id).map(Some)
            }
            _ => Ok(self.selection.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest::test_fixtures::{at, grid, id};
    use crate::{Crs, Position, DEFAULT_STEP_LIMIT};

    fn explorer_parts() -> (Graph, Snapper, Vec<i64>) {
        let g = grid(4);
        let snapper = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();
        let destinations = vec![id(0, 0), id(3, 3)];
        (g, snapper, destinations)
    }

    #[test]
    fn live_search_and_table_agree() {
        let (g, _, destinations) = explorer_parts();
        let live = LiveSearch::new(&g, destinations.clone(), DEFAULT_STEP_LIMIT);
        let table = DistanceTable::compute(&g, &destinations, DEFAULT_STEP_LIMIT).unwrap();

        for origin in g.iter().map(|n| n.id) {
            let a = live.routes_from(origin).unwrap();
            let b = RouteProvider::routes_from(&table, origin).unwrap();
            assert_eq!(a.len(), 2);
            assert_eq!(b.len(), 2);
            for (ra, rb) in a.iter().zip(&b) {
                assert_eq!(ra.destination, rb.destination);
                assert!((ra.distance - rb.distance).abs() < 1e-6);
                assert_eq!(ra.nodes.first(), rb.nodes.first());
                assert_eq!(ra.nodes.last(), rb.nodes.last());
            }
        }
    }

    #[test]
    fn click_selects_nearest_node() {
        let (g, snapper, destinations) = explorer_parts();
        let [x, y] = snapper.projection().project(at(&g, 1, 2)).unwrap();
        let live = LiveSearch::new(&g, destinations, DEFAULT_STEP_LIMIT);
        let mut explorer = RouteExplorer::new(&g, snapper, live);
        assert!(explorer.selection().is_none());

        let selection = explorer.on_click(Some(x + 3.0), Some(y - 2.0)).unwrap().unwrap();
        assert_eq!(selection.origin.id, id(1, 2));
        assert_eq!(selection.routes.len(), 2);
        assert_eq!(selection.routes[0].nodes.first(), Some(&id(1, 2)));
        assert_eq!(selection.routes[0].nodes.last(), Some(&id(0, 0)));
        assert_eq!(selection.routes[1].nodes.last(), Some(&id(3, 3)));

        let labels: Vec<String> = selection.labels().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|l| l.ends_with(" m")));

        // Clicks outside of the map keep the previous selection
        let selection = explorer.on_click(None, Some(y)).unwrap().unwrap();
        assert_eq!(selection.origin.id, id(1, 2));
    }

    #[test]
    fn live_search_step_limit() {
        let (g, _, destinations) = explorer_parts();
        let live = LiveSearch::new(&g, destinations, 1);
        assert_eq!(live.routes_from(id(1, 1)), Err(SearchError::StepLimitExceeded));
    }

    #[test]
    fn select_node_and_random() {
        let (g, snapper, destinations) = explorer_parts();
        let table = DistanceTable::compute(&g, &destinations, DEFAULT_STEP_LIMIT).unwrap();
        let mut explorer = RouteExplorer::new(&g, snapper, table);

        assert!(matches!(explorer.select_node(12345), Err(Error::UnknownNode(12345))));

        let selection = explorer.select_node(id(0, 0)).unwrap();
        assert_eq!(selection.routes[0].distance, 0.0);
        assert_eq!(selection.routes[0].label(), "0 m");

        let first = explorer.select_random(100).unwrap().origin.id;
        let second = explorer.select_random(100).unwrap().origin.id;
        assert_eq!(first, second);
        assert!(g.get_node(first).is_some());
    }
}
