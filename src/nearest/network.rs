// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{first_destination_by_node, Route, Snapper};
use crate::{multi_source_dijkstra, Error, Graph, Position};

/// Finds the closest destination to every source by the shortest path over the graph.
///
/// Sources and destinations are first snapped to their closest graph nodes,
/// then a single multi-source search is run from all destination nodes over
/// the reversed graph, so that one-way streets are respected in the
/// source-to-destination direction. If multiple destinations snap onto the same
/// node, the one listed first is reported.
///
/// The result is aligned with `sources`; sources which can't reach any destination
/// are set to `None`.
pub fn closest_by_network(
    g: &Graph,
    snapper: &Snapper,
    sources: &[Position],
    destinations: &[Position],
    step_limit: usize,
) -> Result<Vec<Option<Route>>, Error> {
    if destinations.is_empty() {
        return Err(Error::NoDestinations);
    }

    let destination_nodes = snapper.snap_all(destinations)?;
    let source_nodes = snapper.snap_all(sources)?;
    let by_node = first_destination_by_node(&destination_nodes);

    let tree = multi_source_dijkstra(&g.reversed(), &destination_nodes, step_limit)?;

    let routes: Vec<Option<Route>> = source_nodes
        .iter()
        .map(|&node| {
            let seed = tree.source(node)?;
            let distance = tree.distance(node)?;

            // Path over the reversed graph runs from the destination
            let mut nodes = tree.path(node)?;
            nodes.reverse();

            Some(Route {
                destination: *by_node.get(&seed)?,
                distance,
                nodes,
            })
        })
        .collect();

    let unreachable = routes.iter().filter(|r| r.is_none()).count();
    if unreachable > 0 {
        log::warn!(
            "{} out of {} sources can't reach any destination",
            unreachable,
            sources.len()
        );
    }

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest::test_fixtures::{at, grid, id};
    use crate::{Crs, Edge, Node, SearchError, DEFAULT_STEP_LIMIT};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-6),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn snapper(g: &Graph) -> Snapper {
        Snapper::new(g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap()
    }

    #[test]
    fn closest_by_network_on_grid() {
        let g = grid(5);
        let s = snapper(&g);

        let destinations = vec![at(&g, 0, 0), at(&g, 4, 4)];
        let sources = vec![at(&g, 1, 1), at(&g, 3, 4), at(&g, 4, 4)];

        let routes = closest_by_network(&g, &s, &sources, &destinations, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(routes.len(), 3);

        let r0 = routes[0].as_ref().unwrap();
        assert_eq!(r0.destination, 0);
        assert_eq!(r0.nodes.first(), Some(&id(1, 1)));
        assert_eq!(r0.nodes.last(), Some(&id(0, 0)));
        assert_eq!(r0.nodes.len(), 3);
        let via_0_1 = g.get_edge(id(1, 1), id(0, 1)) + g.get_edge(id(0, 1), id(0, 0));
        let via_1_0 = g.get_edge(id(1, 1), id(1, 0)) + g.get_edge(id(1, 0), id(0, 0));
        assert_almost_eq!(r0.distance, via_0_1.min(via_1_0));

        let r1 = routes[1].as_ref().unwrap();
        assert_eq!(r1.destination, 1);
        assert_eq!(r1.nodes, vec![id(3, 4), id(4, 4)]);

        let r2 = routes[2].as_ref().unwrap();
        assert_eq!(r2.destination, 1);
        assert_eq!(r2.distance, 0.0);
        assert_eq!(r2.nodes, vec![id(4, 4)]);
        assert_eq!(r2.label(), "0 m");
    }

    #[test]
    fn closest_by_network_respects_one_way() {
        let mut g = grid(3);
        // Corner node can be left towards its east neighbor, but never entered
        g.delete_edge(id(0, 1), id(0, 0));
        g.delete_edge(id(1, 0), id(0, 0));
        g.delete_edge(id(0, 0), id(1, 0));
        let s = snapper(&g);

        let routes = closest_by_network(&g, &s, &[at(&g, 0, 1)], &[at(&g, 0, 0)], DEFAULT_STEP_LIMIT)
            .unwrap();
        assert_eq!(routes, vec![None]);

        let routes = closest_by_network(&g, &s, &[at(&g, 0, 0)], &[at(&g, 0, 1)], DEFAULT_STEP_LIMIT)
            .unwrap();
        assert_eq!(routes[0].as_ref().unwrap().nodes, vec![id(0, 0), id(0, 1)]);
    }

    #[test]
    fn closest_by_network_unreachable_island() {
        let mut g = grid(3);
        g.set_node(Node {
            id: 9999,
            lat: 53.0,
            lon: -1.3,
        });
        g.set_edge(9999, Edge { to: id(0, 0), length: 1.0e5 });
        let s = snapper(&g);

        let routes = closest_by_network(
            &g,
            &s,
            &[Position::new(53.0, -1.3), at(&g, 2, 2)],
            &[Position::new(53.0001, -1.3001)],
            DEFAULT_STEP_LIMIT,
        )
        .unwrap();

        assert_eq!(routes[0].as_ref().map(|r| r.distance), Some(0.0));
        assert_eq!(routes[1], None);
    }

    #[test]
    fn duplicate_destination_nodes_prefer_first() {
        let g = grid(3);
        let s = snapper(&g);
        let p = at(&g, 2, 2);

        let routes = closest_by_network(
            &g,
            &s,
            &[at(&g, 0, 0)],
            &[p, Position::new(p.lat + 0.00001, p.lon)],
            DEFAULT_STEP_LIMIT,
        )
        .unwrap();
        assert_eq!(routes[0].as_ref().unwrap().destination, 0);
    }

    #[test]
    fn step_limit_is_propagated() {
        let g = grid(4);
        let s = snapper(&g);
        assert!(matches!(
            closest_by_network(&g, &s, &[at(&g, 1, 1)], &[at(&g, 0, 0), at(&g, 3, 3)], 1),
            Err(Error::Search(SearchError::StepLimitExceeded))
        ));
    }

    #[test]
    fn no_destinations() {
        let g = grid(2);
        assert!(matches!(
            closest_by_network(&g, &snapper(&g), &[at(&g, 0, 0)], &[], DEFAULT_STEP_LIMIT),
            Err(Error::NoDestinations)
        ));
    }
}
