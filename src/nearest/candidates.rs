// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rayon::prelude::*;

use super::{Route, Snapper, StraightLineIndex};
use crate::{single_source_dijkstra_to, Error, Graph, Position, SearchError};

/// Finds the closest destination to every source by first picking `k` candidates
/// by straight-line distance (in the [Snapper]'s projection), and then choosing
/// the candidate with the shortest path over the graph.
///
/// This is cheaper than [closest_by_network](super::closest_by_network) for very
/// large destination sets, but might miss the true closest destination if the
/// street network forces large detours.
///
/// The result is aligned with `sources`; sources which can't reach any candidate
/// are set to `None`. Sources are processed in parallel.
pub fn closest_among_candidates(
    g: &Graph,
    snapper: &Snapper,
    sources: &[Position],
    destinations: &[Position],
    k: usize,
    step_limit: usize,
) -> Result<Vec<Option<Route>>, Error> {
    if destinations.is_empty() {
        return Err(Error::NoDestinations);
    }

    let index = StraightLineIndex::new(destinations, snapper.crs())?;
    let destination_nodes = snapper.snap_all(destinations)?;
    let projected_sources = snapper.projection().project_all(sources)?;

    let routes = projected_sources
        .par_iter()
        .map(|&[x, y]| -> Result<Option<Route>, SearchError> {
            let origin = snapper.snap_xy(x, y);
            let candidates = index.nearest_xy([x, y], k.max(1));
            let targets: Vec<i64> = candidates
                .iter()
                .map(|n| destination_nodes[n.index])
                .collect();

            let tree = single_source_dijkstra_to(g, origin, &targets, step_limit)?;

            Ok(candidates
                .iter()
                .filter_map(|n| {
                    let node = destination_nodes[n.index];
                    Some(Route {
                        destination: n.index,
                        distance: tree.distance(node)?,
                        nodes: tree.path(node)?,
                    })
                })
                .min_by(|a, b| {
                    a.distance
                        .total_cmp(&b.distance)
                        .then_with(|| a.destination.cmp(&b.destination))
                }))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest::closest_by_network;
    use crate::nearest::test_fixtures::{at, grid, id};
    use crate::{Crs, DEFAULT_STEP_LIMIT};

    /// A 5×5 grid with a wall between the first and second column,
    /// passable only through the top row.
    fn walled_grid() -> Graph {
        let mut g = grid(5);
        for row in 0..4 {
            g.delete_edge(id(row, 1), id(row, 2));
            g.delete_edge(id(row, 2), id(row, 1));
        }
        g
    }

    #[test]
    fn more_candidates_find_shorter_routes() {
        let g = walled_grid();
        let s = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();

        let sources = vec![at(&g, 0, 1)];
        let destinations = vec![at(&g, 0, 2), at(&g, 2, 0)];

        // The closest destination as the crow flies is behind the wall
        let routes = closest_among_candidates(&g, &s, &sources, &destinations, 1, DEFAULT_STEP_LIMIT)
            .unwrap();
        let r = routes[0].as_ref().unwrap();
        assert_eq!(r.destination, 0);
        assert!(r.distance > 900.0, "{}", r.distance);
        assert_eq!(r.nodes.first(), Some(&id(0, 1)));
        assert_eq!(r.nodes.last(), Some(&id(0, 2)));

        let routes = closest_among_candidates(&g, &s, &sources, &destinations, 2, DEFAULT_STEP_LIMIT)
            .unwrap();
        let r = routes[0].as_ref().unwrap();
        assert_eq!(r.destination, 1);
        assert!(r.distance < 300.0, "{}", r.distance);

        // With enough candidates, the result matches the exhaustive search
        let exhaustive = closest_by_network(&g, &s, &sources, &destinations, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(exhaustive[0].as_ref().unwrap().destination, 1);
        assert!((exhaustive[0].as_ref().unwrap().distance - r.distance).abs() < 1e-6);
    }

    #[test]
    fn stranded_source_has_no_route() {
        let mut g = grid(3);
        let stranded = id(1, 1);
        for (row, col) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            g.delete_edge(stranded, id(row, col));
        }
        let s = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();

        let routes = closest_among_candidates(
            &g,
            &s,
            &[at(&g, 1, 1), at(&g, 0, 0)],
            &[at(&g, 2, 2)],
            1,
            DEFAULT_STEP_LIMIT,
        )
        .unwrap();
        assert_eq!(routes[0], None);
        assert_eq!(routes[1].as_ref().map(|r| r.destination), Some(0));
    }

    #[test]
    fn step_limit_is_propagated() {
        let g = grid(4);
        let s = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();
        assert!(matches!(
            closest_among_candidates(&g, &s, &[at(&g, 0, 0)], &[at(&g, 3, 3)], 1, 1),
            Err(Error::Search(SearchError::StepLimitExceeded))
        ));
    }

    #[test]
    fn same_node_is_a_zero_length_route() {
        let g = grid(3);
        let s = Snapper::new(&g, Crs::WebMercator).unwrap();
        let p = at(&g, 1, 1);

        let routes = closest_among_candidates(&g, &s, &[p], &[p], 3, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(
            routes,
            vec![Some(Route {
                destination: 0,
                distance: 0.0,
                nodes: vec![id(1, 1)],
            })]
        );
    }
}
