// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Bounds, Error, Graph, Node, Position};

/// Draws `n` positions uniformly distributed within `bounds`.
///
/// The same `seed` always yields the same positions.
pub fn random_positions(bounds: Bounds, n: usize, seed: u64) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let lon = lerp(bounds.min_lon, bounds.max_lon, rng.random::<f64>());
            let lat = lerp(bounds.min_lat, bounds.max_lat, rng.random::<f64>());
            Position::new(lat, lon)
        })
        .collect()
}

#[inline]
fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t
}

/// Draws `n` distinct nodes of the graph, without replacement.
///
/// The same `seed` (on the same graph) always yields the same nodes.
pub fn sample_nodes(g: &Graph, n: usize, seed: u64) -> Result<Vec<Node>, Error> {
    if n > g.len() {
        return Err(Error::SampleTooLarge {
            requested: n,
            available: g.len(),
        });
    }

    let nodes: Vec<Node> = g.iter().copied().collect();
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(rand::seq::index::sample(&mut rng, nodes.len(), n)
        .into_iter()
        .map(|idx| nodes[idx])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest::test_fixtures::grid;
    use std::collections::HashSet;

    #[test]
    fn random_positions_within_bounds() {
        let points = random_positions(Bounds::DERBY, 500, 100);
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|&p| Bounds::DERBY.contains(p)));
        assert_eq!(points, random_positions(Bounds::DERBY, 500, 100));
        assert_ne!(points, random_positions(Bounds::DERBY, 500, 101));
    }

    #[test]
    fn sample_nodes_without_replacement() {
        let g = grid(5);
        let nodes = sample_nodes(&g, 25, 100).unwrap();
        let ids: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 25);

        let a = sample_nodes(&g, 5, 7).unwrap();
        let b = sample_nodes(&g, 5, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn sample_too_large() {
        let g = grid(2);
        assert!(matches!(
            sample_nodes(&g, 5, 100),
            Err(Error::SampleTooLarge {
                requested: 5,
                available: 4
            })
        ));
        assert!(sample_nodes(&g, 0, 100).unwrap().is_empty());
    }
}
