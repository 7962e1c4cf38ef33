// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Crs, Error, Graph, KDTree, Position, Projection};

/// Snaps arbitrary points to their closest graph node, by planar distance
/// in a projected [Crs].
#[derive(Debug)]
pub struct Snapper {
    projection: Projection,
    tree: KDTree,
}

impl Snapper {
    /// Indexes all nodes of the graph, projected into `crs`.
    pub fn new(g: &Graph, crs: Crs) -> Result<Self, Error> {
        let projection = crs.projection()?;
        let mut nodes = g.project(&projection)?;
        let tree = KDTree::build(&mut nodes).ok_or(Error::EmptyGraph)?;
        log::debug!("indexed {} nodes in {} for snapping", nodes.len(), crs);
        Ok(Self { projection, tree })
    }

    /// Coordinate system in which nodes are compared.
    pub fn crs(&self) -> Crs {
        self.projection.crs()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Returns the id of the node closest to the given position.
    pub fn snap(&self, p: Position) -> Result<i64, Error> {
        let [x, y] = self.projection.project(p)?;
        Ok(self.snap_xy(x, y))
    }

    /// Returns the id of the node closest to already projected coordinates.
    pub fn snap_xy(&self, x: f64, y: f64) -> i64 {
        self.tree.find_nearest_node(x, y).id
    }

    /// Snaps every position, preserving order.
    pub fn snap_all(&self, positions: &[Position]) -> Result<Vec<i64>, Error> {
        positions.iter().map(|&p| self.snap(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearest::test_fixtures::{grid, id};

    #[test]
    fn snap_to_grid() {
        let g = grid(5);
        let snapper = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();

        assert_eq!(snapper.snap(Position::new(52.9001, -1.4799)).unwrap(), id(0, 0));
        assert_eq!(snapper.snap(Position::new(52.9029, -1.4762)).unwrap(), id(3, 4));
        assert_eq!(
            snapper
                .snap_all(&[Position::new(52.95, -1.40), Position::new(52.0, -2.0)])
                .unwrap(),
            vec![id(4, 4), id(0, 0)]
        );
    }

    #[test]
    fn snap_agrees_with_brute_force() {
        let g = grid(6);
        let snapper = Snapper::new(&g, Crs::utm_for(Position::new(52.9, -1.48))).unwrap();

        for i in 0..20 {
            let p = Position::new(52.8995 + i as f64 * 0.00031, -1.4805 + i as f64 * 0.00027);
            assert_eq!(Some(snapper.snap(p).unwrap()), g.find_nearest_node(p).map(|n| n.id), "{:?}", p);
        }
    }

    #[test]
    fn empty_graph() {
        assert!(matches!(
            Snapper::new(&Graph::default(), Crs::WebMercator),
            Err(Error::EmptyGraph)
        ));
    }
}
