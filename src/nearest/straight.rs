// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use super::{Assignment, Neighbor};
use crate::{Crs, Error, Position, Projection};

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Spatial index over destinations, answering k-nearest-neighbor queries
/// by straight-line distance in a projected [Crs].
#[derive(Debug)]
pub struct StraightLineIndex {
    projection: Projection,
    tree: RTree<IndexedPoint>,
}

impl StraightLineIndex {
    pub fn new(destinations: &[Position], crs: Crs) -> Result<Self, Error> {
        let projection = crs.projection()?;
        let points = projection
            .project_all(destinations)?
            .into_iter()
            .enumerate()
            .map(|(idx, xy)| IndexedPoint::new(xy, idx))
            .collect();

        Ok(Self {
            projection,
            tree: RTree::bulk_load(points),
        })
    }

    pub fn crs(&self) -> Crs {
        self.projection.crs()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Returns the number of indexed destinations.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns up to `k` destinations closest to `p`, ordered by increasing distance.
    pub fn nearest(&self, p: Position, k: usize) -> Result<Vec<Neighbor>, Error> {
        let at = self.projection.project(p)?;
        Ok(self.nearest_xy(at, k))
    }

    /// Like [nearest](Self::nearest), but for already projected coordinates.
    pub fn nearest_xy(&self, at: [f64; 2], k: usize) -> Vec<Neighbor> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&at)
            .take(k)
            .map(|(item, distance_2)| Neighbor {
                index: item.data,
                distance: distance_2.sqrt(),
            })
            .collect()
    }
}

/// Finds the closest destination to every source by straight-line distance in `crs`.
///
/// The result is aligned with `sources`.
pub fn closest_straight_line(
    sources: &[Position],
    destinations: &[Position],
    crs: Crs,
) -> Result<Vec<Assignment>, Error> {
    if destinations.is_empty() {
        return Err(Error::NoDestinations);
    }

    let index = StraightLineIndex::new(destinations, crs)?;
    let projected_sources = index.projection().project_all(sources)?;
    log::debug!(
        "matching {} sources against {} destinations by straight line in {}",
        sources.len(),
        destinations.len(),
        crs
    );

    let assignments = projected_sources
        .par_iter()
        .enumerate()
        .filter_map(|(source, &xy)| {
            index.nearest_xy(xy, 1).first().map(|n| Assignment {
                source,
                destination: n.index,
                distance: n.distance,
            })
        })
        .collect();

    Ok(assignments)
}
