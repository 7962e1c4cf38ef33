// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Nearest points of interest over [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! Given a set of sources (e.g. people) and destinations (e.g. parks or shops),
//! finds the closest destination to every source, either as the crow flies
//! (in a projected, metric [coordinate system](Crs)) or by the shortest path
//! over a street network loaded from OSM data.
//!
//! # Example
//!
//! ```no_run
//! let mut g = nearest_poi::Graph::default();
//! let osm_options = nearest_poi::osm::Options {
//!     profile: &nearest_poi::osm::WALK_PROFILE,
//!     file_format: nearest_poi::osm::FileFormat::Unknown,
//!     bbox: None,
//! };
//! nearest_poi::osm::add_features_from_file(&mut g, &osm_options, "path/to/derby.osm.bz2")
//!     .expect("failed to load derby.osm.bz2");
//! g.retain_largest_component();
//!
//! let crs = nearest_poi::Crs::utm_for_positions(g.iter().map(|n| n.position())).unwrap();
//! let snapper = nearest_poi::Snapper::new(&g, crs).unwrap();
//!
//! let sources = nearest_poi::sample_nodes(&g, 1000, 100).unwrap();
//! let destinations = nearest_poi::sample_nodes(&g, 5, 101).unwrap();
//! let sources: Vec<_> = sources.iter().map(|n| n.position()).collect();
//! let destinations: Vec<_> = destinations.iter().map(|n| n.position()).collect();
//!
//! let routes = nearest_poi::closest_by_network(
//!     &g,
//!     &snapper,
//!     &sources,
//!     &destinations,
//!     nearest_poi::DEFAULT_STEP_LIMIT,
//! )
//! .expect("failed to compute nearest destinations");
//!
//! println!("{:?}", nearest_poi::DistanceStats::from_distances(
//!     routes.iter().flatten().map(|r| r.distance),
//! ));
//! ```

use std::str::FromStr;

mod distance;
mod error;
pub mod explorer;
pub mod geojson;
mod graph;
mod kd;
pub mod nearest;
pub mod osm;
mod projection;
mod sample;
mod search;
mod stats;
mod table;

pub use distance::{earth_distance, planar_distance};
pub use error::Error;
pub use explorer::{LiveSearch, RouteExplorer, RouteProvider, Selection};
pub use graph::Graph;
pub use kd::{KDTree, PlanarNode};
pub use nearest::{
    closest_among_candidates, closest_by_network, closest_straight_line, Assignment, Neighbor,
    Route, Snapper, StraightLineIndex,
};
pub use projection::{Crs, Projection};
pub use sample::{random_positions, sample_nodes};
pub use search::{
    multi_source_dijkstra, single_source_dijkstra, single_source_dijkstra_to, MultiSourceTree,
    SearchError, ShortestPathTree, DEFAULT_STEP_LIMIT,
};
pub use stats::{DistanceComparison, DistanceStats, Histogram};
pub use table::DistanceTable;

/// A WGS84 coordinate, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parses a position from a `"lat,lon"` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPosition(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

        if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0 {
            Ok(Self { lat, lon })
        } else {
            Err(invalid())
        }
    }
}

/// An axis-aligned box over WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Area around Derby, England, used as the default for random sampling.
    pub const DERBY: Self = Self {
        min_lon: -1.56,
        min_lat: 52.86,
        max_lon: -1.39,
        max_lat: 52.96,
    };

    /// Returns the smallest [Bounds] covering all provided positions,
    /// or `None` if there are no positions.
    pub fn from_positions<I: IntoIterator<Item = Position>>(positions: I) -> Option<Self> {
        positions.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_lon: p.lon,
                    min_lat: p.lat,
                    max_lon: p.lon,
                    max_lat: p.lat,
                },
                Some(b) => Self {
                    min_lon: b.min_lon.min(p.lon),
                    min_lat: b.min_lat.min(p.lat),
                    max_lon: b.max_lon.max(p.lon),
                    max_lat: b.max_lat.max(p.lat),
                },
            })
        })
    }

    pub fn contains(&self, p: Position) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    pub fn is_valid(&self) -> bool {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
            .iter()
            .all(|x| x.is_finite())
            && self.min_lon <= self.max_lon
            && self.min_lat <= self.max_lat
    }
}

impl FromStr for Bounds {
    type Err = Error;

    /// Parses bounds from a `"min_lon,min_lat,max_lon,max_lat"` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidBounds(s.to_string());
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            &[min_lon, min_lat, max_lon, max_lat] => {
                let b = Self {
                    min_lon,
                    min_lat,
                    max_lon,
                    max_lat,
                };
                if b.is_valid() {
                    Ok(b)
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }
}

/// Represents an element of the [Graph] - an intersection or a point along a street.
///
/// Nodes with `id == 0` are disallowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn position(&self) -> Position {
        Position {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Represents an outgoing (one-way) street segment from a specific [Node].
///
/// `length` is expressed in meters and must not be less than
/// the crow-flies distance between the two nodes.
///
/// `to` might not exist in the [Graph]; searches silently ignore such edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub length: f64,
}
