// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{osm, SearchError};

/// Error conditions which may occur when matching sources to their nearest destinations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Route search failed, see [SearchError].
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Loading OSM data failed.
    #[error(transparent)]
    Osm(#[from] osm::Error),

    /// The graph has no nodes, so no point can be snapped to it.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// Nearest destination lookup was requested over an empty set of destinations.
    #[error("no destinations provided")]
    NoDestinations,

    /// A node with the provided id doesn't exist in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// Sampling without replacement was requested for more elements than available.
    #[error("can't sample {requested} elements out of {available}")]
    SampleTooLarge { requested: usize, available: usize },

    #[error("invalid position (expected \"lat,lon\"): {0:?}")]
    InvalidPosition(String),

    #[error("invalid bounds (expected \"min_lon,min_lat,max_lon,max_lat\"): {0:?}")]
    InvalidBounds(String),

    #[error("unsupported coordinate reference system: {0:?}")]
    UnsupportedCrs(String),

    /// PROJ failed to set up a transformation between coordinate reference systems.
    #[error("projection setup: {0}")]
    ProjectionSetup(#[from] proj::ProjCreateError),

    /// PROJ failed to transform a coordinate.
    #[error("projection: {0}")]
    Projection(#[from] proj::ProjError),

    #[error("invalid tag filter (expected \"key\" or \"key=value,value\"): {0:?}")]
    InvalidTagFilter(String),
}
