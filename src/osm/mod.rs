// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of street networks and points of interest
//! from [OpenStreetMap](https://www.openstreetmap.org/) data.

mod profile;
mod reader;

pub use profile::{Exclusion, Profile, BIKE_PROFILE, DRIVE_PROFILE, WALK_PROFILE};
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io,
    points_of_interest_from_buffer, points_of_interest_from_file, points_of_interest_from_io,
    FileFormat, Options, PoiOptions, TagFilter,
};

/// Error conditions which may occur when reading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid OSM XML: {0}")]
    Xml(#[from] quick_xml::Error),
}
