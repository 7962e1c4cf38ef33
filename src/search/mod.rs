// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod multi_source;
mod queue;
mod single_source;

pub use error::{SearchError, DEFAULT_STEP_LIMIT};
pub use multi_source::{multi_source_dijkstra, MultiSourceTree};
pub use single_source::{single_source_dijkstra, single_source_dijkstra_to, ShortestPathTree};
