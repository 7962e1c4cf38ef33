// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Recommended number of allowed node expansions in a single search
/// before [SearchError::StepLimitExceeded] is returned.
///
/// Full searches expand every reachable node; the limit is set well above
/// the size of a city-wide pedestrian network.
pub const DEFAULT_STEP_LIMIT: usize = 10_000_000;

/// Error conditions which may occur during a shortest path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A start node doesn't exist in a graph.
    #[error("invalid node: {0}")]
    InvalidReference(i64),

    /// Search has exceeded its limit of node expansions.
    ///
    /// The step limit protects against resource exhaustion on graphs
    /// much larger than expected.
    #[error("step limit exceeded")]
    StepLimitExceeded,
}
