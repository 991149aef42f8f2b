// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [find_path_astar](crate::find_path_astar) or
/// [find_path_ucs](crate::find_path_ucs).
///
/// Not finding a path is not an error; the search functions return `Ok(None)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The start or destination node doesn't exist in the network.
    #[error("invalid node: {0}")]
    InvalidReference(i64),
}
