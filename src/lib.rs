// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Time-optimal routing over road-network tables.
//!
//! Raw node and edge records (as extracted from map data) are classified into typed
//! [Nodes](Node) and [Edges](Edge), assembled into a [RoadNetwork] with a spatial index,
//! and searched with either A* ([find_path_astar]) or uniform-cost search ([find_path_ucs]).
//! Edge weights and path time estimates come from the same [cost] model, in hours.
//!
//! # Example
//!
//! ```no_run
//! let tables = roadnav::loader::read_tables_from_file(
//!     &roadnav::loader::Options::default(),
//!     "path/to/fullerton.json.gz",
//! ).expect("failed to read tables");
//!
//! let g = roadnav::RoadNetwork::build(
//!     tables.nodes,
//!     tables.edges,
//!     &roadnav::BuildOptions::default(),
//! ).expect("failed to build the network");
//!
//! let start = g.nearest_node(roadnav::RoadNetwork::mercator(-117.95, 33.87)).unwrap();
//! let end = g.nearest_node(roadnav::RoadNetwork::mercator(-117.88, 33.90)).unwrap();
//!
//! if let Some(path) = roadnav::find_path_astar(&g, start.id, end.id).unwrap() {
//!     let hours = roadnav::path_time_estimate(&g, &path.elements);
//!     println!("Estimated arrival in {:.1} minutes", hours * 60.0);
//! }
//! ```

pub mod cache;
mod classify;
pub mod cost;
pub mod geometry;
mod kd;
pub mod loader;
mod model;
mod network;
mod raw;
mod search;

pub use classify::{
    classify_edge, classify_node, count_adjacent_edges, fill_adjacent_edge_counts,
    parse_speed_limit, IngestError, ParseError, DRIVABLE_HIGHWAYS, TRAFFIC_CONTROL_VALUES,
};
pub use kd::{Entry as KDEntry, KDTree};
pub use model::{
    Edge, EdgeIndex, EdgeKind, Node, NodeAttributes, NodeIndex, NodeKind, Road, Tags,
};
pub use network::{BuildOptions, EmptyNetworkError, RoadNetwork};
pub use raw::{RawEdge, RawNode, RawTables};
pub use search::{
    find_path_astar, find_path_ucs, path_time_estimate, remaining_time_estimate, Path,
    PathElement, SearchError, HEURISTIC_SPEED_MPH,
};
