// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::classify::{
    classify_edge, classify_node, fill_adjacent_edge_counts, IngestError, DEFAULT_MAX_SPEED,
};
use crate::geometry::{project, unproject, Point};
use crate::kd::{Entry, KDTree};
use crate::model::{Edge, EdgeIndex, Node, NodeIndex};
use crate::raw::{RawEdge, RawNode};

/// Returned when querying the spatial index of a network without any nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("road network has no nodes")]
pub struct EmptyNetworkError;

/// Controls how raw records are turned into a [RoadNetwork].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// If set, a malformed speed limit aborts the whole build with [IngestError::Edge].
    /// Otherwise, a warning is logged and the default speed limit is used instead.
    pub strict_speed_limits: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_speed_limits: true,
        }
    }
}

/// Represents a road network as an arena of classified [Nodes](Node)
/// and directed [Edges](Edge) between them, together with a spatial index
/// of node positions.
///
/// The network is immutable once built and can be shared between threads;
/// every route search keeps its own state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadNetwork {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    by_id: HashMap<i64, NodeIndex>,
    index: Option<KDTree>,
}

impl RoadNetwork {
    /// Creates a network from already classified nodes and edges.
    ///
    /// Edges must refer to nodes by their position in `nodes`, and every node's
    /// outgoing edge list must only contain edges starting at that node.
    /// The spatial index covers every node, including ones without outgoing edges.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        debug_assert!(nodes.iter().enumerate().all(|(idx, n)| n
            .edges
            .iter()
            .all(|e| edges[e.index()].start == Some(NodeIndex(idx as u32)))));

        let by_id = nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id, NodeIndex(idx as u32)))
            .collect();

        let index = KDTree::from_iter(nodes.iter().enumerate().map(|(idx, n)| Entry {
            node: NodeIndex(idx as u32),
            position: n.position(),
        }));

        Self {
            nodes,
            edges,
            by_id,
            index,
        }
    }

    /// Classifies raw records and assembles them into a network.
    ///
    /// Two-way edge records produce an additional, reversed edge. Edges referring to
    /// unknown nodes are kept with the corresponding end unset; they are never traversed.
    /// Missing adjacency counts of nodes are computed from `raw_edges` before classification.
    pub fn build(
        mut raw_nodes: Vec<RawNode>,
        raw_edges: Vec<RawEdge>,
        options: &BuildOptions,
    ) -> Result<Self, IngestError> {
        fill_adjacent_edge_counts(&mut raw_nodes, &raw_edges);

        let mut nodes = raw_nodes
            .into_iter()
            .map(classify_node)
            .collect::<Result<Vec<_>, _>>()?;

        let by_id: HashMap<i64, NodeIndex> = nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id, NodeIndex(idx as u32)))
            .collect();

        let mut edges: Vec<Edge> = Vec::with_capacity(raw_edges.len());
        let mut dangling: usize = 0;

        for (record_idx, raw) in raw_edges.iter().enumerate() {
            let start = by_id.get(&raw.start_id).cloned();
            let end = by_id.get(&raw.end_id).cloned();
            if start.is_none() || end.is_none() {
                dangling += 1;
            }

            let edge = Self::classify_edge_record(record_idx, raw, start, end, options)?;
            let reverse = if raw.oneway {
                None
            } else {
                Some(edge.reversed())
            };

            for e in std::iter::once(edge).chain(reverse) {
                let edge_idx = EdgeIndex(edges.len() as u32);
                if let Some(from) = e.start {
                    nodes[from.index()].edges.push(edge_idx);
                }
                edges.push(e);
            }
        }

        if dangling > 0 {
            warn!("{dangling} edge record(s) refer to unknown nodes");
        }

        let network = Self::from_parts(nodes, edges);
        info!(
            "built road network with {} nodes and {} edges",
            network.len(),
            network.edge_count()
        );
        Ok(network)
    }

    fn classify_edge_record(
        record_idx: usize,
        raw: &RawEdge,
        start: Option<NodeIndex>,
        end: Option<NodeIndex>,
        options: &BuildOptions,
    ) -> Result<Edge, IngestError> {
        match classify_edge(raw, start, end) {
            Ok(edge) => Ok(edge),
            Err(source) if options.strict_speed_limits => Err(IngestError::Edge {
                index: record_idx,
                start_id: raw.start_id,
                end_id: raw.end_id,
                source,
            }),
            Err(source) => {
                warn!(
                    "edge #{record_idx} ({} -> {}): {source}, assuming {DEFAULT_MAX_SPEED}",
                    raw.start_id, raw.end_id
                );
                let fallback = RawEdge {
                    max_speed: None,
                    ..raw.clone()
                };
                classify_edge(&fallback, start, end).map_err(|source| IngestError::Edge {
                    index: record_idx,
                    start_id: raw.start_id,
                    end_id: raw.end_id,
                    source,
                })
            }
        }
    }

    /// Returns the number of nodes in the network.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of directed edges in the network.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Panics if `idx` doesn't come from this network.
    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Panics if `idx` doesn't come from this network.
    #[inline]
    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.edges[idx.index()]
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<&Node> {
        self.node_index(id).map(|idx| self.node(idx))
    }

    pub fn node_index(&self, id: i64) -> Option<NodeIndex> {
        self.by_id.get(&id).cloned()
    }

    /// Iterates over outgoing edges of a node, together with their indices.
    pub fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.node(idx)
            .edges
            .iter()
            .map(move |&e| (e, self.edge(e)))
    }

    /// Finds the [Node] closest to a projected position.
    ///
    /// Use [RoadNetwork::mercator] to project lon-lat positions first.
    /// The returned node might have no outgoing edges.
    pub fn nearest_node(&self, p: Point) -> Result<&Node, EmptyNetworkError> {
        self.index
            .as_ref()
            .map(|tree| self.node(tree.find_nearest(p).node))
            .ok_or(EmptyNetworkError)
    }

    /// Projects a lon-lat position onto the plane used by [RoadNetwork::nearest_node].
    #[inline]
    pub fn mercator(lon: f64, lat: f64) -> Point {
        project(lon, lat)
    }

    /// Inverse of [RoadNetwork::mercator].
    #[inline]
    pub fn unmercator(p: Point) -> (f64, f64) {
        unproject(p)
    }
}
