// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{project, Point};

/// Free-form tags attached to a map node, e.g. `highway=traffic_signals`.
pub type Tags = HashMap<String, String>;

/// Position of a [Node] in the [RoadNetwork](crate::RoadNetwork) node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

/// Position of an [Edge] in the [RoadNetwork](crate::RoadNetwork) edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIndex(pub u32);

impl NodeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Variant of a [Node], decided once by the [classifier](crate::classify_node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Stop sign, traffic signals, crossing, give-way or roundabout - causes vehicles to stop.
    TrafficControl,

    /// Pure geometry point between two edges of the same road.
    ShapePoint,

    /// Intersection of three or more edges.
    Junction { connections: u32 },

    /// A node with a single adjacent edge. Never produced by [crate::classify_node].
    DeadEnd,

    /// Anything else.
    Plain,
}

/// Derived facts about a [Node] consumed by the [cost model](crate::cost).
/// `None` means "not recorded" - the cost model substitutes its defaults.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeAttributes {
    pub causes_stops: Option<bool>,
    pub connections: Option<u32>,
    pub dead_end: Option<bool>,
}

/// Represents a point of the road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub tags: Tags,
    pub kind: NodeKind,

    /// Outgoing edges, in order of graph assembly.
    /// Every edge listed here has `start` pointing back at this node.
    pub edges: Vec<EdgeIndex>,
}

impl Node {
    pub fn new(id: i64, lon: f64, lat: f64, tags: Tags, kind: NodeKind) -> Self {
        Self {
            id,
            lon,
            lat,
            tags,
            kind,
            edges: Vec::default(),
        }
    }

    /// Position of the node on the projected plane.
    #[inline]
    pub fn position(&self) -> Point {
        project(self.lon, self.lat)
    }

    pub fn attributes(&self) -> NodeAttributes {
        match self.kind {
            NodeKind::TrafficControl => NodeAttributes {
                causes_stops: Some(true),
                connections: None,
                dead_end: Some(false),
            },
            NodeKind::ShapePoint => NodeAttributes {
                causes_stops: Some(false),
                connections: None,
                dead_end: Some(false),
            },
            NodeKind::Junction { connections } => NodeAttributes {
                causes_stops: None,
                connections: Some(connections),
                dead_end: Some(false),
            },
            NodeKind::DeadEnd => NodeAttributes {
                causes_stops: None,
                connections: Some(1),
                dead_end: Some(true),
            },
            NodeKind::Plain => NodeAttributes::default(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            NodeKind::TrafficControl => "TrafficControl",
            NodeKind::ShapePoint => "ShapePoint",
            NodeKind::Junction { .. } => "Junction",
            NodeKind::DeadEnd => "DeadEnd",
            NodeKind::Plain => "Node",
        };
        write!(
            f,
            "{}(id: {}, lon: {}, lat: {}, edges: {})",
            kind,
            self.id,
            self.lon,
            self.lat,
            self.edges.len()
        )
    }
}

/// Traversal-relevant attributes of a drivable [Edge].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    /// Speed limit in miles per hour.
    pub speed_limit: f64,

    /// Number of lanes, at least 1.
    pub lanes: u32,

    pub oneway: bool,

    /// Highway category, e.g. "residential".
    pub road_type: String,

    /// Length in miles.
    pub length: f64,
}

/// Variant of an [Edge], decided once by the [classifier](crate::classify_edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    Road(Road),

    /// A non-drivable link, carrying geometry only.
    Plain,
}

/// Represents a directed connection between two [Nodes](Node).
///
/// Either end may be missing if the source data referenced an unknown node.
/// Such edges are kept for rendering, but are never traversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start: Option<NodeIndex>,
    pub end: Option<NodeIndex>,

    /// Polyline of `[lon, lat]` pairs.
    pub geometry: Vec<[f64; 2]>,

    pub kind: EdgeKind,
}

impl Edge {
    #[inline]
    pub fn road(&self) -> Option<&Road> {
        match &self.kind {
            EdgeKind::Road(road) => Some(road),
            EdgeKind::Plain => None,
        }
    }

    /// Returns a copy of this edge going in the opposite direction.
    /// The geometry is shared, as in the source data.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            geometry: self.geometry.clone(),
            kind: self.kind.clone(),
        }
    }
}
