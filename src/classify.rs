// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::geometry::METERS_PER_MILE;
use crate::model::{Edge, EdgeKind, Node, NodeIndex, NodeKind, Road};
use crate::raw::{RawEdge, RawNode};

/// Values of the `highway` node tag which indicate a [NodeKind::TrafficControl].
pub const TRAFFIC_CONTROL_VALUES: &[&str] =
    &["traffic_signals", "stop", "crossing", "give_way", "roundabout"];

/// Highway categories of edges which can be driven on, and thus become [Roads](Road).
pub const DRIVABLE_HIGHWAYS: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "residential",
    "unclassified",
    "service",
    "living_street",
    "services",
];

/// Speed limit assumed for roads without (or with an empty) `max_speed`.
pub const DEFAULT_MAX_SPEED: &str = "25 mph";

/// Length assumed for roads without a known length, in meters.
/// Deliberately huge, so that unmeasured segments are avoided.
pub const DEFAULT_LENGTH_METERS: f64 = 9_999_999.0;

/// A structured attribute (currently only a speed limit) could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid speed limit: {0:?}")]
pub struct ParseError(pub String);

/// A raw record could not be turned into a [Node] or an [Edge].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("node {id}: {reason}")]
    Node { id: i64, reason: &'static str },

    #[error("edge #{index} ({start_id} -> {end_id}): {source}")]
    Edge {
        index: usize,
        start_id: i64,
        end_id: i64,
        #[source]
        source: ParseError,
    },
}

/// Turns a raw node record into a typed [Node].
///
/// Rules, in order of priority:
/// 1. `highway` tag of a traffic control value → [NodeKind::TrafficControl],
/// 2. no tags and exactly 2 adjacent edges → [NodeKind::ShapePoint],
/// 3. 3 or more adjacent edges → [NodeKind::Junction],
/// 4. otherwise → [NodeKind::Plain].
///
/// Nodes with a single adjacent edge are not promoted to [NodeKind::DeadEnd].
pub fn classify_node(raw: RawNode) -> Result<Node, IngestError> {
    if !raw.lon.is_finite() || !raw.lat.is_finite() {
        return Err(IngestError::Node {
            id: raw.id,
            reason: "non-finite coordinates",
        });
    }
    if raw.lat.abs() >= 90.0 {
        return Err(IngestError::Node {
            id: raw.id,
            reason: "latitude outside of the projectable range",
        });
    }

    let kind = node_kind(&raw);
    Ok(Node::new(raw.id, raw.lon, raw.lat, raw.tags, kind))
}

fn node_kind(raw: &RawNode) -> NodeKind {
    let adjacent = raw.adjacent_edge_count.unwrap_or(0);
    let highway = raw.tags.get("highway").map(|v| v.as_str()).unwrap_or("");

    if TRAFFIC_CONTROL_VALUES.contains(&highway) {
        NodeKind::TrafficControl
    } else if raw.tags.is_empty() && adjacent == 2 {
        NodeKind::ShapePoint
    } else if adjacent >= 3 {
        NodeKind::Junction {
            connections: adjacent,
        }
    } else {
        NodeKind::Plain
    }
}

/// Turns a raw edge record into a typed [Edge] between `start` and `end`.
///
/// Only the requested direction is produced; creating the reverse twin
/// of a two-way record is the caller's responsibility.
pub fn classify_edge(
    raw: &RawEdge,
    start: Option<NodeIndex>,
    end: Option<NodeIndex>,
) -> Result<Edge, ParseError> {
    let kind = if DRIVABLE_HIGHWAYS.contains(&raw.highway_category.as_str()) {
        let max_speed = match raw.max_speed.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => DEFAULT_MAX_SPEED,
        };

        EdgeKind::Road(Road {
            speed_limit: parse_speed_limit(max_speed)?,
            lanes: raw.lanes.unwrap_or(1).max(1),
            oneway: raw.oneway,
            road_type: raw.highway_category.clone(),
            length: raw.length_meters.unwrap_or(DEFAULT_LENGTH_METERS) / METERS_PER_MILE,
        })
    } else {
        EdgeKind::Plain
    };

    Ok(Edge {
        start,
        end,
        geometry: raw.geometry.clone(),
        kind,
    })
}

/// Parses a "<number> <unit>" speed limit into miles per hour.
///
/// The unit is always assumed to be `mph`, whatever the second token says.
/// Strings of any other shape, and non-positive or non-finite numbers, are a [ParseError].
pub fn parse_speed_limit(text: &str) -> Result<f64, ParseError> {
    let err = || ParseError(text.to_string());

    let mut parts = text.split_whitespace();
    let value = match (parts.next(), parts.next(), parts.next()) {
        (Some(value), Some(_unit), None) => value,
        _ => return Err(err()),
    };

    let value: f64 = value.parse().map_err(|_| err())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(err());
    }
    Ok(value)
}

/// Counts, for every node id, how many raw edges start or end at it.
/// A self-loop counts once.
pub fn count_adjacent_edges<'a, I>(edges: I) -> HashMap<i64, u32>
where
    I: IntoIterator<Item = &'a RawEdge>,
{
    let mut counts: HashMap<i64, u32> = HashMap::default();
    for e in edges {
        *counts.entry(e.start_id).or_default() += 1;
        if e.end_id != e.start_id {
            *counts.entry(e.end_id).or_default() += 1;
        }
    }
    counts
}

/// Sets the missing adjacency counts of `nodes` from the edge table.
///
/// Only edges between two of the provided nodes are counted, so edges leading
/// to filtered-out or unknown nodes don't turn their other end into a junction.
/// Counts already present are kept as-is.
pub fn fill_adjacent_edge_counts(nodes: &mut [RawNode], edges: &[RawEdge]) {
    if nodes.iter().all(|n| n.adjacent_edge_count.is_some()) {
        return;
    }

    let known: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
    let counts = count_adjacent_edges(
        edges
            .iter()
            .filter(|e| known.contains(&e.start_id) && known.contains(&e.end_id)),
    );

    for n in nodes.iter_mut() {
        if n.adjacent_edge_count.is_none() {
            n.adjacent_edge_count = Some(counts.get(&n.id).cloned().unwrap_or(0));
        }
    }
}
