// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Traversal cost model: how long, in hours, it takes to drive
//! along an [Edge] and through the [Node] it leads into.

use crate::model::{Edge, Node};

pub const DEFAULT_LANES: u32 = 1;
pub const DEFAULT_LENGTH_MILES: f64 = 9_999_999.0;
pub const DEFAULT_SPEED_LIMIT_MPH: f64 = 25.0;
pub const DEFAULT_ROAD_TYPE: &str = "unknown";

/// Average vehicle length, in miles (about 19 feet).
pub const AVERAGE_VEHICLE_LENGTH: f64 = 0.0036;

/// Number of vehicle lengths occupied by a single car, including the gap to the next one.
pub const VEHICLE_SPACING: u64 = 3;

/// Predicted speeds never fall below this value (in mph), unless the speed limit itself does.
pub const MIN_SPEED_MPH: f64 = 15.0;

const MINUTE: f64 = 1.0 / 60.0;

/// Merged view of edge and destination node attributes.
///
/// `None` fields take the defaults documented on [TraversalAttributes::merge].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TraversalAttributes<'a> {
    pub causes_stops: Option<bool>,
    pub connections: Option<u32>,
    pub dead_end: Option<bool>,
    pub lanes: Option<u32>,
    pub length: Option<f64>,
    pub speed_limit: Option<f64>,
    pub road_type: Option<&'a str>,
}

impl<'a> TraversalAttributes<'a> {
    /// Combines the attributes of an edge with the attributes of the node it leads into.
    /// Node attributes take precedence.
    ///
    /// Missing values default to: no stops, 1 connection, not a dead end, 1 lane,
    /// 9,999,999 miles of length, 25 mph speed limit and an "unknown" road type.
    pub fn merge(edge: &'a Edge, node: &Node) -> Self {
        let mut attrs = match edge.road() {
            Some(road) => Self {
                lanes: Some(road.lanes),
                length: Some(road.length),
                speed_limit: Some(road.speed_limit),
                road_type: Some(road.road_type.as_str()),
                ..Self::default()
            },
            None => Self::default(),
        };

        let node_attrs = node.attributes();
        attrs.causes_stops = node_attrs.causes_stops.or(attrs.causes_stops);
        attrs.connections = node_attrs.connections.or(attrs.connections);
        attrs.dead_end = node_attrs.dead_end.or(attrs.dead_end);
        attrs
    }
}

/// Estimates the number of cars on a road of the given length, in a single lane.
/// Always at least 1.
pub fn cars_on_road(length: f64) -> u64 {
    let vehicles = (length / AVERAGE_VEHICLE_LENGTH).floor();
    // float → int casts saturate, so unmeasured segments stay finite
    ((vehicles as u64) / VEHICLE_SPACING).max(1)
}

/// Returns the time (in hours) necessary to traverse an edge into its destination node.
///
/// The same function weighs edges during route search and estimates the travel time
/// of a found path, so both always agree.
pub fn edge_traversal_cost(attrs: &TraversalAttributes<'_>) -> f64 {
    let causes_stops = attrs.causes_stops.unwrap_or(false);
    let lanes = attrs.lanes.unwrap_or(DEFAULT_LANES).max(1) as f64;
    let length = attrs.length.unwrap_or(DEFAULT_LENGTH_MILES);
    let speed_limit = attrs.speed_limit.unwrap_or(DEFAULT_SPEED_LIMIT_MPH);
    let road_type = attrs.road_type.unwrap_or(DEFAULT_ROAD_TYPE);

    let cars = cars_on_road(length);
    let cars_f = cars as f64;
    let stop_penalty = (2 * cars).max(1) as f64 * MINUTE;

    // Congestion: every extra car slows the traffic down
    let predicted = speed_limit - (cars_f - 1.0) / cars_f * speed_limit;
    let speed = (predicted / lanes).max(MIN_SPEED_MPH).min(speed_limit);
    let mut cost = length / speed;

    if causes_stops {
        cost += stop_penalty;
    }

    cost += match road_type {
        "stop" => stop_penalty,
        "traffic_signals" => 5.0 * MINUTE,
        "crossing" => MINUTE,
        _ => 0.0,
    };

    cost
}
