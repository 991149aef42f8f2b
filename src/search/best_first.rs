// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use log::debug;

use super::frontier::Frontier;
use super::path::{reconstruct_path, Path, Predecessors};
use super::SearchError;
use crate::cost::{edge_traversal_cost, TraversalAttributes};
use crate::geometry::{planar_distance, Point};
use crate::model::NodeIndex;
use crate::RoadNetwork;

/// Average speed (in mph) assumed over the remaining crow-flies distance
/// by the [A*](find_path_astar) heuristic.
///
/// Roads driven faster than this make the heuristic overestimate,
/// so [find_path_astar] may occasionally return a slightly slower route than
/// [find_path_ucs].
pub const HEURISTIC_SPEED_MPH: f64 = 30.0;

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the fastest route between two nodes (identified by their ids)
/// of the provided network.
///
/// Returns `Ok(None)` if there is no route between the two nodes.
pub fn find_path_astar(
    g: &RoadNetwork,
    from_id: i64,
    to_id: i64,
) -> Result<Option<Path>, SearchError> {
    let to_position = g
        .get_node(to_id)
        .ok_or(SearchError::InvalidReference(to_id))?
        .position();

    search(g, from_id, to_id, |at| {
        remaining_time_estimate(g.node(at).position(), to_position)
    })
}

/// Uses [uniform-cost search](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm#Practical_optimizations_and_infinite_graphs)
/// to find the fastest route between two nodes (identified by their ids)
/// of the provided network. Slower than [find_path_astar], but always optimal.
///
/// Returns `Ok(None)` if there is no route between the two nodes.
pub fn find_path_ucs(
    g: &RoadNetwork,
    from_id: i64,
    to_id: i64,
) -> Result<Option<Path>, SearchError> {
    search(g, from_id, to_id, |_| 0.0)
}

/// Time (in hours) to cover the crow-flies distance between two projected points
/// at [HEURISTIC_SPEED_MPH].
#[inline]
pub fn remaining_time_estimate(from: Point, to: Point) -> f64 {
    planar_distance(from, to) / HEURISTIC_SPEED_MPH
}

/// Best-first search with lazy deletion, shared by A* (`heuristic` estimating remaining
/// cost) and uniform-cost search (`heuristic` always zero).
fn search<H: Fn(NodeIndex) -> f64>(
    g: &RoadNetwork,
    from_id: i64,
    to_id: i64,
    heuristic: H,
) -> Result<Option<Path>, SearchError> {
    let from = g
        .node_index(from_id)
        .ok_or(SearchError::InvalidReference(from_id))?;
    let to = g
        .node_index(to_id)
        .ok_or(SearchError::InvalidReference(to_id))?;

    let mut frontier = Frontier::default();
    let mut best_cost: HashMap<NodeIndex, f64> = HashMap::default();
    let mut came_from: Predecessors = HashMap::default();
    let mut closed: HashSet<NodeIndex> = HashSet::default();
    let mut stale: usize = 0;

    best_cost.insert(from, 0.0);
    came_from.insert(from, (None, None));
    frontier.push(from, heuristic(from));

    while let Some(item) = frontier.pop() {
        if item.at == to {
            debug!(
                "route {from_id} -> {to_id}: found after expanding {} nodes ({stale} stale entries)",
                closed.len()
            );
            return Ok(Some(Path {
                elements: reconstruct_path(&came_from, to),
                cost: best_cost[&to],
            }));
        }

        // The same node might be in the frontier multiple times - only the first pop counts
        if !closed.insert(item.at) {
            stale += 1;
            continue;
        }

        let current_cost = best_cost[&item.at];

        for (edge_idx, edge) in g.outgoing(item.at) {
            // Skip edges leading to unknown nodes
            let Some(neighbor) = edge.end else {
                continue;
            };
            if closed.contains(&neighbor) {
                continue;
            }

            let neighbor_cost = current_cost
                + edge_traversal_cost(&TraversalAttributes::merge(edge, g.node(neighbor)));

            let improves = best_cost
                .get(&neighbor)
                .map_or(true, |&known| neighbor_cost < known);
            if !improves {
                continue;
            }

            best_cost.insert(neighbor, neighbor_cost);
            came_from.insert(neighbor, (Some(edge_idx), Some(item.at)));
            frontier.push(neighbor, neighbor_cost + heuristic(neighbor));
        }
    }

    debug!(
        "route {from_id} -> {to_id}: not found after expanding {} nodes",
        closed.len()
    );
    Ok(None)
}
