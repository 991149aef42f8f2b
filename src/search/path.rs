// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::cost::{edge_traversal_cost, TraversalAttributes};
use crate::model::{EdgeIndex, NodeIndex};
use crate::RoadNetwork;

/// Element of a [Path]: either a node, or an edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathElement {
    Node(NodeIndex),
    Edge(EdgeIndex),
}

/// Route found by [find_path_astar](crate::find_path_astar) or
/// [find_path_ucs](crate::find_path_ucs).
///
/// Elements alternate between nodes and edges, starting at the start node
/// and ending at the destination node: `[node, edge, node, ..., edge, node]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub elements: Vec<PathElement>,

    /// Total cost minimized by the search, in hours.
    pub cost: f64,
}

impl Path {
    /// Iterates over all nodes of the path, in order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Node(n) => Some(*n),
            PathElement::Edge(_) => None,
        })
    }

    /// Iterates over all edges of the path, in order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Edge(e) => Some(*e),
            PathElement::Node(_) => None,
        })
    }

    /// Returns the `[lon, lat]` polyline of the whole path, concatenating edge geometries.
    /// Edges without geometry contribute positions of their endpoints instead.
    pub fn geometry(&self, g: &RoadNetwork) -> Vec<[f64; 2]> {
        let mut coords: Vec<[f64; 2]> = Vec::default();
        for (i, element) in self.elements.iter().enumerate() {
            match *element {
                PathElement::Edge(e) if !g.edge(e).geometry.is_empty() => {
                    coords.extend_from_slice(&g.edge(e).geometry)
                }
                PathElement::Node(n) if self.node_needs_point(g, i) => {
                    let node = g.node(n);
                    coords.push([node.lon, node.lat]);
                }
                _ => {}
            }
        }
        coords.dedup();
        coords
    }

    fn node_needs_point(&self, g: &RoadNetwork, i: usize) -> bool {
        let has_geometry = |j: Option<usize>| match j.and_then(|j| self.elements.get(j)) {
            Some(PathElement::Edge(e)) => !g.edge(*e).geometry.is_empty(),
            _ => false,
        };
        !has_geometry(i.checked_sub(1)) || !has_geometry(Some(i + 1))
    }
}

/// Predecessor of a node on the best known route: the edge used to reach it
/// and the node that edge starts at. The start node maps to `(None, None)`.
pub(super) type Predecessors = HashMap<NodeIndex, (Option<EdgeIndex>, Option<NodeIndex>)>;

/// Walks the predecessor chain backwards from `last`, returning the
/// `node, edge, node, ...` sequence in start-to-destination order.
///
/// Walking stops at the first node without a complete predecessor entry,
/// which is normally the start node.
pub(super) fn reconstruct_path(came_from: &Predecessors, mut last: NodeIndex) -> Vec<PathElement> {
    let mut path = vec![PathElement::Node(last)];

    while let Some(&(Some(edge), Some(previous))) = came_from.get(&last) {
        path.push(PathElement::Edge(edge));
        path.push(PathElement::Node(previous));
        last = previous;
    }

    path.reverse();
    path
}

/// Estimates the time (in hours) necessary to drive along the given path,
/// by summing the [edge_traversal_cost] of every edge followed by a node.
pub fn path_time_estimate(g: &RoadNetwork, path: &[PathElement]) -> f64 {
    path.windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (PathElement::Edge(e), PathElement::Node(n)) => Some(edge_traversal_cost(
                &TraversalAttributes::merge(g.edge(e), g.node(n)),
            )),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstruct_chain() {
        let mut came_from = Predecessors::default();
        came_from.insert(NodeIndex(0), (None, None));
        came_from.insert(NodeIndex(1), (Some(EdgeIndex(10)), Some(NodeIndex(0))));
        came_from.insert(NodeIndex(2), (Some(EdgeIndex(11)), Some(NodeIndex(1))));

        assert_eq!(
            reconstruct_path(&came_from, NodeIndex(2)),
            vec![
                PathElement::Node(NodeIndex(0)),
                PathElement::Edge(EdgeIndex(10)),
                PathElement::Node(NodeIndex(1)),
                PathElement::Edge(EdgeIndex(11)),
                PathElement::Node(NodeIndex(2)),
            ]
        );
    }

    #[test]
    fn reconstruct_start_only() {
        let mut came_from = Predecessors::default();
        came_from.insert(NodeIndex(4), (None, None));
        assert_eq!(
            reconstruct_path(&came_from, NodeIndex(4)),
            vec![PathElement::Node(NodeIndex(4))]
        );
    }

    #[test]
    fn reconstruct_broken_chain() {
        let mut came_from = Predecessors::default();
        came_from.insert(NodeIndex(2), (Some(EdgeIndex(11)), Some(NodeIndex(1))));

        assert_eq!(
            reconstruct_path(&came_from, NodeIndex(2)),
            vec![
                PathElement::Node(NodeIndex(1)),
                PathElement::Edge(EdgeIndex(11)),
                PathElement::Node(NodeIndex(2)),
            ]
        );
    }

    #[test]
    fn path_accessors() {
        let path = Path {
            elements: vec![
                PathElement::Node(NodeIndex(0)),
                PathElement::Edge(EdgeIndex(3)),
                PathElement::Node(NodeIndex(1)),
            ],
            cost: 0.5,
        };
        assert_eq!(path.nodes().collect::<Vec<_>>(), vec![NodeIndex(0), NodeIndex(1)]);
        assert_eq!(path.edges().collect::<Vec<_>>(), vec![EdgeIndex(3)]);
    }
}
