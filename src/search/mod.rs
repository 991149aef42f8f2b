// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod best_first;
mod error;
mod frontier;
mod path;

pub use best_first::{find_path_astar, find_path_ucs, remaining_time_estimate, HEURISTIC_SPEED_MPH};
pub use error::SearchError;
pub use path::{path_time_estimate, Path, PathElement};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{edge_traversal_cost, TraversalAttributes};
    use crate::geometry::{planar_distance, project, METERS_PER_MILE};
    use crate::model::{EdgeIndex, NodeIndex, Tags};
    use crate::raw::{RawEdge, RawNode};
    use crate::{BuildOptions, RoadNetwork};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn raw_node(id: i64, lon: f64, lat: f64) -> RawNode {
        RawNode {
            id,
            lon,
            lat,
            tags: Tags::default(),
            adjacent_edge_count: None,
        }
    }

    fn road(start_id: i64, end_id: i64, miles: f64, max_speed: &str, oneway: bool) -> RawEdge {
        RawEdge {
            start_id,
            end_id,
            highway_category: "residential".to_string(),
            max_speed: Some(max_speed.to_string()),
            lanes: None,
            oneway,
            length_meters: Some(miles * METERS_PER_MILE),
            geometry: vec![],
        }
    }

    /// A(0,0) → B(1,0) → C(2,0), one mile at 30 mph each
    fn line_network() -> RoadNetwork {
        RoadNetwork::build(
            vec![raw_node(1, 0.0, 0.0), raw_node(2, 1.0, 0.0), raw_node(3, 2.0, 0.0)],
            vec![road(1, 2, 1.0, "30 mph", true), road(2, 3, 1.0, "30 mph", true)],
            &BuildOptions::default(),
        )
        .unwrap()
    }

    fn check_path_shape(g: &RoadNetwork, path: &Path, from_id: i64, to_id: i64) {
        let first = path.elements.first().unwrap();
        let last = path.elements.last().unwrap();
        assert_eq!(*first, PathElement::Node(g.node_index(from_id).unwrap()));
        assert_eq!(*last, PathElement::Node(g.node_index(to_id).unwrap()));
        assert_eq!(path.elements.len() % 2, 1);

        for (i, pair) in path.elements.windows(2).enumerate() {
            match (pair[0], pair[1]) {
                (PathElement::Node(n), PathElement::Edge(e)) => {
                    assert_eq!(i % 2, 0);
                    assert_eq!(g.edge(e).start, Some(n));
                }
                (PathElement::Edge(e), PathElement::Node(n)) => {
                    assert_eq!(i % 2, 1);
                    assert_eq!(g.edge(e).end, Some(n));
                }
                _ => panic!("path elements don't alternate: {:?}", path.elements),
            }
        }
    }

    #[test]
    fn ucs_line() {
        let g = line_network();
        let path = find_path_ucs(&g, 1, 3).unwrap().expect("route must exist");

        let [a, b, c] = [1, 2, 3].map(|id| g.node_index(id).unwrap());
        assert_eq!(
            path.elements,
            vec![
                PathElement::Node(a),
                PathElement::Edge(EdgeIndex(0)),
                PathElement::Node(b),
                PathElement::Edge(EdgeIndex(1)),
                PathElement::Node(c),
            ]
        );
        assert!(path.cost.is_finite() && path.cost > 0.0);

        let expected = edge_traversal_cost(&TraversalAttributes::merge(
            g.edge(EdgeIndex(0)),
            g.node(b),
        )) + edge_traversal_cost(&TraversalAttributes::merge(
            g.edge(EdgeIndex(1)),
            g.node(c),
        ));
        assert_almost_eq!(path_time_estimate(&g, &path.elements), expected);
        assert_almost_eq!(path.cost, expected);
        assert_almost_eq!(expected, 2.0 / 15.0);
    }

    #[test]
    fn astar_line() {
        let g = line_network();
        let astar = find_path_astar(&g, 1, 3).unwrap().expect("route must exist");
        let ucs = find_path_ucs(&g, 1, 3).unwrap().expect("route must exist");
        assert_eq!(astar, ucs);
    }

    #[test]
    fn oneway_is_respected() {
        let g = line_network();
        assert_eq!(find_path_ucs(&g, 3, 1).unwrap(), None);
        assert_eq!(find_path_astar(&g, 3, 1).unwrap(), None);
    }

    #[test]
    fn same_start_and_destination() {
        let g = line_network();
        let path = find_path_ucs(&g, 2, 2).unwrap().unwrap();
        assert_eq!(path.elements, vec![PathElement::Node(g.node_index(2).unwrap())]);
        assert_eq!(path.cost, 0.0);
        assert_eq!(path_time_estimate(&g, &path.elements), 0.0);
    }

    #[test]
    fn invalid_reference() {
        let g = line_network();
        assert_eq!(find_path_ucs(&g, 1, 42), Err(SearchError::InvalidReference(42)));
        assert_eq!(find_path_ucs(&g, 42, 1), Err(SearchError::InvalidReference(42)));
        assert_eq!(find_path_astar(&g, 1, 42), Err(SearchError::InvalidReference(42)));
        assert_eq!(find_path_astar(&g, 42, 1), Err(SearchError::InvalidReference(42)));
    }

    #[test]
    fn far_query_snaps_to_dead_node() {
        let g = line_network();
        let start = g.nearest_node(RoadNetwork::mercator(10.0, 0.0)).unwrap();
        assert_eq!(start.id, 3);
        assert!(start.edges.is_empty());
        assert_eq!(find_path_ucs(&g, start.id, 1).unwrap(), None);
        assert_eq!(find_path_astar(&g, start.id, 1).unwrap(), None);
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let g = RoadNetwork::build(
            vec![raw_node(1, 0.0, 0.0), raw_node(2, 0.01, 0.0)],
            vec![road(1, 99, 0.1, "30 mph", true), road(1, 2, 1.0, "30 mph", true)],
            &BuildOptions::default(),
        )
        .unwrap();
        let path = find_path_ucs(&g, 1, 2).unwrap().unwrap();
        assert_eq!(path.edges().collect::<Vec<_>>(), vec![EdgeIndex(1)]);
    }

    #[test]
    fn prefers_faster_detour() {
        //   1 ──(slow, stop)── 4
        //   │                  │
        //   2 ────────────────-3
        let mut stop = raw_node(4, 0.02, 0.0);
        stop.tags.insert("highway".into(), "stop".into());
        let g = RoadNetwork::build(
            vec![
                raw_node(1, 0.0, 0.0),
                raw_node(2, 0.0, -0.01),
                raw_node(3, 0.02, -0.01),
                stop,
                raw_node(5, 0.03, 0.0),
            ],
            vec![
                road(1, 4, 0.5, "30 mph", false),
                road(4, 5, 0.01, "30 mph", false),
                road(1, 2, 0.01, "30 mph", false),
                road(2, 3, 0.01, "30 mph", false),
                road(3, 5, 0.01, "30 mph", false),
            ],
            &BuildOptions::default(),
        )
        .unwrap();

        for path in [
            find_path_ucs(&g, 1, 5).unwrap().unwrap(),
            find_path_astar(&g, 1, 5).unwrap().unwrap(),
        ] {
            check_path_shape(&g, &path, 1, 5);
            let ids: Vec<i64> = path.nodes().map(|n| g.node(n).id).collect();
            assert_eq!(ids, vec![1, 2, 3, 5]);
        }
    }

    /// Builds a random network near the equator, where projected distances
    /// are close to true distances. Every edge is at least `stretch` times
    /// longer than the crow-flies distance between its ends.
    fn random_network(seed: u64, speeds: &[&str], stretch: f64) -> RoadNetwork {
        let mut rng = StdRng::seed_from_u64(seed);
        let nodes: Vec<RawNode> = (1..=40)
            .map(|id| {
                let mut n = raw_node(id, rng.gen_range(0.0..0.05), rng.gen_range(0.0..0.05));
                if rng.gen_bool(0.1) {
                    n.tags.insert("highway".into(), "traffic_signals".into());
                }
                n
            })
            .collect();

        let edges: Vec<RawEdge> = (0..120)
            .map(|_| {
                let a = &nodes[rng.gen_range(0..nodes.len())];
                let b = &nodes[rng.gen_range(0..nodes.len())];
                let miles = planar_distance(project(a.lon, a.lat), project(b.lon, b.lat)) * stretch;
                let speed = speeds[rng.gen_range(0..speeds.len())];
                road(a.id, b.id, miles, speed, rng.gen_bool(0.3))
            })
            .collect();

        RoadNetwork::build(nodes, edges, &BuildOptions::default()).unwrap()
    }

    /// Reference shortest-path costs from a single source (Bellman-Ford).
    fn reference_costs(g: &RoadNetwork, from_id: i64) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; g.len()];
        dist[g.node_index(from_id).unwrap().index()] = 0.0;

        for _ in 0..g.len() {
            for e in g.edges() {
                if let (Some(s), Some(t)) = (e.start, e.end) {
                    let w = edge_traversal_cost(&TraversalAttributes::merge(e, g.node(t)));
                    if dist[s.index()] + w < dist[t.index()] {
                        dist[t.index()] = dist[s.index()] + w;
                    }
                }
            }
        }
        dist
    }

    #[test]
    fn ucs_is_optimal() {
        for seed in 0..5 {
            let g = random_network(seed, &["25 mph", "30 mph", "45 mph", "65 mph"], 1.2);
            let reference = reference_costs(&g, 1);

            for to_id in 1..=40 {
                let expected = reference[g.node_index(to_id).unwrap().index()];
                match find_path_ucs(&g, 1, to_id).unwrap() {
                    Some(path) => {
                        check_path_shape(&g, &path, 1, to_id);
                        assert!((path.cost - expected).abs() < 1e-9);
                        assert!((path_time_estimate(&g, &path.elements) - path.cost).abs() < 1e-9);
                    }
                    None => assert!(expected.is_infinite()),
                }
            }
        }
    }

    #[test]
    fn astar_never_beats_ucs() {
        for seed in 10..15 {
            let g = random_network(seed, &["45 mph", "65 mph", "70 mph"], 1.0);

            for to_id in 1..=40 {
                let ucs = find_path_ucs(&g, 1, to_id).unwrap();
                let astar = find_path_astar(&g, 1, to_id).unwrap();
                match (ucs, astar) {
                    (Some(ucs), Some(astar)) => {
                        check_path_shape(&g, &astar, 1, to_id);
                        assert!(astar.cost >= ucs.cost - 1e-12);
                    }
                    (None, None) => {}
                    (ucs, astar) => panic!("reachability differs: {ucs:?} vs {astar:?}"),
                }
            }
        }
    }

    #[test]
    fn astar_matches_ucs_with_admissible_heuristic() {
        // With speed limits not above the heuristic speed and edges longer than
        // the crow-flies distance, the heuristic never overestimates
        for seed in 20..25 {
            let g = random_network(seed, &["15 mph", "25 mph", "30 mph"], 1.5);

            for to_id in 1..=40 {
                let ucs = find_path_ucs(&g, 1, to_id).unwrap();
                let astar = find_path_astar(&g, 1, to_id).unwrap();
                match (ucs, astar) {
                    (Some(ucs), Some(astar)) => assert_almost_eq!(astar.cost, ucs.cost),
                    (None, None) => {}
                    (ucs, astar) => panic!("reachability differs: {ucs:?} vs {astar:?}"),
                }
            }
        }
    }

    #[test]
    fn searches_are_reproducible() {
        let g = random_network(99, &["25 mph", "65 mph"], 1.0);
        for to_id in 1..=40 {
            assert_eq!(
                find_path_astar(&g, 1, to_id).unwrap(),
                find_path_astar(&g, 1, to_id).unwrap()
            );
            assert_eq!(
                find_path_ucs(&g, 1, to_id).unwrap(),
                find_path_ucs(&g, 1, to_id).unwrap()
            );
        }
    }

    #[test]
    fn path_geometry() {
        let mut edge = road(1, 2, 1.0, "30 mph", true);
        edge.geometry = vec![[0.0, 0.0], [0.005, 0.001], [0.01, 0.0]];
        let g = RoadNetwork::build(
            vec![raw_node(1, 0.0, 0.0), raw_node(2, 0.01, 0.0), raw_node(3, 0.02, 0.0)],
            vec![edge, road(2, 3, 1.0, "30 mph", true)],
            &BuildOptions::default(),
        )
        .unwrap();

        let path = find_path_ucs(&g, 1, 3).unwrap().unwrap();
        assert_eq!(
            path.geometry(&g),
            vec![[0.0, 0.0], [0.005, 0.001], [0.01, 0.0], [0.02, 0.0]]
        );
        assert_eq!(path.nodes().count(), 3);
        assert_eq!(path.nodes().next(), Some(NodeIndex(0)));
    }
}
