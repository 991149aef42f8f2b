// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::geometry::{planar_distance, Point};
use crate::model::NodeIndex;

/// An entry of the [KDTree]: a node together with its projected position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub node: NodeIndex,
    pub position: Point,
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree)
/// over projected [Points](Point), answering exact nearest-neighbor queries
/// in expected logarithmic time.
///
/// All distances are euclidean on the projected plane, so queries must be projected
/// with [crate::geometry::project] first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KDTree {
    pivot: Entry,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the [Entry] closest to the given position.
    /// On ties, the entry encountered first wins.
    pub fn find_nearest(&self, p: Point) -> Entry {
        self.find_nearest_impl(p, false).0
    }

    fn find_nearest_impl(&self, p: Point, x_divides: bool) -> (Entry, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = planar_distance(p, best.position);

        // Select which branch to recurse into first
        let first_left = if x_divides {
            p.x < best.position.x
        } else {
            p.y < best.position.y
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_impl(p, !x_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer entry is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let dist_to_axis = if x_divides {
                (p.x - self.pivot.position.x).abs()
            } else {
                (p.y - self.pivot.position.y).abs()
            };

            if dist_to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_impl(p, !x_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Entries](Entry).
    /// Returns `None` if there are no entries.
    pub fn from_iter<I: IntoIterator<Item = Entry>>(entries: I) -> Option<Self> {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        Self::build(entries.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Entries](Entry). Entries will be reordered
    /// in the slice to facilitate building the tree.
    ///
    /// All positions must be finite.
    pub fn build(entries: &mut [Entry]) -> Option<Self> {
        debug_assert!(entries
            .iter()
            .all(|e| e.position.x.is_finite() && e.position.y.is_finite()));
        Self::build_impl(entries, false)
    }

    fn build_impl(entries: &mut [Entry], x_divides: bool) -> Option<Self> {
        match entries.len() {
            0 => None,
            1 => Some(Self {
                pivot: entries[0],
                left: None,
                right: None,
            }),
            _ => {
                // Node index as secondary key keeps the shape independent of input order
                if x_divides {
                    entries.sort_by(|a, b| {
                        a.position
                            .x
                            .total_cmp(&b.position.x)
                            .then(a.node.cmp(&b.node))
                    });
                } else {
                    entries.sort_by(|a, b| {
                        a.position
                            .y
                            .total_cmp(&b.position.y)
                            .then(a.node.cmp(&b.node))
                    });
                }
                let median = entries.len() / 2;
                let pivot = entries[median];
                let (left, right_and_pivot) = entries.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !x_divides).map(Box::new),
                    right: Self::build_impl(right, !x_divides).map(Box::new),
                })
            }
        }
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |b| b.len()) + self.right.as_ref().map_or(0, |b| b.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn entry(id: u32, x: f64, y: f64) -> Entry {
        Entry {
            node: NodeIndex(id),
            position: Point::new(x, y),
        }
    }

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut [
            entry(1, 0.01, 0.01),
            entry(2, 0.05, 0.01),
            entry(3, 0.09, 0.03),
            entry(4, 0.03, 0.04),
            entry(5, 0.07, 0.04),
            entry(6, 0.03, 0.07),
            entry(7, 0.01, 0.07),
            entry(8, 0.05, 0.08),
            entry(9, 0.09, 0.08),
        ])
        .expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.len(), 9);
        assert_eq!(tree.find_nearest(Point::new(0.02, 0.02)).node, NodeIndex(1));
        assert_eq!(tree.find_nearest(Point::new(0.03, 0.05)).node, NodeIndex(4));
        assert_eq!(tree.find_nearest(Point::new(0.08, 0.05)).node, NodeIndex(5));
        assert_eq!(tree.find_nearest(Point::new(0.06, 0.09)).node, NodeIndex(8));
    }

    #[test]
    fn empty() {
        assert!(KDTree::from_iter(std::iter::empty()).is_none());
    }

    #[test]
    fn single_entry_far_query() {
        let tree = KDTree::from_iter([entry(3, 1.0, 1.0)]).unwrap();
        assert_eq!(tree.find_nearest(Point::new(-500.0, 900.0)).node, NodeIndex(3));
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries: Vec<Entry> = (0..500)
            .map(|i| entry(i, rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
            .collect();
        let tree = KDTree::from_iter(entries.iter().cloned()).unwrap();

        for _ in 0..500 {
            let q = Point::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0));
            let found = tree.find_nearest(q);
            let best = entries
                .iter()
                .map(|e| planar_distance(q, e.position))
                .fold(f64::INFINITY, f64::min);
            assert_eq!(planar_distance(q, found.position), best);
        }
    }
}
