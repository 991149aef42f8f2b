// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::NodeIndex;

#[derive(Debug, Clone, Copy)]
pub(super) struct FrontierItem {
    pub(super) priority: f64,
    pub(super) seq: u64,
    pub(super) at: NodeIndex,
}

impl PartialEq for FrontierItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierItem {}

impl PartialOrd for FrontierItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower priorities (and earlier insertions) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of nodes to expand, breaking ties by insertion order.
///
/// Entries are never updated in place; a node whose priority improves is pushed again,
/// and outdated entries are discarded by the caller when popped.
#[derive(Debug, Default)]
pub(super) struct Frontier {
    heap: BinaryHeap<FrontierItem>,
    next_seq: u64,
}

impl Frontier {
    pub(super) fn push(&mut self, at: NodeIndex, priority: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(FrontierItem { priority, seq, at });
    }

    pub(super) fn pop(&mut self) -> Option<FrontierItem> {
        self.heap.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_priority_first() {
        let mut f = Frontier::default();
        f.push(NodeIndex(1), 3.0);
        f.push(NodeIndex(2), 1.0);
        f.push(NodeIndex(3), 2.0);

        assert_eq!(f.pop().unwrap().at, NodeIndex(2));
        assert_eq!(f.pop().unwrap().at, NodeIndex(3));
        assert_eq!(f.pop().unwrap().at, NodeIndex(1));
        assert!(f.pop().is_none());
    }

    #[test]
    fn ties_broken_by_insertion_order() {
        let mut f = Frontier::default();
        f.push(NodeIndex(9), 1.0);
        f.push(NodeIndex(3), 1.0);
        f.push(NodeIndex(5), 0.5);
        f.push(NodeIndex(1), 1.0);

        let order: Vec<_> = std::iter::from_fn(|| f.pop()).map(|i| i.at).collect();
        assert_eq!(
            order,
            vec![NodeIndex(5), NodeIndex(9), NodeIndex(3), NodeIndex(1)]
        );
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut f = Frontier::default();
        f.push(NodeIndex(1), 2.0);
        f.push(NodeIndex(1), 1.0);
        let first = f.pop().unwrap();
        let second = f.pop().unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 0);
    }
}
