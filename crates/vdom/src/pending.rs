//! Per-parent staging area for out-of-order structural inserts.
//!
//! A renderer assembling a new subtree may request "insert A before B"
//! while B itself is still pending insertion. Queues are keyed by the
//! anchor position in the parent's *realized* children (`Append` for no
//! anchor) and flushed once per poll, in ascending anchor order with
//! `Append` last.
//!
//! Resolution rule for `insert_before(child, before)` when `child` is
//! not realized:
//! 1. `before` realized at index `i` -> push `child` onto queue
//!    `Before(i)`.
//! 2. otherwise, the first queue containing `before` (in anchor order)
//!    receives `child` directly before `before`'s position.
//! 3. `before` found nowhere -> the parent has no such child.

use crate::node::NodeId;
use std::collections::BTreeMap;

/// Queue key: position in the realized children array that the queued
/// nodes are inserted before. Derived `Ord` sorts every `Before` ahead
/// of `Append`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InsertAnchor {
    Before(usize),
    Append,
}

/// Ordered multimap of pending inserts for one parent node.
#[derive(Clone, Debug, Default)]
pub struct PendingInserts {
    queues: BTreeMap<InsertAnchor, Vec<NodeId>>,
}

impl PendingInserts {
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Queue `child` for insertion before the realized child at `index`.
    pub fn queue_before(&mut self, index: usize, child: NodeId) {
        self.queues
            .entry(InsertAnchor::Before(index))
            .or_default()
            .push(child);
    }

    /// Queue `child` for appending after all realized children.
    pub fn queue_append(&mut self, child: NodeId) {
        self.queues
            .entry(InsertAnchor::Append)
            .or_default()
            .push(child);
    }

    /// Locate a queued node. Returns its anchor and position in queue
    /// order.
    pub fn find(&self, node: NodeId) -> Option<(InsertAnchor, usize)> {
        for (&anchor, queue) in &self.queues {
            if let Some(pos) = queue.iter().position(|&n| n == node) {
                return Some((anchor, pos));
            }
        }
        None
    }

    /// Nest `child` inside the queue holding `before`, directly before
    /// it. Returns false when `before` is in no queue.
    pub fn queue_before_pending(&mut self, before: NodeId, child: NodeId) -> bool {
        let Some((anchor, pos)) = self.find(before) else {
            return false;
        };
        // find() guarantees the queue exists.
        if let Some(queue) = self.queues.get_mut(&anchor) {
            queue.insert(pos, child);
        }
        true
    }

    /// Drain all queues in anchor order (`Append` last), preserving
    /// queue order within each anchor.
    pub fn drain(&mut self) -> Vec<(InsertAnchor, Vec<NodeId>)> {
        std::mem::take(&mut self.queues).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn append_anchor_sorts_last() {
        assert!(InsertAnchor::Before(0) < InsertAnchor::Append);
        assert!(InsertAnchor::Before(usize::MAX) < InsertAnchor::Append);
        assert!(InsertAnchor::Before(1) < InsertAnchor::Before(2));
    }

    #[test]
    fn drain_orders_anchors_ascending_with_append_last() {
        let mut pending = PendingInserts::default();
        pending.queue_append(id(9));
        pending.queue_before(2, id(5));
        pending.queue_before(0, id(1));
        pending.queue_before(0, id(2));

        let drained = pending.drain();
        assert_eq!(
            drained,
            vec![
                (InsertAnchor::Before(0), vec![id(1), id(2)]),
                (InsertAnchor::Before(2), vec![id(5)]),
                (InsertAnchor::Append, vec![id(9)]),
            ]
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn nests_before_a_pending_sibling() {
        let mut pending = PendingInserts::default();
        pending.queue_append(id(7));
        assert!(pending.queue_before_pending(id(7), id(6)));
        assert_eq!(
            pending.drain(),
            vec![(InsertAnchor::Append, vec![id(6), id(7)])]
        );
    }

    #[test]
    fn nesting_fails_for_unknown_anchor() {
        let mut pending = PendingInserts::default();
        pending.queue_before(1, id(3));
        assert!(!pending.queue_before_pending(id(4), id(6)));
        assert_eq!(pending.find(id(3)), Some((InsertAnchor::Before(1), 0)));
        assert_eq!(pending.find(id(4)), None);
    }
}
