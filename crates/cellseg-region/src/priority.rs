//! Priority ordering for flooding
//!
//! Every flooding algorithm pops pixels from a [`PriorityQueue`] keyed by a
//! grey value or a growing cost. The queue is a binary heap whose entries
//! carry a 64-bit insertion sequence: among equal priorities entries leave in
//! the order they were pushed, so watershed lines and region merges do not
//! depend on heap internals.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Direction in which a flood visits priorities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloodOrder {
    /// Lowest priority first (flood from the minima upward)
    #[default]
    Ascending,
    /// Highest priority first (flood from the maxima downward)
    Descending,
}

impl FloodOrder {
    /// The reverse direction.
    pub fn reversed(self) -> Self {
        match self {
            FloodOrder::Ascending => FloodOrder::Descending,
            FloodOrder::Descending => FloodOrder::Ascending,
        }
    }

    /// Whether `a` is processed strictly before `b`.
    #[inline]
    pub fn precedes<P: Ord>(self, a: P, b: P) -> bool {
        match self {
            FloodOrder::Ascending => a < b,
            FloodOrder::Descending => a > b,
        }
    }

    /// The flood level reached when the front at `front` spills into a pixel
    /// of value `value`: the level never moves back against the flood.
    #[inline]
    pub fn clamp<P: Ord>(self, front: P, value: P) -> P {
        match self {
            FloodOrder::Ascending => front.max(value),
            FloodOrder::Descending => front.min(value),
        }
    }

    /// Levels climbed by the flood from `from` to `to`, zero if `to` lies
    /// behind `from`.
    #[inline]
    pub fn rise(self, from: u32, to: u32) -> u32 {
        match self {
            FloodOrder::Ascending => to.saturating_sub(from),
            FloodOrder::Descending => from.saturating_sub(to),
        }
    }
}

#[derive(Debug)]
struct Entry<P, T> {
    priority: P,
    seq: u64,
    order: FloodOrder,
    item: T,
}

impl<P: Ord, T> PartialEq for Entry<P, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: Ord, T> Eq for Entry<P, T> {}

impl<P: Ord, T> PartialOrd for Entry<P, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Ord, T> Ord for Entry<P, T> {
    // BinaryHeap pops the greatest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        let by_priority = match self.order {
            FloodOrder::Ascending => other.priority.cmp(&self.priority),
            FloodOrder::Descending => self.priority.cmp(&other.priority),
        };
        by_priority.then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Insertion-stable priority queue
///
/// # Examples
///
/// ```
/// use cellseg_region::{FloodOrder, PriorityQueue};
///
/// let mut queue = PriorityQueue::new(FloodOrder::Ascending);
/// for (value, name) in [(3, "a"), (1, "b"), (2, "c"), (1, "d")] {
///     queue.push(value, name);
/// }
/// let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
/// assert_eq!(popped, vec![(1, "b"), (1, "d"), (2, "c"), (3, "a")]);
/// ```
#[derive(Debug)]
pub struct PriorityQueue<P, T> {
    heap: BinaryHeap<Entry<P, T>>,
    order: FloodOrder,
    next_seq: u64,
}

impl<P: Ord + Copy, T> PriorityQueue<P, T> {
    /// Create an empty queue popping in `order`.
    pub fn new(order: FloodOrder) -> Self {
        Self {
            heap: BinaryHeap::new(),
            order,
            next_seq: 0,
        }
    }

    /// Create an empty queue with room for `capacity` entries.
    pub fn with_capacity(order: FloodOrder, capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            order,
            next_seq: 0,
        }
    }

    /// The direction this queue pops in.
    pub fn order(&self) -> FloodOrder {
        self.order
    }

    /// Push `item` with `priority`.
    pub fn push(&mut self, priority: P, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            order: self.order,
            item,
        });
    }

    /// Pop the entry that comes first in flood order.
    pub fn pop(&mut self) -> Option<(P, T)> {
        self.heap.pop().map(|e| (e.priority, e.item))
    }

    /// Priority of the next entry to pop.
    pub fn peek_priority(&self) -> Option<P> {
        self.heap.peek().map(|e| e.priority)
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of pushes over the queue's lifetime.
    pub fn pushed(&self) -> u64 {
        self.next_seq
    }
}
