//! The async priority queue primitive from section 4.7: single producer
//! (the reader/writer state machine), single consumer (the stream send
//! loop), FIFO within a priority, no backpressure on `push` (the caller
//! bounds queue growth via credit/inflight accounting). Grounded on the
//! `Notify`-gated readiness pattern used by [`ydb_driver::Driver::ready`]
//! generalized from a single boolean flag to a priority-ordered buffer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tokio::sync::{Mutex, Notify};

struct Entry<T> {
    priority: i32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    /// `BinaryHeap` is a max-heap; lower numeric `priority` must pop first
    /// (priority 0 = control frames), and within equal priority the
    /// earliest-pushed item must pop first (FIFO), so both fields are
    /// compared in reverse.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
    closed: bool,
}

pub struct PriorityQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Enqueues `item` at `priority` (lower sorts first). A push after
    /// `close()` is silently dropped: the caller is racing shutdown and
    /// there is no consumer left to deliver to.
    pub async fn push(&self, item: T, priority: i32) {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(Entry { priority, seq, item });
        drop(inner);
        self.notify.notify_one();
    }

    /// Pulls the highest-priority (lowest numeric value), oldest item.
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<T> {
        loop {
            {
                let mut inner = self.inner.lock().await;
                if let Some(entry) = inner.heap.pop() {
                    return Some(entry.item);
                }
                if inner.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Terminates the consumer side cleanly: any items already queued are
    /// still drained by `recv`, but no more are accepted and `recv` returns
    /// `None` once they're gone.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        drop(inner);
        self.notify.notify_waiters();
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn pops_higher_priority_first() {
        let q = PriorityQueue::new();
        q.push("data", 1).await;
        q.push("control", 0).await;
        assert_eq!(q.recv().await, Some("control"));
        assert_eq!(q.recv().await, Some("data"));
    }

    #[tokio::test]
    async fn fifo_within_same_priority() {
        let q = PriorityQueue::new();
        q.push(1, 0).await;
        q.push(2, 0).await;
        q.push(3, 0).await;
        assert_eq!(q.recv().await, Some(1));
        assert_eq!(q.recv().await, Some(2));
        assert_eq!(q.recv().await, Some(3));
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let q = Arc::new(PriorityQueue::new());
        q.push(1, 0).await;
        q.close().await;
        assert_eq!(q.recv().await, Some(1));
        assert_eq!(q.recv().await, None);
    }

    #[tokio::test]
    async fn recv_waits_for_a_push() {
        let q = Arc::new(PriorityQueue::new());
        let q2 = q.clone();
        let handle = tokio::spawn(async move { q2.recv().await });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        q.push("late", 0).await;
        assert_eq!(handle.await.unwrap(), Some("late"));
    }
}
