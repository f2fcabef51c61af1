//! [`PartitionSession`] and [`PendingCommit`] from section 3. The "weak
//! reference from message to partition session" design note is implemented
//! as section 9 recommends: no weak handles, just a shared `alive` flag the
//! session flips when it dies non-gracefully, observed by every
//! [`crate::message::TopicMessage`] still pointing at it.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Lifecycle state of a [`PartitionSession`] (section 3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Active,
    /// A graceful `StopPartitionSessionRequest` is in flight; pending
    /// commits are still being drained.
    Stopping,
    /// `EndPartitionSession` received: no more messages will arrive, but
    /// outstanding commits are still expected to be serviced.
    Ended,
    /// Removed from the reader's session map; no longer usable.
    Stopped,
}

/// Server-assigned identity for one reader's view of one partition.
///
/// Invariant: `committed_offset <= next_commit_start_offset <= end_offset`.
pub struct PartitionSession {
    pub partition_session_id: i64,
    pub partition_id: i64,
    pub topic_path: String,
    pub start_offset: i64,
    pub end_offset: i64,
    next_commit_start_offset: AtomicI64,
    committed_offset: AtomicI64,
    state: RwLock<SessionState>,
    /// Flips to `false` when this session terminates non-gracefully;
    /// every [`crate::message::TopicMessage`] built from it shares this
    /// flag instead of holding a cyclic/weak reference.
    alive: AtomicBool,
}

impl PartitionSession {
    pub fn new(partition_session_id: i64, partition_id: i64, topic_path: String, committed_offset: i64, start_offset: i64, end_offset: i64) -> Arc<Self> {
        Arc::new(Self {
            partition_session_id,
            partition_id,
            topic_path,
            start_offset,
            end_offset,
            next_commit_start_offset: AtomicI64::new(committed_offset),
            committed_offset: AtomicI64::new(committed_offset),
            state: RwLock::new(SessionState::Active),
            alive: AtomicBool::new(true),
        })
    }

    pub fn next_commit_start_offset(&self) -> i64 {
        self.next_commit_start_offset.load(Ordering::Acquire)
    }

    pub fn set_next_commit_start_offset(&self, value: i64) {
        self.next_commit_start_offset.store(value, Ordering::Release);
    }

    pub fn committed_offset(&self) -> i64 {
        self.committed_offset.load(Ordering::Acquire)
    }

    pub fn set_committed_offset(&self, value: i64) {
        self.committed_offset.store(value, Ordering::Release);
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Flipped by the reader on a non-graceful stop, a stream reconnect, or
    /// `destroy()`: every message built from this session becomes dead.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for PartitionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionSession")
            .field("partition_session_id", &self.partition_session_id)
            .field("partition_id", &self.partition_id)
            .field("topic_path", &self.topic_path)
            .field("next_commit_start_offset", &self.next_commit_start_offset())
            .field("committed_offset", &self.committed_offset())
            .field("state", &self.state())
            .finish()
    }
}

/// A user-visible completion awaiting a server-acknowledged commit, held in
/// a per-partition FIFO and resolved when `committedOffset >= upper_offset`.
pub struct PendingCommit {
    pub partition_session_id: i64,
    pub upper_offset: i64,
    pub resolve: tokio::sync::oneshot::Sender<Result<(), crate::error::TopicError>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_fill_commit_range_uses_next_commit_start_offset() {
        let session = PartitionSession::new(1, 0, "/topic".into(), 0, 0, 1000);
        assert_eq!(session.next_commit_start_offset(), 0);
        session.set_next_commit_start_offset(30);
        assert_eq!(session.next_commit_start_offset(), 30);
        assert_eq!(session.committed_offset(), 0);
    }

    #[test]
    fn kill_flips_alive_for_every_observer() {
        let session = PartitionSession::new(1, 0, "/topic".into(), 0, 0, 1000);
        assert!(session.is_alive());
        session.kill();
        assert!(!session.is_alive());
    }
}
