//! The topic reader: a resumable `StreamRead` state machine with
//! partition-session tracking, credit-based flow control, and ordered
//! commit bookkeeping (section 4.5).

mod reader;

pub use reader::{ReadOptions, ReadOutcome, TopicReader};

use std::sync::Arc;
use std::time::Duration;

use crate::codec::CodecRegistry;
use crate::session::PartitionSession;

/// One topic (or partition subset of one) to attach a reader to (section 6:
/// `topic: string | list of {path, partitionIds?, maxLag?, readFrom?}`).
#[derive(Clone, Debug)]
pub struct TopicSelector {
    pub path: String,
    pub partition_ids: Vec<i64>,
    pub max_lag_ms: i64,
    pub read_from_ms: i64,
}

impl TopicSelector {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            partition_ids: Vec::new(),
            max_lag_ms: 0,
            read_from_ms: 0,
        }
    }
}

/// Returned by `onPartitionSessionStart` to override the server's proposed
/// read/commit offsets (section 4.5's `StartPartitionSessionRequest` row).
#[derive(Clone, Copy, Debug, Default)]
pub struct StartOverride {
    pub read_offset: Option<i64>,
    pub commit_offset: Option<i64>,
}

pub type OnPartitionSessionStart =
    Arc<dyn Fn(&Arc<PartitionSession>, i64, (i64, i64)) -> StartOverride + Send + Sync>;
pub type OnPartitionSessionStop = Arc<dyn Fn(&Arc<PartitionSession>, i64) + Send + Sync>;
pub type OnCommittedOffset = Arc<dyn Fn(&Arc<PartitionSession>, i64) + Send + Sync>;

/// Reader configuration (section 6).
#[derive(Clone)]
pub struct ReaderConfig {
    pub topics: Vec<TopicSelector>,
    pub consumer: String,
    pub max_buffer_bytes: i64,
    pub update_token_interval: Duration,
    pub graceful_shutdown_timeout: Duration,
    pub codecs: CodecRegistry,
    pub on_partition_session_start: Option<OnPartitionSessionStart>,
    pub on_partition_session_stop: Option<OnPartitionSessionStop>,
    pub on_committed_offset: Option<OnCommittedOffset>,
    /// Transactional variant (section 4.5): skip `CommitOffsetRequest` and
    /// track per-partition read offsets for `UpdateOffsetsInTransaction`
    /// instead.
    pub transactional: bool,
}

impl ReaderConfig {
    pub fn new(consumer: impl Into<String>, topics: Vec<TopicSelector>) -> Self {
        Self {
            topics,
            consumer: consumer.into(),
            max_buffer_bytes: 4 * 1024 * 1024,
            update_token_interval: Duration::from_secs(60),
            graceful_shutdown_timeout: Duration::from_secs(30),
            codecs: CodecRegistry::new(),
            on_partition_session_start: None,
            on_partition_session_stop: None,
            on_committed_offset: None,
            transactional: false,
        }
    }
}
