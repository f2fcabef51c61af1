//! [`TopicMessage`] and [`WriterMessage`] from section 3.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::CodecId;
use crate::session::PartitionSession;

/// A decoded read-side message. `alive()` mirrors the owning partition
/// session's flag rather than holding a weak/cyclic reference (section 9).
#[derive(Clone)]
pub struct TopicMessage {
    pub partition_session: Arc<PartitionSession>,
    pub producer_id: String,
    pub codec: CodecId,
    pub seq_no: u64,
    pub offset: i64,
    pub payload: Bytes,
    pub uncompressed_size: Option<i64>,
    pub created_at_ms: Option<i64>,
    pub written_at_ms: Option<i64>,
    pub metadata: HashMap<String, Vec<u8>>,
}

impl TopicMessage {
    pub fn alive(&self) -> bool {
        self.partition_session.is_alive()
    }

    pub fn partition_session_id(&self) -> i64 {
        self.partition_session.partition_session_id
    }
}

impl std::fmt::Debug for TopicMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicMessage")
            .field("partition_session_id", &self.partition_session_id())
            .field("seq_no", &self.seq_no)
            .field("offset", &self.offset)
            .field("payload_len", &self.payload.len())
            .field("alive", &self.alive())
            .finish()
    }
}

/// Where a [`WriterMessage`] sits in the writer's sliding window (section
/// 4.6): accepted-not-sent, sent-not-acked, or acked-awaiting-reclamation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageState {
    Buffered,
    Inflight,
    Garbage,
}

pub(crate) struct WriterMessage {
    pub seq_no: u64,
    /// Already-compressed bytes, tagged with the codec they were compressed
    /// with (below `minRawSize` this is [`CodecId::Raw`] regardless of the
    /// writer's configured codec — see `TopicWriter::write`).
    pub data: Bytes,
    pub codec: CodecId,
    pub created_at_ms: i64,
    pub metadata: HashMap<String, Vec<u8>>,
    pub uncompressed_size: i64,
    pub state: MessageState,
    pub ack: Option<tokio::sync::oneshot::Sender<Result<AckStatus, crate::error::TopicError>>>,
}

impl WriterMessage {
    /// Approximate wire weight used for the `bufferSize`/`inflightSize`/
    /// `garbageSize` counters: compressed payload plus metadata keys/values.
    pub fn byte_size(&self) -> i64 {
        let meta: usize = self.metadata.iter().map(|(k, v)| k.len() + v.len()).sum();
        (self.data.len() + meta) as i64
    }
}

/// The status a `WriteResponse` ack carries for one message.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AckStatus {
    /// The server already had this `(producerId, seqNo)` on record.
    Skipped,
    Written { offset: i64, partition_id: i64 },
    WrittenInTx,
}
