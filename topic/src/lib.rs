//! Topic reader and writer runtime: resumable `StreamRead`/`StreamWrite`
//! protocols built over [`ydb_driver::Driver`]'s connection pool, with
//! credit-based flow control on the read side and a buffered/inflight/
//! garbage sliding window on the write side.

pub mod codec;
pub mod error;
pub mod message;
pub mod queue;
pub mod reader;
pub mod session;
pub mod transaction;
pub mod writer;

mod wire;

pub use codec::{Codec, CodecId, CodecRegistry};
pub use error::TopicError;
pub use message::{AckStatus, MessageState, TopicMessage};
pub use reader::{
    OnCommittedOffset, OnPartitionSessionStart, OnPartitionSessionStop, ReadOptions, ReadOutcome, ReaderConfig,
    StartOverride, TopicReader, TopicSelector,
};
pub use session::PartitionSession;
pub use transaction::Transaction;
pub use writer::{GarbageCollectionConfig, SeqNoMode, TopicWriter, WriteAwaiter, WriteMessage, WriterConfig, MAX_PAYLOAD_SIZE};
