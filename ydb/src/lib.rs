//! YDB client SDK facade: a connection-pooled, discovery-aware driver plus
//! the topic reader/writer runtime, re-exported behind one crate so callers
//! depend on `ydb` rather than the individual `ydb-*` crates directly.

pub use ydb_driver::{Connection, ConnectionString, Driver, DriverConfig, DriverError, Endpoint, SecureOptions};

pub use ydb_gax::cancel::CancellationToken;
pub use ydb_gax::conn::{AcquireOptions, PoolError};
pub use ydb_gax::retry::{BackoffStrategy, RetryDecision, RetryError, RetryPredicate, RetrySetting};
pub use ydb_gax::status::{Issue, OperationStatus, Severity, Status, YdbError};

pub use ydb_auth::{CachingCredentials, CredentialsProvider, EnvCredentials, StaticCredentials, Token};

pub use ydb_value::{Dynamic, Type, Value, ValueError};

pub use ydb_topic::{
    AckStatus, Codec, CodecId, CodecRegistry, GarbageCollectionConfig, MessageState, OnCommittedOffset,
    OnPartitionSessionStart, OnPartitionSessionStop, PartitionSession, ReadOptions, ReadOutcome, ReaderConfig,
    SeqNoMode, StartOverride, TopicError, TopicMessage, TopicReader, TopicSelector, TopicWriter, Transaction,
    WriteAwaiter, WriteMessage, WriterConfig, MAX_PAYLOAD_SIZE,
};

/// Re-exports everything needed for a typical `topic` client, mirroring the
/// module each item actually lives in rather than flattening the crate.
pub mod prelude {
    pub use crate::{
        AcquireOptions, CancellationToken, Driver, DriverConfig, DriverError, ReadOptions, ReadOutcome,
        ReaderConfig, TopicError, TopicMessage, TopicReader, TopicSelector, TopicWriter, WriteMessage,
        WriterConfig,
    };
}
