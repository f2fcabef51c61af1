//! Client-side errors the reader/writer runtime raises synchronously, as
//! opposed to a [`ydb_gax::status::YdbError`] surfaced through the stream
//! (section 7's "Client" bucket, plus "Commit" which wraps a `YdbError`).

use crate::writer::SeqNoMode;

#[derive(thiserror::Error, Debug)]
pub enum TopicError {
    #[error("message is not alive: its partition session ended or the stream reconnected since it was read")]
    DeadMessage,

    #[error("partition session {0} is no longer live")]
    DeadPartitionSession(i64),

    #[error("offsets passed to a single commit call must be strictly increasing; saw {prev} then {next}")]
    OutOfOrder { prev: i64, next: i64 },

    #[error("writer already committed to {0:?} sequence numbering; cannot mix modes on one writer")]
    SeqNoModeMismatch(SeqNoMode),

    #[error("manual seqNo must strictly increase; saw {prev} then {next}")]
    SeqNoNotIncreasing { prev: u64, next: u64 },

    #[error("payload of {size} bytes exceeds the maximum message size of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("no connection matches the requested preferences")]
    NoMatchingConnection,

    #[error("retry budget exhausted after {attempts} attempt(s)")]
    BudgetExhausted { attempts: u32 },

    #[error("unknown codec id {0}")]
    UnknownCodec(i32),

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Driver(#[from] ydb_driver::DriverError),

    #[error("commit failed: {0}")]
    Commit(#[source] ydb_gax::status::YdbError),

    #[error(transparent)]
    Stream(#[from] ydb_gax::status::YdbError),

    #[error("the operation was cancelled")]
    Cancelled,

    #[error("the stream reconnected before this operation completed")]
    Reconnecting,

    #[error("destroyed: {0}")]
    Destroyed(String),
}

impl Clone for TopicError {
    /// Pending commits/acks are rejected in bulk (reconnect, destroy); each
    /// waiter needs its own owned error, so the handful of variants that
    /// carry a non-`Clone` payload are collapsed to their message on clone.
    fn clone(&self) -> Self {
        match self {
            TopicError::DeadMessage => TopicError::DeadMessage,
            TopicError::DeadPartitionSession(id) => TopicError::DeadPartitionSession(*id),
            TopicError::OutOfOrder { prev, next } => TopicError::OutOfOrder { prev: *prev, next: *next },
            TopicError::SeqNoModeMismatch(m) => TopicError::SeqNoModeMismatch(*m),
            TopicError::SeqNoNotIncreasing { prev, next } => TopicError::SeqNoNotIncreasing { prev: *prev, next: *next },
            TopicError::PayloadTooLarge { size, max } => TopicError::PayloadTooLarge { size: *size, max: *max },
            TopicError::NoMatchingConnection => TopicError::NoMatchingConnection,
            TopicError::BudgetExhausted { attempts } => TopicError::BudgetExhausted { attempts: *attempts },
            TopicError::UnknownCodec(id) => TopicError::UnknownCodec(*id),
            TopicError::Codec(msg) => TopicError::Codec(msg.clone()),
            TopicError::Driver(e) => TopicError::Destroyed(e.to_string()),
            TopicError::Commit(e) => TopicError::Destroyed(e.to_string()),
            TopicError::Stream(e) => TopicError::Destroyed(e.to_string()),
            TopicError::Cancelled => TopicError::Cancelled,
            TopicError::Reconnecting => TopicError::Reconnecting,
            TopicError::Destroyed(reason) => TopicError::Destroyed(reason.clone()),
        }
    }
}
