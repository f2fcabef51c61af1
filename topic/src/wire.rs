//! Conversions between the hand-written `Ydb.Topic` wire types and the
//! gax error/status model, shared by the reader and writer state machines.

use ydb_gax::status::{Issue, OperationStatus, Severity, Status, YdbError};
use ydb_proto::issue::{IssueMessage, Severity as PSeverity, StatusCode};
use ydb_proto::topic::Codec as CodecId;

/// Builds a [`YdbError`] from a `StreamRead`/`StreamWrite` frame's
/// `status`/`issues` fields, the in-band equivalent of a failed unary call.
pub(crate) fn ydb_error_from_frame(status: i32, issues: &[IssueMessage]) -> YdbError {
    let op_status = map_status_code(status);
    let code = match op_status {
        OperationStatus::Success => tonic::Code::Ok,
        OperationStatus::Aborted => tonic::Code::Aborted,
        OperationStatus::Overloaded => tonic::Code::ResourceExhausted,
        OperationStatus::Unavailable => tonic::Code::Unavailable,
        OperationStatus::BadSession
        | OperationStatus::SessionBusy
        | OperationStatus::SessionExpired
        | OperationStatus::SchemaError
        | OperationStatus::GenericError => tonic::Code::Unknown,
        OperationStatus::Undetermined => tonic::Code::Unknown,
        OperationStatus::Timeout => tonic::Code::DeadlineExceeded,
        OperationStatus::Cancelled => tonic::Code::Cancelled,
        OperationStatus::NotFound => tonic::Code::NotFound,
        OperationStatus::PreconditionFailed => tonic::Code::FailedPrecondition,
        OperationStatus::Unauthorized => tonic::Code::PermissionDenied,
        OperationStatus::Unauthenticated => tonic::Code::Unauthenticated,
        OperationStatus::InternalError => tonic::Code::Internal,
    };
    let tonic_status = tonic::Status::new(code, format!("YDB status {:?}", op_status));
    let issues = issues.iter().map(issue_from_proto).collect();
    YdbError::new(Status::from(tonic_status), issues).with_operation_status(op_status)
}

fn map_status_code(code: i32) -> OperationStatus {
    match code {
        x if x == StatusCode::Success as i32 => OperationStatus::Success,
        x if x == StatusCode::Aborted as i32 => OperationStatus::Aborted,
        x if x == StatusCode::Unavailable as i32 => OperationStatus::Unavailable,
        x if x == StatusCode::Overloaded as i32 => OperationStatus::Overloaded,
        x if x == StatusCode::BadSession as i32 => OperationStatus::BadSession,
        x if x == StatusCode::SessionBusy as i32 => OperationStatus::SessionBusy,
        x if x == StatusCode::SessionExpired as i32 => OperationStatus::SessionExpired,
        x if x == StatusCode::Undetermined as i32 => OperationStatus::Undetermined,
        x if x == StatusCode::Timeout as i32 => OperationStatus::Timeout,
        x if x == StatusCode::Cancelled as i32 => OperationStatus::Cancelled,
        x if x == StatusCode::SchemeError as i32 => OperationStatus::SchemaError,
        x if x == StatusCode::NotFound as i32 => OperationStatus::NotFound,
        x if x == StatusCode::PreconditionFailed as i32 => OperationStatus::PreconditionFailed,
        x if x == StatusCode::Unauthorized as i32 => OperationStatus::Unauthorized,
        x if x == StatusCode::InternalError as i32 => OperationStatus::InternalError,
        _ => OperationStatus::GenericError,
    }
}

fn issue_from_proto(msg: &IssueMessage) -> Issue {
    let severity = match msg.severity {
        x if x == PSeverity::Fatal as i32 => Severity::Fatal,
        x if x == PSeverity::Error as i32 => Severity::Error,
        x if x == PSeverity::Warning as i32 => Severity::Warning,
        _ => Severity::Info,
    };
    Issue {
        severity,
        code: msg.issue_code,
        message: msg.message.clone(),
        issues: msg.issues.iter().map(issue_from_proto).collect(),
    }
}

/// Maps a wire codec id back to the typed [`CodecId`] after the registry
/// has already confirmed it's a known id; unknown ids never reach here.
pub(crate) fn codec_id_from_i32(v: i32) -> CodecId {
    match v {
        x if x == CodecId::Raw as i32 => CodecId::Raw,
        x if x == CodecId::Gzip as i32 => CodecId::Gzip,
        x if x == CodecId::Lzop as i32 => CodecId::Lzop,
        x if x == CodecId::Zstd as i32 => CodecId::Zstd,
        _ => CodecId::Unspecified,
    }
}

/// Converts a wire metadata list into the user-facing map, last-write-wins
/// on duplicate keys (the wire format never guarantees uniqueness).
pub(crate) fn metadata_map(items: &[ydb_proto::topic::MetadataItem]) -> std::collections::HashMap<String, Vec<u8>> {
    items.iter().map(|item| (item.key.clone(), item.value.clone())).collect()
}

/// Converts a user-facing metadata map into the wire's repeated key/value
/// list; order is the map's iteration order, which is fine since the wire
/// format carries no ordering guarantee either.
pub(crate) fn metadata_items(map: &std::collections::HashMap<String, Vec<u8>>) -> Vec<ydb_proto::topic::MetadataItem> {
    map.iter()
        .map(|(k, v)| ydb_proto::topic::MetadataItem { key: k.clone(), value: v.clone() })
        .collect()
}
