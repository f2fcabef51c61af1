use std::fmt::{Debug, Display, Formatter};

/// A gRPC status describing the result of an RPC call.
///
/// Thin wrapper over [`tonic::Status`], mirrored after the corpus's
/// `gax::status::Status` so retry predicates and callers never depend on
/// `tonic` directly.
pub struct Status {
    pub source: tonic::Status,
}

impl Status {
    pub fn new(source: tonic::Status) -> Self {
        Status { source }
    }

    pub fn code(&self) -> Code {
        self.source.code().into()
    }

    pub fn message(&self) -> &str {
        self.source.message()
    }
}

impl std::error::Error for Status {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

impl From<tonic::Status> for Status {
    fn from(source: tonic::Status) -> Self {
        Status { source }
    }
}

impl Debug for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.source, f)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.source, f)
    }
}

/// gRPC status codes, mirrored from [`tonic::Code`] so downstream crates
/// match against `ydb_gax::status::Code` instead of `tonic::Code`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Code {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl From<tonic::Code> for Code {
    fn from(code: tonic::Code) -> Self {
        match code {
            tonic::Code::Ok => Code::Ok,
            tonic::Code::Cancelled => Code::Cancelled,
            tonic::Code::Unknown => Code::Unknown,
            tonic::Code::InvalidArgument => Code::InvalidArgument,
            tonic::Code::DeadlineExceeded => Code::DeadlineExceeded,
            tonic::Code::NotFound => Code::NotFound,
            tonic::Code::AlreadyExists => Code::AlreadyExists,
            tonic::Code::PermissionDenied => Code::PermissionDenied,
            tonic::Code::ResourceExhausted => Code::ResourceExhausted,
            tonic::Code::FailedPrecondition => Code::FailedPrecondition,
            tonic::Code::Aborted => Code::Aborted,
            tonic::Code::OutOfRange => Code::OutOfRange,
            tonic::Code::Unimplemented => Code::Unimplemented,
            tonic::Code::Internal => Code::Internal,
            tonic::Code::Unavailable => Code::Unavailable,
            tonic::Code::DataLoss => Code::DataLoss,
            tonic::Code::Unauthenticated => Code::Unauthenticated,
        }
    }
}

/// Severity of an [`Issue`] in a YDB issue chain (section 7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        f.write_str(s)
    }
}

/// One node of the nested issue chain YDB attaches to non-success responses.
#[derive(Clone, Debug)]
pub struct Issue {
    pub severity: Severity,
    pub code: u32,
    pub message: String,
    pub issues: Vec<Issue>,
}

/// The YDB-level operation status, distinct from the transport-level gRPC
/// `Code`: a gRPC call can succeed while the wrapped YDB operation still
/// failed with one of these. This is what section 7's retry buckets
/// classify against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperationStatus {
    Success,
    Aborted,
    Overloaded,
    Unavailable,
    BadSession,
    SessionBusy,
    SessionExpired,
    Undetermined,
    Timeout,
    Cancelled,
    SchemaError,
    NotFound,
    PreconditionFailed,
    Unauthorized,
    Unauthenticated,
    InternalError,
    GenericError,
}

impl From<Code> for OperationStatus {
    /// Fallback mapping used when a `YdbError` carries no explicit YDB
    /// operation status (e.g. the failure never reached the server and
    /// only a transport-level gRPC status exists).
    fn from(code: Code) -> Self {
        match code {
            Code::Ok => OperationStatus::Success,
            Code::Aborted => OperationStatus::Aborted,
            Code::ResourceExhausted => OperationStatus::Overloaded,
            Code::Unavailable => OperationStatus::Unavailable,
            Code::DeadlineExceeded => OperationStatus::Timeout,
            Code::Cancelled => OperationStatus::Cancelled,
            Code::NotFound => OperationStatus::NotFound,
            Code::FailedPrecondition => OperationStatus::PreconditionFailed,
            Code::PermissionDenied => OperationStatus::Unauthorized,
            Code::Unauthenticated => OperationStatus::Unauthenticated,
            Code::Internal | Code::DataLoss | Code::Unknown => OperationStatus::InternalError,
            Code::InvalidArgument | Code::AlreadyExists | Code::OutOfRange | Code::Unimplemented => {
                OperationStatus::GenericError
            }
        }
    }
}

/// A YDB-specific error: a gRPC/operation status plus the issue chain that
/// explains it. The retry engine classifies on `operation_status()`;
/// `Display` renders the user-visible message from section 7:
/// `"Status: <code>, Issues: <severity>(<code>): <msg>; ..."`.
#[derive(Debug)]
pub struct YdbError {
    pub status: Status,
    pub issues: Vec<Issue>,
    /// Set when the server returned an explicit YDB operation status;
    /// `None` means "derive it from the transport-level gRPC code".
    pub operation_status: Option<OperationStatus>,
}

impl YdbError {
    pub fn new(status: Status, issues: Vec<Issue>) -> Self {
        Self {
            status,
            issues,
            operation_status: None,
        }
    }

    pub fn with_operation_status(mut self, status: OperationStatus) -> Self {
        self.operation_status = Some(status);
        self
    }

    pub fn code(&self) -> Code {
        self.status.code()
    }

    pub fn operation_status(&self) -> OperationStatus {
        self.operation_status.unwrap_or_else(|| OperationStatus::from(self.code()))
    }

    fn write_issues(issues: &[Issue], f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, issue) in issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}({}): {}", issue.severity, issue.code, issue.message)?;
            if !issue.issues.is_empty() {
                f.write_str(" [")?;
                Self::write_issues(&issue.issues, f)?;
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}

impl Display for YdbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Status: {:?}, Issues: ", self.status.code())?;
        Self::write_issues(&self.issues, f)
    }
}

impl std::error::Error for YdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.status)
    }
}

impl From<tonic::Status> for YdbError {
    fn from(source: tonic::Status) -> Self {
        YdbError::new(Status::from(source), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_issue_chain() {
        let err = YdbError::new(
            Status::from(tonic::Status::unavailable("retry later")),
            vec![Issue {
                severity: Severity::Error,
                code: 400010,
                message: "table not found".to_string(),
                issues: vec![Issue {
                    severity: Severity::Warning,
                    code: 1,
                    message: "nested".to_string(),
                    issues: vec![],
                }],
            }],
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("Status: Unavailable, Issues: "));
        assert!(rendered.contains("ERROR(400010): table not found"));
        assert!(rendered.contains("WARNING(1): nested"));
    }
}
