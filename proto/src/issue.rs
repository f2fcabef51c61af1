/// Mirrors `Ydb.Issue.IssueMessage`: the nested issue chain every
/// non-success operation status carries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IssueMessage {
    #[prost(uint32, tag = "1")]
    pub issue_code: u32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(enumeration = "Severity", tag = "5")]
    pub severity: i32,
    #[prost(message, repeated, tag = "6")]
    pub issues: ::prost::alloc::vec::Vec<IssueMessage>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ::prost::Enumeration)]
#[repr(i32)]
pub enum Severity {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
}

/// Mirrors `Ydb.StatusIds.StatusCode`: the YDB-level operation outcome
/// carried by every response, independent of the gRPC transport status.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ::prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    StatusCodeUnspecified = 0,
    Success = 400000,
    BadRequest = 400010,
    Unauthorized = 400020,
    InternalError = 400030,
    Aborted = 400040,
    Unavailable = 400050,
    Overloaded = 400060,
    SchemeError = 400070,
    GenericError = 400080,
    Timeout = 400090,
    BadSession = 400100,
    PreconditionFailed = 400120,
    AlreadyExists = 400130,
    NotFound = 400140,
    SessionExpired = 400150,
    Cancelled = 400160,
    Undetermined = 400170,
    Unsupported = 400180,
    SessionBusy = 400190,
}
