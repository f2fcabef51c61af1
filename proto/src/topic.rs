//! `Ydb.Topic.V1.TopicService`: the `StreamRead` / `StreamWrite`
//! bidirectional RPCs the reader and writer runtimes drive (section 4.5,
//! 4.6), plus the unary `UpdateOffsetsInTransaction` call issued at
//! transaction commit by the transactional reader variant.

use crate::issue::{IssueMessage, StatusCode};

#[derive(Clone, Copy, PartialEq, Eq, Debug, ::prost::Enumeration)]
#[repr(i32)]
pub enum Codec {
    Unspecified = 0,
    Raw = 1,
    Gzip = 2,
    Lzop = 3,
    Zstd = 4,
}

// ---- StreamRead -----------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OffsetsRange {
    #[prost(int64, tag = "1")]
    pub start: i64,
    #[prost(int64, tag = "2")]
    pub end: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TopicReadSettings {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(int64, repeated, tag = "2")]
    pub partition_ids: ::prost::alloc::vec::Vec<i64>,
    #[prost(int64, tag = "3")]
    pub max_lag_ms: i64,
    #[prost(int64, tag = "4")]
    pub read_from_ms: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitRequest {
    #[prost(string, tag = "1")]
    pub consumer: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub topics_read_settings: ::prost::alloc::vec::Vec<TopicReadSettings>,
    #[prost(bool, tag = "3")]
    pub auto_partitioning_support: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitResponse {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    #[prost(int64, tag = "1")]
    pub bytes_size: i64,
}

/// One entry of a message's metadata map (section 3's `metadata?: map<string,
/// bytes>`); wire messages carry it as a repeated key/value pair rather than
/// a native map the way `Ydb.Topic` generally prefers ordered field lists.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetadataItem {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageData {
    #[prost(int64, tag = "1")]
    pub offset: i64,
    #[prost(uint64, tag = "2")]
    pub seq_no: u64,
    #[prost(int64, tag = "3")]
    pub created_at_ms: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "5")]
    pub uncompressed_size: i64,
    #[prost(string, tag = "6")]
    pub message_group_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "7")]
    pub metadata_items: ::prost::alloc::vec::Vec<MetadataItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartitionData {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(message, repeated, tag = "2")]
    pub batches: ::prost::alloc::vec::Vec<Batch>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Batch {
    #[prost(enumeration = "Codec", tag = "1")]
    pub codec: i32,
    #[prost(int64, tag = "2")]
    pub produced_at_ms: i64,
    #[prost(message, repeated, tag = "3")]
    pub message_data: ::prost::alloc::vec::Vec<MessageData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    #[prost(int64, tag = "1")]
    pub bytes_size: i64,
    #[prost(message, repeated, tag = "2")]
    pub partition_data: ::prost::alloc::vec::Vec<PartitionData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartitionCommittedOffset {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(int64, tag = "2")]
    pub committed_offset: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitOffsetRequest {
    #[prost(message, repeated, tag = "1")]
    pub commit_offsets: ::prost::alloc::vec::Vec<PartitionCommitOffset>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartitionCommitOffset {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(message, repeated, tag = "2")]
    pub offsets: ::prost::alloc::vec::Vec<OffsetsRange>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitOffsetResponse {
    #[prost(message, repeated, tag = "1")]
    pub partitions_committed_offsets: ::prost::alloc::vec::Vec<PartitionCommittedOffset>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartPartitionSessionRequest {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(int64, tag = "2")]
    pub partition_id: i64,
    #[prost(string, tag = "3")]
    pub path: ::prost::alloc::string::String,
    #[prost(int64, tag = "4")]
    pub committed_offset: i64,
    #[prost(message, optional, tag = "5")]
    pub partition_offsets: ::core::option::Option<OffsetsRange>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartPartitionSessionResponse {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(int64, optional, tag = "2")]
    pub read_offset: ::core::option::Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub commit_offset: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopPartitionSessionRequest {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(bool, tag = "2")]
    pub graceful: bool,
    #[prost(int64, tag = "3")]
    pub committed_offset: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopPartitionSessionResponse {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndPartitionSession {
    #[prost(int64, tag = "1")]
    pub partition_session_id: i64,
    #[prost(int64, repeated, tag = "2")]
    pub adjacent_partition_ids: ::prost::alloc::vec::Vec<i64>,
    #[prost(int64, repeated, tag = "3")]
    pub child_partition_ids: ::prost::alloc::vec::Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateTokenRequest {
    #[prost(string, tag = "1")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateTokenResponse {}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum FromClientMessage {
    #[prost(message, tag = "1")]
    InitRequest(InitRequest),
    #[prost(message, tag = "2")]
    ReadRequest(ReadRequest),
    #[prost(message, tag = "3")]
    CommitOffsetRequest(CommitOffsetRequest),
    #[prost(message, tag = "4")]
    StartPartitionSessionResponse(StartPartitionSessionResponse),
    #[prost(message, tag = "5")]
    StopPartitionSessionResponse(StopPartitionSessionResponse),
    #[prost(message, tag = "6")]
    UpdateTokenRequest(UpdateTokenRequest),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamReadFromClient {
    #[prost(oneof = "FromClientMessage", tags = "1, 2, 3, 4, 5, 6")]
    pub client_message: ::core::option::Option<FromClientMessage>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum FromServerMessage {
    #[prost(message, tag = "3")]
    InitResponse(InitResponse),
    #[prost(message, tag = "4")]
    ReadResponse(ReadResponse),
    #[prost(message, tag = "5")]
    CommitOffsetResponse(CommitOffsetResponse),
    #[prost(message, tag = "6")]
    StartPartitionSessionRequest(StartPartitionSessionRequest),
    #[prost(message, tag = "7")]
    StopPartitionSessionRequest(StopPartitionSessionRequest),
    #[prost(message, tag = "8")]
    EndPartitionSession(EndPartitionSession),
    #[prost(message, tag = "9")]
    UpdateTokenResponse(UpdateTokenResponse),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamReadFromServer {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<IssueMessage>,
    #[prost(oneof = "FromServerMessage", tags = "3, 4, 5, 6, 7, 8, 9")]
    pub server_message: ::core::option::Option<FromServerMessage>,
}

// ---- StreamWrite -----------------------------------------------------

/// The transaction binding carried on `WriteInitRequest` for the
/// transactional writer variant (section 4.6): acks from a bound writer
/// return `WrittenInTx` instead of `Written`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionIdentifiers {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub tx_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteInitRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub producer_id: ::prost::alloc::string::String,
    #[prost(int64, optional, tag = "3")]
    pub partition_id: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub message_group_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, tag = "5")]
    pub get_last_seq_no: bool,
    #[prost(message, optional, tag = "6")]
    pub tx: ::core::option::Option<TransactionIdentifiers>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteInitResponse {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub partition_id: i64,
    #[prost(uint64, optional, tag = "3")]
    pub last_seq_no: ::core::option::Option<u64>,
    #[prost(int64, tag = "4")]
    pub supported_codecs: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteMessageData {
    #[prost(uint64, tag = "1")]
    pub seq_no: u64,
    #[prost(int64, tag = "2")]
    pub created_at_ms: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub uncompressed_size: i64,
    #[prost(string, tag = "5")]
    pub message_group_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "6")]
    pub metadata_items: ::prost::alloc::vec::Vec<MetadataItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteRequest {
    #[prost(enumeration = "Codec", tag = "1")]
    pub codec: i32,
    #[prost(message, repeated, tag = "2")]
    pub messages: ::prost::alloc::vec::Vec<WriteMessageData>,
    #[prost(string, optional, tag = "3")]
    pub tx_id: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteAck {
    #[prost(uint64, tag = "1")]
    pub seq_no: u64,
    #[prost(oneof = "WriteAckKind", tags = "2, 3, 4")]
    pub kind: ::core::option::Option<WriteAckKind>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum WriteAckKind {
    #[prost(message, tag = "2")]
    Written(Written),
    #[prost(message, tag = "3")]
    Skipped(Skipped),
    #[prost(message, tag = "4")]
    WrittenInTx(WrittenInTx),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Written {
    #[prost(int64, tag = "1")]
    pub offset: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Skipped {
    #[prost(enumeration = "SkippedReason", tag = "1")]
    pub reason: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ::prost::Enumeration)]
#[repr(i32)]
pub enum SkippedReason {
    Unspecified = 0,
    AlreadyWritten = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WrittenInTx {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteResponse {
    #[prost(message, repeated, tag = "1")]
    pub acks: ::prost::alloc::vec::Vec<WriteAck>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum FromClientWriteMessage {
    #[prost(message, tag = "1")]
    InitRequest(WriteInitRequest),
    #[prost(message, tag = "2")]
    WriteRequest(WriteRequest),
    #[prost(message, tag = "3")]
    UpdateTokenRequest(UpdateTokenRequest),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamWriteFromClient {
    #[prost(oneof = "FromClientWriteMessage", tags = "1, 2, 3")]
    pub client_message: ::core::option::Option<FromClientWriteMessage>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum FromServerWriteMessage {
    #[prost(message, tag = "3")]
    InitResponse(WriteInitResponse),
    #[prost(message, tag = "4")]
    WriteResponse(WriteResponse),
    #[prost(message, tag = "5")]
    UpdateTokenResponse(UpdateTokenResponse),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamWriteFromServer {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<IssueMessage>,
    #[prost(oneof = "FromServerWriteMessage", tags = "3, 4, 5")]
    pub server_message: ::core::option::Option<FromServerWriteMessage>,
}

// ---- UpdateOffsetsInTransaction (unary) -------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateOffsetsInTransactionRequestTx {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OffsetsRangeUpdate {
    #[prost(int64, tag = "1")]
    pub partition_id: i64,
    #[prost(message, repeated, tag = "2")]
    pub partition_offsets: ::prost::alloc::vec::Vec<OffsetsRange>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateOffsetsInTransactionTopic {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub partitions: ::prost::alloc::vec::Vec<OffsetsRangeUpdate>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateOffsetsInTransactionRequest {
    #[prost(message, optional, tag = "1")]
    pub tx: ::core::option::Option<UpdateOffsetsInTransactionRequestTx>,
    #[prost(string, tag = "2")]
    pub consumer: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub topics: ::prost::alloc::vec::Vec<UpdateOffsetsInTransactionTopic>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateOffsetsInTransactionResponse {
    #[prost(message, optional, tag = "1")]
    pub operation: ::core::option::Option<crate::discovery::OperationParams>,
}

pub mod topic_service_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct TopicServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl TopicServiceClient<tonic::transport::Channel> {
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> TopicServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_interceptor<F>(inner: T, interceptor: F) -> TopicServiceClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<<T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody>,
            >,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error: Into<StdError> + Send + Sync,
        {
            TopicServiceClient::new(InterceptedService::new(inner, interceptor))
        }

        /// Bidirectional: client submits init/read/commit frames, server
        /// submits init/data/commit-ack/partition-lifecycle frames.
        pub async fn stream_read(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::StreamReadFromClient>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::StreamReadFromServer>>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/Ydb.Topic.V1.TopicService/StreamRead");
            self.inner.streaming(request.into_streaming_request(), path, codec).await
        }

        /// Bidirectional: client submits init/write/token frames, server
        /// submits init/ack frames.
        pub async fn stream_write(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::StreamWriteFromClient>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::StreamWriteFromServer>>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/Ydb.Topic.V1.TopicService/StreamWrite");
            self.inner.streaming(request.into_streaming_request(), path, codec).await
        }

        pub async fn update_offsets_in_transaction(
            &mut self,
            request: impl tonic::IntoRequest<super::UpdateOffsetsInTransactionRequest>,
        ) -> Result<tonic::Response<super::UpdateOffsetsInTransactionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/Ydb.Topic.V1.TopicService/UpdateOffsetsInTransaction");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}
