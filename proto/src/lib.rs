//! Generated-style wire types for the services the driver and topic
//! runtime talk to: `Ydb.Discovery.V1.DiscoveryService` and
//! `Ydb.Topic.V1.TopicService`.
//!
//! These modules are written by hand in the shape `tonic-build` would
//! produce from the corresponding `.proto` files (`prost::Message`
//! structs, a `xxx_client` module wrapping `tonic::client::Grpc<T>`) so
//! that callers never notice the stubs weren't compiled from `.proto`
//! sources directly.

pub mod discovery;
pub mod issue;
pub mod topic;
