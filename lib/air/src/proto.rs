//! Wire types and client for the `air.v1.AirControl` service.
//!
//! Vendored `tonic`/`prost` codegen output, kept in-tree so the protocol is
//! reviewable and builds do not need protoc. Regenerate from
//! `proto/air/v1/air.proto` in the AIR repository when the surface changes.

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetVersionRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetVersionResponse {
    /// Semantic version of the sink.
    #[prost(string, tag = "1")]
    pub version: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttachStreamRequest {
    #[prost(uint32, tag = "1")]
    pub channel_id: u32,
    /// Output transport, e.g. "tcp" or "unix".
    #[prost(string, tag = "2")]
    pub transport: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub endpoint: ::prost::alloc::string::String,
    /// Replace an existing attachment atomically instead of failing.
    #[prost(bool, tag = "4")]
    pub replace_existing: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttachStreamResponse {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ProgramFormat {
    #[prost(uint32, tag = "1")]
    pub width: u32,
    #[prost(uint32, tag = "2")]
    pub height: u32,
    #[prost(uint32, tag = "3")]
    pub frame_rate_num: u32,
    #[prost(uint32, tag = "4")]
    pub frame_rate_den: u32,
    #[prost(enumeration = "AspectPolicy", tag = "5")]
    pub aspect_policy: i32,
    #[prost(uint32, tag = "6")]
    pub sample_rate: u32,
    #[prost(uint32, tag = "7")]
    pub channels: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AspectPolicy {
    Unspecified = 0,
    Preserve = 1,
    Stretch = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartBlockPlanSessionRequest {
    #[prost(uint32, tag = "1")]
    pub channel_id: u32,
    #[prost(message, optional, tag = "2")]
    pub program_format: ::core::option::Option<ProgramFormat>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartBlockPlanSessionResponse {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockPlanSegment {
    #[prost(string, tag = "1")]
    pub segment_type: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub asset_uri: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub asset_start_offset_ms: i64,
    #[prost(int64, tag = "4")]
    pub segment_duration_ms: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeedBlockPlanRequest {
    #[prost(uint32, tag = "1")]
    pub channel_id: u32,
    #[prost(string, tag = "2")]
    pub block_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub start_utc_ms: i64,
    #[prost(int64, tag = "4")]
    pub end_utc_ms: i64,
    #[prost(message, repeated, tag = "5")]
    pub segments: ::prost::alloc::vec::Vec<BlockPlanSegment>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FeedResult {
    Unspecified = 0,
    Accepted = 1,
    QueueFull = 2,
    Rejected = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeedBlockPlanResponse {
    #[prost(enumeration = "FeedResult", tag = "1")]
    pub result: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SwitchToLiveRequest {
    #[prost(uint32, tag = "1")]
    pub channel_id: u32,
    /// Authoritative switch instant declared by Core; the sink completes
    /// the switch within one frame of this boundary.
    #[prost(int64, tag = "2")]
    pub target_boundary_time_ms: i64,
    #[prost(int64, tag = "3")]
    pub issued_at_time_ms: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SwitchToLiveResponse {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SubscribeBlockEventsRequest {
    #[prost(uint32, tag = "1")]
    pub channel_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockCompleted {
    #[prost(string, tag = "1")]
    pub block_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub block_start_utc_ms: i64,
    #[prost(int64, tag = "3")]
    pub block_end_utc_ms: i64,
    /// Content time at the fence when the block was retired.
    #[prost(int64, tag = "4")]
    pub final_ct_ms: i64,
    #[prost(uint64, tag = "5")]
    pub blocks_executed_total: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionEnded {
    #[prost(string, tag = "1")]
    pub reason: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockEvent {
    #[prost(oneof = "block_event::Event", tags = "1, 2")]
    pub event: ::core::option::Option<block_event::Event>,
}

/// Nested message and enum types in `BlockEvent`.
pub mod block_event {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Event {
        #[prost(message, tag = "1")]
        BlockCompleted(super::BlockCompleted),
        #[prost(message, tag = "2")]
        SessionEnded(super::SessionEnded),
    }
}

/// Generated client implementations.
pub mod air_control_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports, clippy::let_unit_value)]
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct AirControlClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl AirControlClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> AirControlClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub async fn get_version(
            &mut self,
            request: impl tonic::IntoRequest<super::GetVersionRequest>,
        ) -> std::result::Result<tonic::Response<super::GetVersionResponse>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/air.v1.AirControl/GetVersion");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn attach_stream(
            &mut self,
            request: impl tonic::IntoRequest<super::AttachStreamRequest>,
        ) -> std::result::Result<tonic::Response<super::AttachStreamResponse>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/air.v1.AirControl/AttachStream");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn start_block_plan_session(
            &mut self,
            request: impl tonic::IntoRequest<super::StartBlockPlanSessionRequest>,
        ) -> std::result::Result<
            tonic::Response<super::StartBlockPlanSessionResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/air.v1.AirControl/StartBlockPlanSession",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn feed_block_plan(
            &mut self,
            request: impl tonic::IntoRequest<super::FeedBlockPlanRequest>,
        ) -> std::result::Result<tonic::Response<super::FeedBlockPlanResponse>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/air.v1.AirControl/FeedBlockPlan");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn switch_to_live(
            &mut self,
            request: impl tonic::IntoRequest<super::SwitchToLiveRequest>,
        ) -> std::result::Result<tonic::Response<super::SwitchToLiveResponse>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/air.v1.AirControl/SwitchToLive");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn subscribe_block_events(
            &mut self,
            request: impl tonic::IntoRequest<super::SubscribeBlockEventsRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::BlockEvent>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/air.v1.AirControl/SubscribeBlockEvents",
            );
            self.inner
                .server_streaming(request.into_request(), path, codec)
                .await
        }
    }
}
