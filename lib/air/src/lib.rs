//! Client side of the AIR control surface.
//!
//! AIR is the external rendering engine: it consumes block plans over a
//! small gRPC surface and emits MPEG-TS plus a block-event stream. This
//! crate owns the wire protocol (vendored generated message types), the
//! transport client, and the [`PlayoutSession`] the runtime drives.

mod gateway;
pub mod proto;
mod session;

pub use gateway::AirGateway;
pub use session::{
    AspectPolicy, BlockCompletion, FeedOutcome, PlayoutGateway, PlayoutSession,
    PlayoutSessionHandle, ProgramFormat, SessionError, SessionEvent, SessionSpec,
};
