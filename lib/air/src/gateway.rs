//! Gateway: connect, handshake, attach, and enter block-plan mode.

use crate::proto;
use crate::proto::air_control_client::AirControlClient;
use crate::session::{
    PlayoutGateway, PlayoutSession, SessionError, SessionSpec,
};
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use headend_timebase::MasterClock;
use std::sync::Arc;
use std::time::Duration;

/// Connects to one AIR control endpoint and opens channel sessions.
pub struct AirGateway {
    control_endpoint: String,
    clock: Arc<dyn MasterClock>,
    connect_attempts: usize,
    connect_delay: Duration,
}

impl AirGateway {
    pub fn new(control_endpoint: impl Into<String>, clock: Arc<dyn MasterClock>) -> Self {
        Self {
            control_endpoint: control_endpoint.into(),
            clock,
            connect_attempts: 10,
            connect_delay: Duration::from_secs(1),
        }
    }

    async fn connect(&self) -> Result<AirControlClient<tonic::transport::Channel>, SessionError> {
        let endpoint = self.control_endpoint.clone();
        let client = (|| AirControlClient::connect(endpoint.clone()))
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.connect_delay)
                    .with_max_times(self.connect_attempts),
            )
            .notify(|err, dur| {
                tracing::warn!(?err, ?dur, "retrying connection to AIR control endpoint");
            })
            .await?;
        Ok(client)
    }
}

#[async_trait]
impl PlayoutGateway for AirGateway {
    type Session = PlayoutSession;

    async fn open_session(&self, spec: &SessionSpec) -> Result<Self::Session, SessionError> {
        let mut client = self.connect().await?;

        let version = client
            .get_version(proto::GetVersionRequest {})
            .await?
            .into_inner()
            .version;
        let parsed: semver::Version = version
            .parse()
            .map_err(|err| SessionError::Handshake(format!("bad sink version '{version}': {err}")))?;
        tracing::info!(channel = %spec.channel_slug, sink_version = %parsed, "AIR handshake");

        let attach = client
            .attach_stream(proto::AttachStreamRequest {
                channel_id: spec.channel_id,
                transport: spec.transport.clone(),
                endpoint: spec.endpoint.clone(),
                replace_existing: spec.replace_existing,
            })
            .await?
            .into_inner();
        if !attach.accepted {
            return Err(SessionError::Rejected {
                what: "stream attachment",
                message: attach.message,
            });
        }

        let started = client
            .start_block_plan_session(proto::StartBlockPlanSessionRequest {
                channel_id: spec.channel_id,
                program_format: Some(proto::ProgramFormat {
                    width: spec.program_format.width,
                    height: spec.program_format.height,
                    frame_rate_num: spec.program_format.frame_rate_num,
                    frame_rate_den: spec.program_format.frame_rate_den,
                    aspect_policy: proto::AspectPolicy::from(spec.program_format.aspect_policy)
                        as i32,
                    sample_rate: spec.program_format.sample_rate,
                    channels: spec.program_format.channels,
                }),
            })
            .await?
            .into_inner();
        if !started.accepted {
            return Err(SessionError::Rejected {
                what: "block-plan session",
                message: started.message,
            });
        }

        // Exactly one event subscription per session; a restart builds a
        // fresh session with a fresh subscription.
        let events = client
            .subscribe_block_events(proto::SubscribeBlockEventsRequest {
                channel_id: spec.channel_id,
            })
            .await?
            .into_inner();

        tracing::info!(channel = %spec.channel_slug, channel_id = spec.channel_id, "playout session open");
        Ok(PlayoutSession {
            client,
            events,
            clock: self.clock.clone(),
            channel_id: spec.channel_id,
        })
    }
}
