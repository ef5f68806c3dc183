//! Server configuration: a strict TOML file.
//!
//! Unknown keys are rejected everywhere; every recognized option is listed
//! here. Raw strings (times, timezones) are validated and converted into
//! typed configs during [`ServerConfig::validate`].

use anyhow::{Context, bail};
use chrono::NaiveTime;
use headend_air::{AspectPolicy, ProgramFormat, SessionSpec};
use headend_horizon::{HorizonAuthorityMode, HorizonConfig};
use headend_planner::{
    ChannelTrafficPolicy, ChannelType, DstPolicy, FallbackFiller, ScheduleManagerConfig,
};
use headend_runtime::ChannelRuntimeConfig;
use headend_types::SegmentType;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub channel: ChannelSection,
    pub format: FormatSection,
    pub sink: SinkSection,
    pub runtime: RuntimeSection,
    pub horizon: HorizonSection,
    pub catalog: CatalogSection,
    pub traffic: TrafficSection,
    pub plan: PlanSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSection {
    pub slug: String,
    /// Numeric channel id used on the sink control surface.
    pub number: u32,
    /// IANA timezone name, e.g. "America/New_York".
    pub timezone: String,
    pub grid_block_minutes: u32,
    /// Local time of day, "HH:MM" or "HH:MM:SS".
    pub broadcast_day_start: String,
    pub channel_type: ChannelType,
    pub dst_policy: DstPolicy,
    #[serde(default = "default_num_breaks")]
    pub num_breaks: u32,
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub aspect_policy: AspectPolicy,
    pub sample_rate: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkSection {
    /// gRPC control endpoint of the AIR process.
    pub control_endpoint: String,
    pub ts_transport: String,
    pub ts_endpoint: String,
    #[serde(default = "default_true")]
    pub replace_existing: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    pub preload_budget_ms: i64,
    pub feed_ahead_horizon_ms: i64,
    #[serde(default = "default_queue_full_retry_ms")]
    pub queue_full_retry_ms: u64,
    #[serde(default = "default_max_feed_attempts")]
    pub max_feed_attempts: u32,
    #[serde(default = "default_stop_deadline_ms")]
    pub stop_deadline_ms: u64,
    #[serde(default = "default_ring_buffer_max_bytes")]
    pub ring_buffer_max_bytes: usize,
    /// Where to tap the sink's TS output for fan-out, if anywhere.
    #[serde(default)]
    pub ts_tap_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorizonSection {
    pub mode: HorizonAuthorityMode,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub target_depth_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    pub manifest_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficSection {
    pub allowed_types: Vec<SegmentType>,
    #[serde(default)]
    pub default_cooldown_seconds: i64,
    #[serde(default)]
    pub type_cooldowns: HashMap<SegmentType, i64>,
    #[serde(default)]
    pub max_plays_per_day: Option<u32>,
    pub fallback_filler_uri: String,
    pub fallback_filler_duration_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanSection {
    /// JSON file holding the `SchedulePlanArtifact`.
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}
fn default_num_breaks() -> u32 {
    3
}
fn default_fade_duration_ms() -> i64 {
    500
}
fn default_queue_full_retry_ms() -> u64 {
    250
}
fn default_max_feed_attempts() -> u32 {
    20
}
fn default_stop_deadline_ms() -> u64 {
    2_000
}
fn default_ring_buffer_max_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_poll_interval_ms() -> u64 {
    5_000
}

/// Typed configuration after validation.
pub struct ValidatedConfig {
    pub schedule: ScheduleManagerConfig,
    pub traffic_policy: ChannelTrafficPolicy,
    pub fallback: FallbackFiller,
    pub horizon: HorizonConfig,
    pub channel_runtime: ChannelRuntimeConfig,
    pub ring_buffer_max_bytes: usize,
    pub ts_tap_endpoint: Option<String>,
    pub control_endpoint: String,
    pub catalog_manifest_path: PathBuf,
    pub plan_path: PathBuf,
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: ServerConfig =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(self) -> anyhow::Result<ValidatedConfig> {
        if ![15, 30, 60].contains(&self.channel.grid_block_minutes) {
            bail!(
                "grid_block_minutes must be 15, 30, or 60 (got {})",
                self.channel.grid_block_minutes
            );
        }
        if self.format.frame_rate.num == 0 || self.format.frame_rate.den == 0 {
            bail!("frame_rate numerator and denominator must be positive");
        }
        if self.runtime.ring_buffer_max_bytes < 64 * 1024 {
            bail!(
                "ring_buffer_max_bytes must be at least 64 KiB (got {})",
                self.runtime.ring_buffer_max_bytes
            );
        }
        if self.traffic.fallback_filler_duration_ms <= 0 {
            bail!("fallback_filler_duration_ms must be positive");
        }

        let timezone: chrono_tz::Tz = self
            .channel
            .timezone
            .parse()
            .map_err(|err| anyhow::anyhow!("unknown timezone '{}': {err}", self.channel.timezone))?;
        let broadcast_day_start = parse_day_start(&self.channel.broadcast_day_start)?;

        let schedule = ScheduleManagerConfig {
            channel: self.channel.slug.clone(),
            timezone,
            grid_block_minutes: self.channel.grid_block_minutes,
            broadcast_day_start,
            channel_type: self.channel.channel_type,
            dst_policy: self.channel.dst_policy,
            num_breaks: self.channel.num_breaks,
            fade_duration_ms: self.channel.fade_duration_ms,
        };

        let session_spec = SessionSpec {
            channel_slug: self.channel.slug.clone(),
            channel_id: self.channel.number,
            transport: self.sink.ts_transport,
            endpoint: self.sink.ts_endpoint,
            replace_existing: self.sink.replace_existing,
            program_format: ProgramFormat {
                width: self.format.width,
                height: self.format.height,
                frame_rate_num: self.format.frame_rate.num,
                frame_rate_den: self.format.frame_rate.den,
                aspect_policy: self.format.aspect_policy,
                sample_rate: self.format.sample_rate,
                channels: self.format.channels,
            },
        };

        Ok(ValidatedConfig {
            schedule,
            traffic_policy: ChannelTrafficPolicy {
                allowed_types: self.traffic.allowed_types,
                default_cooldown_seconds: self.traffic.default_cooldown_seconds,
                type_cooldowns: self.traffic.type_cooldowns,
                max_plays_per_day: self.traffic.max_plays_per_day,
            },
            fallback: FallbackFiller {
                asset_uri: self.traffic.fallback_filler_uri,
                duration_ms: self.traffic.fallback_filler_duration_ms,
            },
            horizon: HorizonConfig {
                mode: self.horizon.mode,
                target_depth_ms: self.horizon.target_depth_ms,
                poll_interval: Duration::from_millis(self.horizon.poll_interval_ms),
            },
            channel_runtime: ChannelRuntimeConfig {
                channel_slug: self.channel.slug,
                preload_budget_ms: self.runtime.preload_budget_ms,
                feed_ahead_horizon_ms: self.runtime.feed_ahead_horizon_ms,
                queue_full_retry: Duration::from_millis(self.runtime.queue_full_retry_ms),
                max_feed_attempts: self.runtime.max_feed_attempts,
                stop_deadline: Duration::from_millis(self.runtime.stop_deadline_ms),
                session_spec,
            },
            ring_buffer_max_bytes: self.runtime.ring_buffer_max_bytes,
            ts_tap_endpoint: self.runtime.ts_tap_endpoint,
            control_endpoint: self.sink.control_endpoint,
            catalog_manifest_path: self.catalog.manifest_path,
            plan_path: self.plan.path,
        })
    }
}

fn parse_day_start(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("broadcast_day_start '{raw}' is not HH:MM or HH:MM:SS"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [channel]
        slug = "retro-1"
        number = 1
        timezone = "America/New_York"
        grid_block_minutes = 30
        broadcast_day_start = "06:00"
        channel_type = "network"
        dst_policy = "shrink_one_block"

        [format]
        width = 1280
        height = 720
        frame_rate = { num = 30000, den = 1001 }
        aspect_policy = "preserve"
        sample_rate = 48000
        channels = 2

        [sink]
        control_endpoint = "http://127.0.0.1:9400"
        ts_transport = "tcp"
        ts_endpoint = "127.0.0.1:9401"

        [runtime]
        preload_budget_ms = 3000
        feed_ahead_horizon_ms = 60000

        [horizon]
        mode = "authoritative"
        target_depth_ms = 86400000

        [catalog]
        manifest_path = "catalog.json"

        [traffic]
        allowed_types = ["commercial", "promo", "filler"]
        default_cooldown_seconds = 1800
        fallback_filler_uri = "file:///filler.mp4"
        fallback_filler_duration_ms = 3600000

        [plan]
        path = "plan.json"
    "#;

    #[test]
    fn sample_config_validates_into_typed_sections() {
        let config: ServerConfig = toml::from_str(SAMPLE).unwrap();
        let validated = config.validate().unwrap();
        assert_eq!(validated.schedule.grid_block_minutes, 30);
        assert_eq!(validated.schedule.timezone, chrono_tz::America::New_York);
        assert_eq!(
            validated.schedule.broadcast_day_start,
            NaiveTime::from_hms_opt(6, 0, 0).unwrap()
        );
        assert_eq!(validated.channel_runtime.stop_deadline, Duration::from_secs(2));
        assert_eq!(validated.channel_runtime.session_spec.channel_id, 1);
        assert_eq!(validated.ring_buffer_max_bytes, 8 * 1024 * 1024);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let bad = SAMPLE.replace("[plan]", "[plan]\n        surprise = 1");
        assert!(toml::from_str::<ServerConfig>(&bad).is_err());
    }

    #[test]
    fn off_menu_grid_sizes_are_rejected() {
        let bad = SAMPLE.replace("grid_block_minutes = 30", "grid_block_minutes = 45");
        let config: ServerConfig = toml::from_str(&bad).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_ring_buffers_are_rejected() {
        let bad = SAMPLE.replace(
            "feed_ahead_horizon_ms = 60000",
            "feed_ahead_horizon_ms = 60000\n        ring_buffer_max_bytes = 1024",
        );
        let config: ServerConfig = toml::from_str(&bad).unwrap();
        assert!(config.validate().is_err());
    }
}
