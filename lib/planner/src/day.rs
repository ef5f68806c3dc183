//! Broadcast-day boundaries in the channel's local time.
//!
//! The broadcast day runs from the local anchor (e.g. 06:00) to the next
//! day's anchor. All conversions go through the channel timezone table; a
//! 06:00 anchor on an America/New_York channel is 11:00 UTC in winter and
//! 10:00 UTC in summer, never a fixed UTC hour.

use crate::config::ScheduleManagerConfig;
use crate::error::PlanError;
use chrono::{Duration, NaiveDate, TimeZone};

/// UTC instant of the broadcast-day anchor for `date`.
pub fn day_anchor_utc_ms(date: NaiveDate, cfg: &ScheduleManagerConfig) -> Result<i64, PlanError> {
    let local = date.and_time(cfg.broadcast_day_start);
    // Ambiguous local times (fall-back hour) take the earlier instant;
    // nonexistent ones (spring-forward gap) are a planning error.
    match cfg.timezone.from_local_datetime(&local) {
        chrono::LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
        chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp_millis()),
        chrono::LocalResult::None => Err(PlanError::UnrepresentableLocalTime {
            date,
            time: cfg.broadcast_day_start,
            timezone: cfg.timezone.name().to_string(),
        }),
    }
}

/// `[anchor, next_anchor)` of the broadcast day in UTC ms. The civil length
/// differs from 24 h exactly on DST transition days.
pub fn day_window_utc(date: NaiveDate, cfg: &ScheduleManagerConfig) -> Result<(i64, i64), PlanError> {
    let start = day_anchor_utc_ms(date, cfg)?;
    let end = day_anchor_utc_ms(date + Duration::days(1), cfg)?;
    Ok((start, end))
}

/// Broadcast date containing `now_utc_ms`, computed in channel local time.
///
/// Before the local anchor the instant still belongs to the previous
/// broadcast date.
pub fn broadcast_date_for(now_utc_ms: i64, cfg: &ScheduleManagerConfig) -> NaiveDate {
    let utc = chrono::DateTime::from_timestamp_millis(now_utc_ms)
        .expect("epoch millis in representable range");
    let local = utc.with_timezone(&cfg.timezone);
    let date = local.date_naive();
    if local.time() < cfg.broadcast_day_start {
        date - Duration::days(1)
    } else {
        date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelType, DstPolicy};
    use chrono::NaiveTime;

    fn cfg(tz: &str) -> ScheduleManagerConfig {
        ScheduleManagerConfig {
            channel: "retro-1".into(),
            timezone: tz.parse().unwrap(),
            grid_block_minutes: 30,
            broadcast_day_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            channel_type: ChannelType::Network,
            dst_policy: DstPolicy::Reject,
            num_breaks: 3,
            fade_duration_ms: 500,
        }
    }

    fn utc_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn utc_channel_day_boundary_is_the_anchor() {
        let c = cfg("UTC");
        let feb19 = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
        let feb18 = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 19, 6, 0), &c), feb19);
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 19, 5, 59), &c), feb18);
    }

    #[test]
    fn eastern_channel_day_starts_at_11_utc_in_winter() {
        let c = cfg("America/New_York");
        let feb19 = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
        let feb18 = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        // 06:00 UTC is 01:00 local: previous broadcast day.
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 19, 6, 0), &c), feb18);
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 19, 10, 59), &c), feb18);
        // 11:00 UTC is 06:00 local: the new day.
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 19, 11, 0), &c), feb19);
    }

    #[test]
    fn tokyo_channel_crosses_the_utc_date_line() {
        let c = cfg("Asia/Tokyo");
        let feb19 = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
        // 21:00 UTC Feb 18 is 06:00 JST Feb 19.
        assert_eq!(broadcast_date_for(utc_ms(2026, 2, 18, 21, 0), &c), feb19);
    }

    #[test]
    fn dst_transition_day_is_not_24_hours() {
        let c = cfg("America/New_York");
        // US spring-forward 2025-03-09; the broadcast day anchored 06:00
        // local loses one civil hour.
        let (start, end) =
            day_window_utc(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(), &c).unwrap();
        assert_eq!(end - start, 23 * 3_600_000);
        // Fall-back day gains one.
        let (start, end) =
            day_window_utc(NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(), &c).unwrap();
        assert_eq!(end - start, 25 * 3_600_000);
    }

    #[test]
    fn anchor_conversion_is_deterministic() {
        let c = cfg("America/New_York");
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let a = day_anchor_utc_ms(date, &c).unwrap();
        let b = day_anchor_utc_ms(date, &c).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, utc_ms(2025, 1, 15, 11, 0));
    }
}
