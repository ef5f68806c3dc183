//! Rational-timebase fence and deadline math.
//!
//! Fences are frame-indexed deadlines at block boundaries, derived from
//! wall-clock deltas with exact integer arithmetic at the channel's frame
//! rate. The ms-quantized approximation `ceil(delta_ms / round(1000/fps))`
//! drifts about 30 ms per 30-second block at 30000/1001 and must never be
//! used; the tests below pin the divergence.

use crate::TimebaseError;

const NS_PER_SECOND: u128 = 1_000_000_000;

/// Frame index of the fence `delta_ms` after the session origin.
///
/// `fence_tick = ceil(delta_ms * fps_num / (fps_den * 1000))`, computed
/// entirely in integers. 128-bit intermediates keep any 64-bit input exact.
pub fn fence_tick(delta_ms: i64, fps_num: u32, fps_den: u32) -> Result<i64, TimebaseError> {
    if fps_num == 0 || fps_den == 0 {
        return Err(TimebaseError::InvalidTimebase { fps_num, fps_den });
    }
    let numer = i128::from(delta_ms) * i128::from(fps_num);
    let denom = i128::from(fps_den) * 1000;
    let q = numer.div_euclid(denom);
    let r = numer.rem_euclid(denom);
    let tick = if r > 0 { q + 1 } else { q };
    Ok(tick as i64)
}

/// Exact monotonic offset of frame `n`'s deadline, in nanoseconds.
///
/// `deadline = n * (1e9 * fps_den) / fps_num`, split into whole and
/// remainder parts so the result stays exact in 64-bit nanoseconds across
/// multi-hour sessions.
pub fn deadline_offset_ns(n: u64, fps_num: u32, fps_den: u32) -> Result<u64, TimebaseError> {
    if fps_num == 0 || fps_den == 0 {
        return Err(TimebaseError::InvalidTimebase { fps_num, fps_den });
    }
    let ns_total = NS_PER_SECOND * u128::from(fps_den);
    let whole = ns_total / u128::from(fps_num);
    let rem = ns_total % u128::from(fps_num);
    let deadline = u128::from(n) * whole + (u128::from(n) * rem) / u128::from(fps_num);
    Ok(deadline as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// The forbidden ms-quantized formula, kept here only as the guard's foil.
    fn fence_tick_ms_quantized(delta_ms: i64, fps_num: u32, fps_den: u32) -> i64 {
        let frame_ms = (f64::from(fps_den) * 1000.0 / f64::from(fps_num)).round() as i64;
        (delta_ms + frame_ms - 1) / frame_ms
    }

    #[test]
    fn ntsc_thirty_second_block_is_900_frames() {
        // ceil(30_000 * 30000 / (1001 * 1000)) = ceil(899.1) = 900
        assert_eq!(fence_tick(30_000, 30_000, 1001).unwrap(), 900);
    }

    #[test]
    fn ms_quantized_formula_diverges_and_is_rejected() {
        // round(1001000/30000) = 33 ms/frame => ceil(30000/33) = 910. Wrong.
        let quantized = fence_tick_ms_quantized(30_000, 30_000, 1001);
        assert_eq!(quantized, 910);
        assert_ne!(quantized, fence_tick(30_000, 30_000, 1001).unwrap());
    }

    #[test]
    fn integer_rates_are_exact() {
        assert_eq!(fence_tick(30_000, 30, 1).unwrap(), 900);
        assert_eq!(fence_tick(1_000, 25, 1).unwrap(), 25);
        assert_eq!(fence_tick(0, 30_000, 1001).unwrap(), 0);
        // One ms past a boundary rounds up to the next frame.
        assert_eq!(fence_tick(1_001, 25, 1).unwrap(), 26);
    }

    #[test]
    fn fence_remainder_propagates_at_multi_hour_offsets() {
        // 6 hours at 30000/1001: ceil(21_600_000 * 30000 / 1_001_000) = 647_353.
        let six_hours_ms = 6 * 3_600_000;
        assert_eq!(fence_tick(six_hours_ms, 30_000, 1001).unwrap(), 647_353);
    }

    #[test]
    fn zero_rate_is_invalid() {
        assert_matches!(
            fence_tick(1, 0, 1001),
            Err(TimebaseError::InvalidTimebase { .. })
        );
        assert_matches!(
            deadline_offset_ns(1, 30_000, 0),
            Err(TimebaseError::InvalidTimebase { .. })
        );
    }

    #[test]
    fn deadlines_match_exact_rational_over_multi_hour_sessions() {
        let (num, den) = (30_000u32, 1001u32);
        // 8 hours of NTSC frames.
        for n in [1u64, 899, 900, 107_892, 863_136] {
            let exact = (u128::from(n) * NS_PER_SECOND * u128::from(den)) / u128::from(num);
            assert_eq!(
                u128::from(deadline_offset_ns(n, num, den).unwrap()),
                exact,
                "frame {n}"
            );
        }
    }

    #[test]
    fn deadline_spacing_never_drifts() {
        // Consecutive deadlines differ by 33_366_666 or 33_366_667 ns at
        // 30000/1001; the cumulative value never accumulates error.
        let (num, den) = (30_000u32, 1001u32);
        let mut prev = 0u64;
        for n in 1..=3_000u64 {
            let d = deadline_offset_ns(n, num, den).unwrap();
            let step = d - prev;
            assert!((33_366_666..=33_366_667).contains(&step), "frame {n}: {step}");
            prev = d;
        }
        // 3000 frames of 1001/30000 s = 100.1 s exactly.
        assert_eq!(prev, 100_100_000_000);
    }
}
