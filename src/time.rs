//! Splice timing types and 90 kHz tick conversions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of 90 kHz ticks per second, the time base shared by SCTE-35 and
/// MPEG timestamps.
pub const TICKS_PER_SECOND: u64 = 90_000;

/// Converts a 90 kHz tick count to a [`Duration`].
///
/// Exact inverse of [`duration_to_ticks`] for every representable tick count.
pub fn ticks_to_duration(ticks: u64) -> Duration {
    // 1e9 / 90_000 nanoseconds per tick, kept in integer arithmetic.
    let nanos = u128::from(ticks) * 100_000 / 9;
    Duration::new((nanos / 1_000_000_000) as u64, (nanos % 1_000_000_000) as u32)
}

/// Converts a [`Duration`] to 90 kHz ticks, rounding to the nearest tick.
pub fn duration_to_ticks(duration: Duration) -> u64 {
    ((duration.as_nanos() * 9 + 50_000) / 100_000) as u64
}

/// The `splice_time()` structure: an optional 33-bit PTS.
///
/// On the wire the absent form is a cleared `time_specified_flag` followed by
/// 7 reserved bits; the present form is a set flag, 6 reserved bits and the
/// 33-bit value. The flag is derived from the option at encode time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceTime {
    /// Presentation time in 90 kHz ticks, modulo 2^33.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pts_time: Option<u64>,
}

impl SpliceTime {
    /// A splice time with the given PTS ticks.
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            pts_time: Some(ticks),
        }
    }

    /// The PTS as a [`Duration`], when specified.
    pub fn to_duration(&self) -> Option<Duration> {
        self.pts_time.map(ticks_to_duration)
    }
}

impl From<Duration> for SpliceTime {
    fn from(duration: Duration) -> Self {
        Self::from_ticks(duration_to_ticks(duration))
    }
}

/// The `break_duration()` structure attached to splice events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakDuration {
    /// When set, the device returns to the network feed on its own once the
    /// duration expires.
    pub auto_return: bool,
    /// Break length in 90 kHz ticks (33 bits).
    pub duration: u64,
}

impl BreakDuration {
    /// The break length as a [`Duration`].
    pub fn to_duration(&self) -> Duration {
        ticks_to_duration(self.duration)
    }
}
