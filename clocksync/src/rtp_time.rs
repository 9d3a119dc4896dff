//! RTP timestamp handling
//!
//! RTP carries a 32-bit media-time counter that wraps around. This module
//! provides a wrapped timestamp type with wraparound-aware arithmetic. The
//! estimator uses it purely as a correlation field: events are matched by
//! RTP timestamp, and the raw value's ordering (monotonic within a capture
//! session, modulo wraparound) drives eviction of stale correlations.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// RTP media timestamp with 32-bit wraparound semantics
///
/// Comparison of raw values is only meaningful within half the timestamp
/// space; use `distance_to` or the wraparound-aware helpers when relating
/// two timestamps from the same stream.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RtpTimestamp(u32);

impl RtpTimestamp {
    /// Create a timestamp from raw RTP ticks
    #[inline]
    pub const fn new(ticks: u32) -> Self {
        RtpTimestamp(ticks)
    }

    /// Get the raw 32-bit tick value
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Calculate the signed tick distance from this timestamp to another
    ///
    /// Accounts for wraparound: positive values mean `other` is ahead of
    /// `self` in media time, negative means behind.
    #[inline]
    pub fn distance_to(self, other: RtpTimestamp) -> i32 {
        other.0.wrapping_sub(self.0) as i32
    }

    /// Check if this timestamp is earlier than another in media time
    #[inline]
    pub fn is_before(self, other: RtpTimestamp) -> bool {
        self.distance_to(other) > 0
    }

    /// Check if this timestamp is later than another in media time
    #[inline]
    pub fn is_after(self, other: RtpTimestamp) -> bool {
        self.distance_to(other) < 0
    }
}

impl fmt::Debug for RtpTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RtpTimestamp({})", self.0)
    }
}

impl fmt::Display for RtpTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RtpTimestamp {
    fn from(ticks: u32) -> Self {
        RtpTimestamp(ticks)
    }
}

impl From<RtpTimestamp> for u32 {
    fn from(ts: RtpTimestamp) -> u32 {
        ts.0
    }
}

impl Add<u32> for RtpTimestamp {
    type Output = RtpTimestamp;

    fn add(self, ticks: u32) -> RtpTimestamp {
        RtpTimestamp(self.0.wrapping_add(ticks))
    }
}

impl AddAssign<u32> for RtpTimestamp {
    fn add_assign(&mut self, ticks: u32) {
        self.0 = self.0.wrapping_add(ticks);
    }
}

impl Sub<u32> for RtpTimestamp {
    type Output = RtpTimestamp;

    fn sub(self, ticks: u32) -> RtpTimestamp {
        RtpTimestamp(self.0.wrapping_sub(ticks))
    }
}

impl SubAssign<u32> for RtpTimestamp {
    fn sub_assign(&mut self, ticks: u32) {
        self.0 = self.0.wrapping_sub(ticks);
    }
}

impl Sub for RtpTimestamp {
    type Output = i32;

    /// Signed tick distance between two timestamps
    fn sub(self, rhs: RtpTimestamp) -> i32 {
        rhs.distance_to(self)
    }
}
