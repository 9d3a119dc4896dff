//! Signed time arithmetic for cross-clock measurements
//!
//! The estimator subtracts timestamps taken on two independently running
//! host clocks, so a "received" time can precede a "sent" time by an
//! arbitrary amount. `std::time::Duration` is unsigned; this module provides
//! a signed microsecond duration for those deltas.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Neg, Sub, SubAssign};
use std::time::{Duration, Instant};

/// Signed duration in microseconds
///
/// Used for one-way delay samples, delay bounds, and clock offsets, all of
/// which may be negative when the two clocks involved disagree. Arithmetic
/// is plain `i64` arithmetic on microseconds; division truncates toward
/// zero, which is the documented semantics of the drift-smoothing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SignedDuration {
    micros: i64,
}

impl SignedDuration {
    /// Zero-length duration
    pub const ZERO: SignedDuration = SignedDuration { micros: 0 };

    /// Create a signed duration from microseconds
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        SignedDuration { micros }
    }

    /// Create a signed duration from milliseconds
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        SignedDuration {
            micros: millis * 1_000,
        }
    }

    /// Create a signed duration from whole seconds
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        SignedDuration {
            micros: secs * 1_000_000,
        }
    }

    /// Get the duration in microseconds
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.micros
    }

    /// Get the duration in whole milliseconds (truncated toward zero)
    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.micros / 1_000
    }

    /// Signed difference `received - sent` between two instants
    ///
    /// Returns a negative duration when `received` precedes `sent`, which
    /// happens routinely when the two timestamps were taken on different
    /// hosts whose clocks disagree.
    pub fn between(sent: Instant, received: Instant) -> Self {
        match received.checked_duration_since(sent) {
            Some(forward) => SignedDuration::from(forward),
            None => -SignedDuration::from(sent.duration_since(received)),
        }
    }

    /// Whether this duration is negative
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.micros < 0
    }

    /// Absolute value
    #[inline]
    pub const fn abs(self) -> Self {
        SignedDuration {
            micros: self.micros.abs(),
        }
    }
}

impl From<Duration> for SignedDuration {
    /// Convert an unsigned duration, saturating at `i64::MAX` microseconds
    fn from(duration: Duration) -> Self {
        SignedDuration {
            micros: duration.as_micros().try_into().unwrap_or(i64::MAX),
        }
    }
}

impl Neg for SignedDuration {
    type Output = SignedDuration;

    fn neg(self) -> SignedDuration {
        SignedDuration {
            micros: -self.micros,
        }
    }
}

impl Add for SignedDuration {
    type Output = SignedDuration;

    fn add(self, rhs: SignedDuration) -> SignedDuration {
        SignedDuration {
            micros: self.micros + rhs.micros,
        }
    }
}

impl AddAssign for SignedDuration {
    fn add_assign(&mut self, rhs: SignedDuration) {
        self.micros += rhs.micros;
    }
}

impl Sub for SignedDuration {
    type Output = SignedDuration;

    fn sub(self, rhs: SignedDuration) -> SignedDuration {
        SignedDuration {
            micros: self.micros - rhs.micros,
        }
    }
}

impl SubAssign for SignedDuration {
    fn sub_assign(&mut self, rhs: SignedDuration) {
        self.micros -= rhs.micros;
    }
}

impl Div<i64> for SignedDuration {
    type Output = SignedDuration;

    /// Integer division, truncating toward zero
    fn div(self, rhs: i64) -> SignedDuration {
        SignedDuration {
            micros: self.micros / rhs,
        }
    }
}

impl fmt::Display for SignedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.micros)
    }
}
