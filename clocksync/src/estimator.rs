//! Passive clock-offset estimation from paired send/receive events
//!
//! The estimator listens to two pairs of events already flowing through the
//! streaming protocol:
//!
//! 1. FrameAckSent / FrameAckReceived (receiver -> sender)
//! 2. PacketSentToNetwork / PacketReceived (sender -> receiver)
//!
//! Each pair is causally ordered: a receive cannot happen before its send.
//! Taking the timestamp difference of a matched pair therefore bounds the
//! offset between the two hosts' clocks from one side; the two directions
//! together yield a lower and an upper bound on the receiver-ahead skew.

use crate::config::{ConfigError, EstimatorConfig};
use crate::events::{FrameEvent, PacketEvent, StatisticsEventType};
use crate::rtp_time::RtpTimestamp;
use crate::time::SignedDuration;
use std::collections::BTreeMap;
use std::time::Instant;

/// Correlation key matching a "sent" report to its "received" counterpart
///
/// Ordering is lexicographic with the RTP timestamp most significant, so
/// keys ascend with media time within a capture session. The eviction scan
/// relies on that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    rtp_timestamp: u32,
    packet_id: u16,
    is_audio: bool,
}

impl EventKey {
    fn new(rtp_timestamp: RtpTimestamp, packet_id: u16, is_audio: bool) -> Self {
        EventKey {
            rtp_timestamp: rtp_timestamp.as_raw(),
            packet_id,
            is_audio,
        }
    }
}

// RTP key-space marks for the eviction scan. When the smallest key sits in
// the lower half of the space and other keys sit at or above the 75% mark,
// the high keys date from before an RTP wraparound and are the stalest
// entries in the table.
const LOWER_HALF_MARK: u32 = 1 << 31;
const UPPER_QUARTER_MARK: u32 = 3 << 30;

/// The two timestamp halves of an in-flight correlation
#[derive(Debug, Clone, Copy, Default)]
struct TimestampPair {
    sent: Option<Instant>,
    received: Option<Instant>,
}

/// One-way delay bound tracker for a single direction
///
/// Correlates "sent" and "received" timestamp reports for one logical event
/// stream and maintains the smallest achievable delay observed, with a slow
/// upward creep to follow clock drift. The delay can take large positive or
/// negative values because the two timestamps come from unrelated host
/// clocks; smaller is always the better estimate, since jitter only ever
/// adds delay.
#[derive(Debug, Clone)]
pub struct BoundCalculator {
    events: BTreeMap<EventKey, TimestampPair>,
    bound: Option<SignedDuration>,
    max_events: usize,
    drift_divisor: i64,
}

impl BoundCalculator {
    /// Create a calculator with the given tuning constants
    pub fn new(config: &EstimatorConfig) -> Self {
        BoundCalculator {
            events: BTreeMap::new(),
            bound: None,
            // zero values would break eviction and divide by zero
            max_events: config.max_correlation_table_size.max(1),
            drift_divisor: i64::from(config.drift_speed_divisor.max(1)),
        }
    }

    /// Record the "sent" half of a correlation
    pub fn record_sent(
        &mut self,
        rtp_timestamp: RtpTimestamp,
        packet_id: u16,
        is_audio: bool,
        time: Instant,
    ) {
        let key = EventKey::new(rtp_timestamp, packet_id, is_audio);
        self.events.entry(key).or_default().sent = Some(time);
        self.check_update(key);
    }

    /// Record the "received" half of a correlation
    pub fn record_received(
        &mut self,
        rtp_timestamp: RtpTimestamp,
        packet_id: u16,
        is_audio: bool,
        time: Instant,
    ) {
        let key = EventKey::new(rtp_timestamp, packet_id, is_audio);
        self.events.entry(key).or_default().received = Some(time);
        self.check_update(key);
    }

    /// Whether at least one matched pair has been folded into the bound
    #[inline]
    pub fn has_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Current one-way delay bound, if any pair has matched yet
    ///
    /// Once `Some`, never reverts to `None`.
    #[inline]
    pub fn bound(&self) -> Option<SignedDuration> {
        self.bound
    }

    /// Consume the entry for `key` if both halves are present, otherwise
    /// keep the table within capacity
    fn check_update(&mut self, key: EventKey) {
        if let Some(pair) = self.events.get(&key) {
            if let (Some(sent), Some(received)) = (pair.sent, pair.received) {
                self.update_bound(sent, received);
                self.events.remove(&key);
                return;
            }
        }

        if self.events.len() > self.max_events {
            self.evict_one();
        }
    }

    /// Fold one matched delay sample into the bound
    ///
    /// A smaller sample replaces the bound outright: any new minimum is
    /// structurally valid. A larger sample only nudges the bound up by a
    /// fraction of the gap, so the bound can follow clock drift without
    /// jumping on a single jittered sample. The nudge uses truncating
    /// integer division on microseconds.
    fn update_bound(&mut self, sent: Instant, received: Instant) {
        let delta = SignedDuration::between(sent, received);
        let next = match self.bound {
            None => {
                tracing::debug!(bound_us = delta.as_micros(), "one-way delay bound initialized");
                delta
            }
            Some(bound) if delta < bound => {
                tracing::trace!(bound_us = delta.as_micros(), "one-way delay bound tightened");
                delta
            }
            Some(bound) => bound + (delta - bound) / self.drift_divisor,
        };
        self.bound = Some(next);
    }

    /// Evict the stalest unmatched entry
    ///
    /// Normally the smallest key, since keys ascend with media time. If the
    /// smallest key is in the lower half of RTP key space while entries
    /// linger at or above the 75% mark, those high entries predate an RTP
    /// wraparound and are evicted first.
    fn evict_one(&mut self) {
        let Some(&first) = self.events.keys().next() else {
            return;
        };

        let mut victim = first;
        if first.rtp_timestamp < LOWER_HALF_MARK {
            let mark = EventKey {
                rtp_timestamp: UPPER_QUARTER_MARK,
                packet_id: 0,
                is_audio: false,
            };
            if let Some((&stale, _)) = self.events.range(mark..).next() {
                victim = stale;
            }
        }

        tracing::trace!(
            rtp_timestamp = victim.rtp_timestamp,
            packet_id = victim.packet_id,
            "evicting unmatched correlation"
        );
        self.events.remove(&victim);
    }
}

/// Combined clock-offset estimate from both event directions
///
/// Owns one [`BoundCalculator`] per direction: the lower bound on
/// receiver-ahead skew comes from frame acknowledgements (receiver ->
/// sender), the upper bound from packet delivery (sender -> receiver).
/// Purely synchronous and single-threaded; callers that deliver frame and
/// packet events from different threads must serialize access themselves.
#[derive(Debug, Clone)]
pub struct ClockOffsetEstimator {
    lower_bound: BoundCalculator,
    upper_bound: BoundCalculator,
}

impl ClockOffsetEstimator {
    /// Create an estimator with default tuning
    pub fn new() -> Self {
        let config = EstimatorConfig::default();
        ClockOffsetEstimator {
            lower_bound: BoundCalculator::new(&config),
            upper_bound: BoundCalculator::new(&config),
        }
    }

    /// Create an estimator with explicit tuning, rejecting unusable values
    pub fn with_config(config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ClockOffsetEstimator {
            lower_bound: BoundCalculator::new(&config),
            upper_bound: BoundCalculator::new(&config),
        })
    }

    /// Ingest a frame-level event
    ///
    /// Only acknowledgement events carry timing for the lower-bound
    /// direction; every other frame event type is ignored.
    pub fn on_frame_event(&mut self, event: &FrameEvent) {
        match event.event_type {
            StatisticsEventType::FrameAckSent => {
                // frame acks carry no sub-frame packet id
                self.lower_bound.record_sent(
                    event.rtp_timestamp,
                    0,
                    event.media_type.is_audio(),
                    event.timestamp,
                );
            }
            StatisticsEventType::FrameAckReceived => {
                self.lower_bound.record_received(
                    event.rtp_timestamp,
                    0,
                    event.media_type.is_audio(),
                    event.timestamp,
                );
            }
            _ => {}
        }
    }

    /// Ingest a packet-level event
    ///
    /// Only network send/receive events carry timing for the upper-bound
    /// direction; retransmissions and rejections are ignored.
    pub fn on_packet_event(&mut self, event: &PacketEvent) {
        match event.event_type {
            StatisticsEventType::PacketSentToNetwork => {
                self.upper_bound.record_sent(
                    event.rtp_timestamp,
                    event.packet_id,
                    event.media_type.is_audio(),
                    event.timestamp,
                );
            }
            StatisticsEventType::PacketReceived => {
                self.upper_bound.record_received(
                    event.rtp_timestamp,
                    event.packet_id,
                    event.media_type.is_audio(),
                    event.timestamp,
                );
            }
            _ => {}
        }
    }

    /// Current (lower, upper) bounds on the receiver-ahead clock skew
    ///
    /// `None` until both directions have produced at least one matched
    /// pair, which is the normal state at session start. The returned
    /// interval is always ordered: when drift between the two directions
    /// inverts the raw pair, both sides collapse to the midpoint, so
    /// `lower + upper` is conserved.
    pub fn get_receiver_offset_bounds(&self) -> Option<(SignedDuration, SignedDuration)> {
        let lower = -self.lower_bound.bound()?;
        let upper = self.upper_bound.bound()?;

        if upper < lower {
            let midpoint = (lower + upper) / 2;
            return Some((midpoint, midpoint));
        }
        Some((lower, upper))
    }

    /// Point estimate of the receiver-ahead clock offset
    ///
    /// The midpoint of the sanitized bounds, or `None` while either
    /// direction still lacks data.
    pub fn get_estimated_offset(&self) -> Option<SignedDuration> {
        let (lower, upper) = self.get_receiver_offset_bounds()?;
        Some((lower + upper) / 2)
    }
}

impl Default for ClockOffsetEstimator {
    fn default() -> Self {
        Self::new()
    }
}
