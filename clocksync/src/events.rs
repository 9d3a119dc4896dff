//! Statistics event model for the streaming pipeline
//!
//! These are the event structures the surrounding pipeline hands to the
//! estimator as frames and packets move through capture, encode, transport,
//! decode, and playout. Only the acknowledgement events carry timing the
//! estimator cares about; the rest of the vocabulary exists so collectors
//! can log a frame's full lifecycle through a single channel.

use crate::rtp_time::RtpTimestamp;
use crate::time::SignedDuration;
use std::fmt;
use std::time::Instant;

/// Lifecycle event types reported by the sender and receiver sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticsEventType {
    Unknown,
    // Sender side frame events
    FrameCaptureBegin,
    FrameCaptureEnd,
    FrameEncoded,
    FrameAckReceived,
    // Receiver side frame events
    FrameAckSent,
    FrameDecoded,
    FramePlayedOut,
    // Sender side packet events
    PacketSentToNetwork,
    PacketRetransmitted,
    PacketRtxRejected,
    // Receiver side packet events
    PacketReceived,
}

impl StatisticsEventType {
    /// Canonical event name, as used in logs and reports
    pub const fn name(self) -> &'static str {
        match self {
            StatisticsEventType::Unknown => "Unknown",
            StatisticsEventType::FrameCaptureBegin => "FrameCaptureBegin",
            StatisticsEventType::FrameCaptureEnd => "FrameCaptureEnd",
            StatisticsEventType::FrameEncoded => "FrameEncoded",
            StatisticsEventType::FrameAckReceived => "FrameAckReceived",
            StatisticsEventType::FrameAckSent => "FrameAckSent",
            StatisticsEventType::FrameDecoded => "FrameDecoded",
            StatisticsEventType::FramePlayedOut => "FramePlayedOut",
            StatisticsEventType::PacketSentToNetwork => "PacketSentToNetwork",
            StatisticsEventType::PacketRetransmitted => "PacketRetransmitted",
            StatisticsEventType::PacketRtxRejected => "PacketRtxRejected",
            StatisticsEventType::PacketReceived => "PacketReceived",
        }
    }
}

impl fmt::Display for StatisticsEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Media stream type an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Unknown,
    Audio,
    Video,
}

impl MediaType {
    /// Whether this is the audio stream
    #[inline]
    pub const fn is_audio(self) -> bool {
        matches!(self, MediaType::Audio)
    }
}

/// Monotonic frame identifier within a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameId(u64);

impl FrameId {
    /// Create a frame id from its raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        FrameId(id)
    }

    /// Get the raw frame id value
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A frame-level lifecycle event
#[derive(Debug, Clone)]
pub struct FrameEvent {
    /// The frame this event is associated with
    pub frame_id: FrameId,
    /// The type of this frame event
    pub event_type: StatisticsEventType,
    /// Whether this was audio or video (or unknown)
    pub media_type: MediaType,
    /// The RTP timestamp of the frame this event is associated with
    pub rtp_timestamp: RtpTimestamp,
    /// Resolution of the frame; only set for video capture-end events
    pub width: u32,
    /// Resolution of the frame; only set for video capture-end events
    pub height: u32,
    /// Size of the encoded frame in bytes; only set for encoded events
    pub size: u32,
    /// Time the event was logged, on the reporting host's clock
    pub timestamp: Instant,
    /// Playout skew; only set for played-out events. Zero means on time,
    /// positive late, negative early.
    pub delay_delta: SignedDuration,
    /// Whether the frame is a key frame; only set for video encoded events
    pub key_frame: bool,
    /// Encoder target bitrate at encode time; only set for encoded events
    pub target_bitrate: u32,
}

impl FrameEvent {
    /// Create a frame event with the identifying fields set and all
    /// per-event-type payload fields zeroed
    pub fn new(
        event_type: StatisticsEventType,
        media_type: MediaType,
        rtp_timestamp: RtpTimestamp,
        timestamp: Instant,
    ) -> Self {
        FrameEvent {
            frame_id: FrameId::default(),
            event_type,
            media_type,
            rtp_timestamp,
            width: 0,
            height: 0,
            size: 0,
            timestamp,
            delay_delta: SignedDuration::ZERO,
            key_frame: false,
            target_bitrate: 0,
        }
    }
}

/// A packet-level lifecycle event
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// The packet this event is associated with
    pub packet_id: u16,
    /// The highest packet id seen so far at the time of the event
    pub max_packet_id: u16,
    /// The RTP timestamp of the frame this packet belongs to
    pub rtp_timestamp: RtpTimestamp,
    /// The frame this packet belongs to
    pub frame_id: FrameId,
    /// The size of this packet in bytes
    pub size: u32,
    /// Time the event was logged, on the reporting host's clock
    pub timestamp: Instant,
    /// The type of this packet event
    pub event_type: StatisticsEventType,
    /// Whether this was audio or video (or unknown)
    pub media_type: MediaType,
}

impl PacketEvent {
    /// Create a packet event with the identifying fields set and the
    /// remaining payload fields zeroed
    pub fn new(
        event_type: StatisticsEventType,
        media_type: MediaType,
        rtp_timestamp: RtpTimestamp,
        packet_id: u16,
        timestamp: Instant,
    ) -> Self {
        PacketEvent {
            packet_id,
            max_packet_id: 0,
            rtp_timestamp,
            frame_id: FrameId::default(),
            size: 0,
            timestamp,
            event_type,
            media_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(StatisticsEventType::FrameAckSent.to_string(), "FrameAckSent");
        assert_eq!(
            StatisticsEventType::PacketSentToNetwork.name(),
            "PacketSentToNetwork"
        );
        assert_eq!(StatisticsEventType::Unknown.name(), "Unknown");
    }

    #[test]
    fn test_media_type() {
        assert!(MediaType::Audio.is_audio());
        assert!(!MediaType::Video.is_audio());
        assert!(!MediaType::Unknown.is_audio());
    }

    #[test]
    fn test_frame_event_constructor() {
        let now = Instant::now();
        let event = FrameEvent::new(
            StatisticsEventType::FrameAckSent,
            MediaType::Video,
            RtpTimestamp::new(90_000),
            now,
        );

        assert_eq!(event.event_type, StatisticsEventType::FrameAckSent);
        assert_eq!(event.rtp_timestamp.as_raw(), 90_000);
        assert_eq!(event.timestamp, now);
        assert_eq!(event.size, 0);
        assert_eq!(event.delay_delta, SignedDuration::ZERO);
        assert!(!event.key_frame);
    }

    #[test]
    fn test_packet_event_constructor() {
        let now = Instant::now();
        let event = PacketEvent::new(
            StatisticsEventType::PacketReceived,
            MediaType::Audio,
            RtpTimestamp::new(48_000),
            7,
            now,
        );

        assert_eq!(event.packet_id, 7);
        assert_eq!(event.event_type, StatisticsEventType::PacketReceived);
        assert!(event.media_type.is_audio());
    }

    #[test]
    fn test_frame_id() {
        let id = FrameId::new(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(FrameId::new(1) < FrameId::new(2));
    }
}
