//! Passive clock-offset estimation for real-time media streaming
//!
//! This crate keeps a receiver's playout clock aligned with a sender's
//! capture clock without adding synchronization traffic: it listens to
//! send/receive event pairs already produced by the streaming protocol
//! (frame acknowledgements and packet acknowledgements), bounds the one-way
//! delay in each direction, and combines both bounds into a signed offset
//! estimate with an uncertainty interval.

pub mod config;
pub mod estimator;
pub mod events;
pub mod rtp_time;
pub mod time;

pub use config::{ConfigError, EstimatorConfig};
pub use estimator::{BoundCalculator, ClockOffsetEstimator};
pub use events::{FrameEvent, FrameId, MediaType, PacketEvent, StatisticsEventType};
pub use rtp_time::RtpTimestamp;
pub use time::SignedDuration;
