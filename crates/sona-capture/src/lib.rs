//! sona-capture: Real-time audio capture and level publishing
//!
//! Moves interleaved PCM from a real-time audio callback to a per-tick
//! consumer without blocking the callback, and republishes smoothed
//! per-channel levels for parameter drivers.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐ push   ┌──────────────┐ swap/drain ┌──────────────┐
//! │ CaptureSource  │───────▶│ IngestBuffer │───────────▶│ AudioCapture │
//! │ (audio thread) │        │ (mutex pair) │            │ (tick thread)│
//! └────────────────┘        └──────────────┘            └──────┬───────┘
//!                                                              │ levels
//!                                                       ┌──────▼───────┐
//!                                                       │ LevelTracker │
//!                                                       └──────────────┘
//! ```

mod capture;
mod error;
mod ingest;
mod tracker;

pub use capture::*;
pub use error::*;
pub use ingest::*;
pub use tracker::*;

/// Capture configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CaptureConfig {
    /// Initial capacity of each side of the ingest pair, in samples
    pub initial_capacity: usize,
    /// Nominal sample-rate ceiling feeding the ingest overflow guard
    pub guard_rate_ceiling: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024 * 4 * 2,
            guard_rate_ceiling: 48_000,
        }
    }
}
