//! Capture facade
//!
//! Owns the ingest pair, performs the per-tick swap, lazily constructs the
//! level meter once the channel topology is known, and republishes
//! readiness, channel count and levels to consumer-side callers.

use std::sync::{Arc, Weak};

use sona_core::{dbfs, Sample};
use sona_dsp::bank::FilterType;
use sona_dsp::meter::LevelMeter;

use crate::ingest::{IngestBuffer, CHANNELS_UNKNOWN};
use crate::{CaptureConfig, CaptureError, CaptureResult};

/// Producer-side handle for the host audio callback.
///
/// Cheap to clone. Holds the ingest pair weakly: a handle that outlives
/// [`AudioCapture::stop`] degrades to a no-op instead of keeping the
/// buffers alive, and an upgrade taken mid-write keeps them alive until
/// that append completes.
#[derive(Debug, Clone)]
pub struct CaptureSource {
    ingest: Weak<IngestBuffer>,
}

impl CaptureSource {
    /// Deliver one callback's interleaved samples and the channel count the
    /// host reported with them. The slice only needs to stay valid for the
    /// duration of the call. No-ops once capture has stopped.
    pub fn write(&self, samples: &[Sample], channel_count: usize) {
        if let Some(ingest) = self.ingest.upgrade() {
            ingest.push(samples, channel_count);
        }
    }
}

/// Lifecycle of the capture pipeline
#[derive(Debug)]
enum CaptureState {
    /// Not capturing; no buffers allocated
    Disabled,
    /// Capturing, waiting for the first callback to reveal the channel count
    Waiting { ingest: Arc<IngestBuffer> },
    /// Capturing and metering
    Metering {
        ingest: Arc<IngestBuffer>,
        meter: LevelMeter,
    },
}

/// Facade over ingest and metering.
///
/// All methods belong to the consumer context; the producer writes through
/// [`CaptureSource`] only. Level queries degrade to zero rather than
/// failing, so callers may poll before the pipeline is ready.
#[derive(Debug)]
pub struct AudioCapture {
    config: CaptureConfig,
    state: CaptureState,
    /// Most recently drained block, interleaved
    block: Vec<Sample>,
    sample_rate: u32,
    channel_count: i32,
}

impl AudioCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            state: CaptureState::Disabled,
            block: Vec::new(),
            sample_rate: 0,
            channel_count: CHANNELS_UNKNOWN,
        }
    }

    /// Begin capturing. `sample_rate` is the host's output rate, read once
    /// here and handed to the meter when it is constructed.
    ///
    /// Starting while already enabled restarts with fresh buffers.
    pub fn start(&mut self, sample_rate: u32) -> CaptureResult<()> {
        if sample_rate == 0 {
            return Err(CaptureError::InvalidSampleRate(sample_rate));
        }

        let ingest = Arc::new(IngestBuffer::new(
            self.config.initial_capacity,
            self.config.guard_rate_ceiling,
        ));
        self.block = Vec::with_capacity(self.config.initial_capacity);
        self.sample_rate = sample_rate;
        self.channel_count = CHANNELS_UNKNOWN;
        self.state = CaptureState::Waiting { ingest };
        log::info!("audio capture started @ {sample_rate} Hz");
        Ok(())
    }

    /// Stop capturing, dropping the ingest pair and the meter.
    ///
    /// Outstanding [`CaptureSource`] handles turn into no-ops once their
    /// in-flight write (if any) completes.
    pub fn stop(&mut self) {
        if !matches!(self.state, CaptureState::Disabled) {
            log::info!("audio capture stopped");
        }
        self.state = CaptureState::Disabled;
        self.block = Vec::new();
        self.channel_count = CHANNELS_UNKNOWN;
    }

    /// Producer-side handle for the current capture run. Handles issued
    /// before the latest [`start`](Self::start) stay inert.
    pub fn source(&self) -> CaptureSource {
        let ingest = match &self.state {
            CaptureState::Disabled => Weak::new(),
            CaptureState::Waiting { ingest } | CaptureState::Metering { ingest, .. } => {
                Arc::downgrade(ingest)
            }
        };
        CaptureSource { ingest }
    }

    /// Consume one tick: swap and drain the ingest pair exactly once,
    /// republish the channel count, and feed the drained block to the
    /// meter, constructing it on the first positive channel observation.
    pub fn tick(&mut self) {
        let (ingest, mut meter) =
            match std::mem::replace(&mut self.state, CaptureState::Disabled) {
                CaptureState::Disabled => return,
                CaptureState::Waiting { ingest } => (ingest, None),
                CaptureState::Metering { ingest, meter } => (ingest, Some(meter)),
            };

        let outcome = ingest.swap_and_drain(&mut self.block);
        self.channel_count = outcome.channel_count;

        if outcome.dropped_samples > 0 {
            log::warn!(
                "ingest overflow: dropped {} samples while the consumer stalled",
                outcome.dropped_samples
            );
        }

        if outcome.channel_count > 0 {
            let meter = meter.get_or_insert_with(|| {
                LevelMeter::new(outcome.channel_count as usize, self.sample_rate)
            });
            meter.process_interleaved(&self.block);
        }

        self.state = match meter {
            Some(meter) => CaptureState::Metering { ingest, meter },
            None => CaptureState::Waiting { ingest },
        };
    }

    /// True once a tick has observed a positive channel count; stays true
    /// until [`stop`](Self::stop).
    pub fn is_ready(&self) -> bool {
        matches!(self.state, CaptureState::Metering { .. })
    }

    /// Channel count as of the most recent tick; [`CHANNELS_UNKNOWN`]
    /// before the first callback has been observed.
    pub fn channel_count(&self) -> i32 {
        self.channel_count
    }

    /// Host output sample rate recorded at [`start`](Self::start)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Full-band level of a channel in dBFS. Zero before readiness and for
    /// out-of-range channels.
    pub fn channel_level(&self, channel: usize) -> Sample {
        self.channel_band_level(channel, FilterType::Bypass)
    }

    /// Level of one band of a channel in dBFS. Zero before readiness and
    /// for out-of-range channels.
    pub fn channel_band_level(&self, channel: usize, band: FilterType) -> Sample {
        match &self.state {
            CaptureState::Metering { meter, .. } if channel < meter.channel_count() => {
                dbfs(meter.level(channel).band(band))
            }
            _ => 0.0,
        }
    }

    /// Raw interleaved snapshot of the most recently drained block, for
    /// consumers wanting waveform rather than level data. Empty until the
    /// first tick drains audio.
    pub fn interleaved(&self) -> &[Sample] {
        &self.block
    }

    /// Samples of one channel within the current snapshot. Empty before
    /// readiness and for out-of-range channels.
    pub fn channel_samples(&self, channel: usize) -> impl Iterator<Item = Sample> + '_ {
        let channel_count = if self.is_ready() && self.channel_count > 0 {
            self.channel_count as usize
        } else {
            0
        };
        sona_core::channel_samples(&self.block, channel, channel_count)
    }
}

impl Default for AudioCapture {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}
