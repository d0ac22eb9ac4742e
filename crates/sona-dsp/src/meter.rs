//! Per-channel multi-band level meter
//!
//! Owns one [`FilterBank`] and four [`EnvelopeFollower`]s per channel.
//! Consumes drained interleaved blocks and answers level queries at any
//! time; queries for channels the meter does not have read as silence.

use sona_core::Sample;

use crate::bank::{FilterBank, FilterType};
use crate::envelope::EnvelopeFollower;
use crate::{Processor, ProcessorConfig};

/// Fallback when a caller hands the meter an unusable rate
const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Linear band levels for one channel, in [`FilterType`] ordinal order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandLevels([Sample; FilterType::COUNT]);

impl BandLevels {
    /// All-zero levels, returned for channels that do not exist
    pub const SILENT: Self = Self([0.0; FilterType::COUNT]);

    /// Level of one band
    #[inline]
    pub fn band(&self, band: FilterType) -> Sample {
        self.0[band.index()]
    }

    /// Full-band (bypass) level, the default level of a channel
    #[inline]
    pub fn full(&self) -> Sample {
        self.0[FilterType::Bypass.index()]
    }
}

impl std::ops::Index<FilterType> for BandLevels {
    type Output = Sample;

    fn index(&self, band: FilterType) -> &Sample {
        &self.0[band.index()]
    }
}

/// Metering state for one channel
#[derive(Debug, Clone)]
struct ChannelMeter {
    bank: FilterBank,
    followers: [EnvelopeFollower; FilterType::COUNT],
}

impl ChannelMeter {
    fn new(sample_rate: u32) -> Self {
        Self {
            bank: FilterBank::new(sample_rate),
            followers: std::array::from_fn(|_| EnvelopeFollower::new(sample_rate)),
        }
    }

    #[inline]
    fn process(&mut self, sample: Sample) {
        let bands = self.bank.process_sample(sample);
        for (follower, band) in self.followers.iter_mut().zip(bands) {
            follower.process(band);
        }
    }

    fn levels(&self) -> BandLevels {
        BandLevels(std::array::from_fn(|band| self.followers[band].level()))
    }
}

/// Multi-band level meter over N interleaved channels
#[derive(Debug)]
pub struct LevelMeter {
    channels: Vec<ChannelMeter>,
    sample_rate: u32,
}

impl LevelMeter {
    /// Allocates one filter bank and four envelope followers per channel.
    /// All filter state starts at silence.
    pub fn new(channel_count: usize, sample_rate: u32) -> Self {
        let sample_rate = if sample_rate > 0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        log::debug!("level meter: {channel_count} channels @ {sample_rate} Hz");

        Self {
            channels: (0..channel_count)
                .map(|_| ChannelMeter::new(sample_rate))
                .collect(),
            sample_rate,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Consume one drained block: demultiplex each sample by index modulo
    /// channel count, run it through that channel's filters and feed the
    /// band outputs into the channel's followers.
    ///
    /// A trailing partial frame is processed as far as it goes.
    pub fn process_interleaved(&mut self, block: &[Sample]) {
        let channel_count = self.channels.len();
        if channel_count == 0 {
            return;
        }
        for (index, &sample) in block.iter().enumerate() {
            self.channels[index % channel_count].process(sample);
        }
    }

    /// Current band levels of a channel; out-of-range channels read silent
    pub fn level(&self, channel: usize) -> BandLevels {
        self.channels
            .get(channel)
            .map(ChannelMeter::levels)
            .unwrap_or(BandLevels::SILENT)
    }
}

impl Processor for LevelMeter {
    fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.bank.reset();
            for follower in &mut channel.followers {
                follower.reset();
            }
        }
    }
}

impl ProcessorConfig for LevelMeter {
    /// Retunes every filter for subsequent samples. State accumulated at
    /// the old rate is not cleared, so levels are briefly computed against
    /// stale history; call [`Processor::reset`] if the discontinuity
    /// matters.
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        for channel in &mut self.channels {
            channel.bank.set_sample_rate(sample_rate);
            for follower in &mut channel.followers {
                follower.set_sample_rate(sample_rate);
            }
        }
    }
}
