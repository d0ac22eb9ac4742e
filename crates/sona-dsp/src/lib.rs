//! sona-dsp: Signal-processing building blocks for the Sona capture engine
//!
//! ## Modules
//! - `biquad` - TDF-II biquad sections (low-pass, band-pass, high-pass)
//! - `bank` - the fixed four-band filter bank addressed by `FilterType`
//! - `envelope` - attack/release envelope follower
//! - `meter` - per-channel multi-band level meter

pub mod bank;
pub mod biquad;
pub mod envelope;
pub mod meter;

use sona_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples in place
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Processor configuration for sample rate changes
pub trait ProcessorConfig {
    fn set_sample_rate(&mut self, sample_rate: u32);
}
