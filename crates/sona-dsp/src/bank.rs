//! Fixed four-band filter bank
//!
//! Every metered channel owns one bank: a bypass tap plus low-pass,
//! band-pass and high-pass sections fed the same input in parallel. The
//! band set is closed; ordinals are stable and index the per-channel level
//! arrays.

use sona_core::Sample;

use crate::biquad::{Biquad, BiquadCoeffs};
use crate::{MonoProcessor, Processor, ProcessorConfig};

/// The four metered bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FilterType {
    /// Unfiltered full-band signal
    #[default]
    Bypass,
    LowPass,
    BandPass,
    HighPass,
}

impl FilterType {
    /// Number of bands
    pub const COUNT: usize = 4;

    /// All bands in ordinal order
    pub const ALL: [FilterType; Self::COUNT] = [
        FilterType::Bypass,
        FilterType::LowPass,
        FilterType::BandPass,
        FilterType::HighPass,
    ];

    /// Stable ordinal of this band
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Corner frequency of the low-pass band (Hz)
pub const LOW_PASS_HZ: f64 = 800.0;
/// Center frequency of the band-pass band (Hz)
pub const BAND_PASS_HZ: f64 = 2_500.0;
/// Corner frequency of the high-pass band (Hz)
pub const HIGH_PASS_HZ: f64 = 8_000.0;

/// Butterworth Q for the corner filters
const CORNER_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;
/// Wider Q for the band-pass so the mid band reacts to more program material
const BAND_Q: f64 = 0.5;

/// One channel's four parallel filters, addressed by [`FilterType`] ordinal
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: [Biquad; FilterType::COUNT],
    sample_rate: u32,
}

impl FilterBank {
    pub fn new(sample_rate: u32) -> Self {
        let mut bank = Self {
            filters: std::array::from_fn(|_| Biquad::new(BiquadCoeffs::bypass())),
            sample_rate,
        };
        bank.retune();
        bank
    }

    /// Run one input sample through all four filters, returning the band
    /// outputs in [`FilterType`] ordinal order.
    #[inline]
    pub fn process_sample(&mut self, input: Sample) -> [Sample; FilterType::COUNT] {
        let mut outputs = [0.0; FilterType::COUNT];
        for (filter, output) in self.filters.iter_mut().zip(outputs.iter_mut()) {
            *output = filter.process_sample(input);
        }
        outputs
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn retune(&mut self) {
        let sr = f64::from(self.sample_rate);
        self.filters[FilterType::Bypass.index()].set_coeffs(BiquadCoeffs::bypass());
        self.filters[FilterType::LowPass.index()]
            .set_coeffs(BiquadCoeffs::low_pass(LOW_PASS_HZ, CORNER_Q, sr));
        self.filters[FilterType::BandPass.index()]
            .set_coeffs(BiquadCoeffs::band_pass(BAND_PASS_HZ, BAND_Q, sr));
        self.filters[FilterType::HighPass.index()]
            .set_coeffs(BiquadCoeffs::high_pass(HIGH_PASS_HZ, CORNER_Q, sr));
    }
}

impl Processor for FilterBank {
    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}

impl ProcessorConfig for FilterBank {
    /// Retune every section. Recursive state is kept; anything accumulated
    /// at the old rate decays at the filters' own time constants.
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.retune();
    }
}
