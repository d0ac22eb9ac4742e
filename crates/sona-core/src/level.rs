//! Linear amplitude to dBFS conversion

use crate::Sample;

/// Amplitude floor for dB conversion.
///
/// Clamping the input here keeps `dbfs(0.0)` at a finite large-negative
/// value ([`SILENCE_DB`]) instead of producing -inf or NaN, so silent
/// channels read as silence rather than poisoning downstream math.
pub const MIN_AMPLITUDE: Sample = 1e-10;

/// dBFS value that [`MIN_AMPLITUDE`] maps to; the floor of every conversion
pub const SILENCE_DB: Sample = -200.0;

/// Convert linear amplitude to decibels relative to full scale
#[inline]
pub fn dbfs(amplitude: Sample) -> Sample {
    20.0 * amplitude.max(MIN_AMPLITUDE).log10()
}

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub Sample);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const SILENCE: Self = Self(SILENCE_DB);

    #[inline]
    pub fn from_amplitude(amplitude: Sample) -> Self {
        Self(dbfs(amplitude))
    }

    #[inline]
    pub fn to_amplitude(self) -> Sample {
        if self.0 <= SILENCE_DB {
            0.0
        } else {
            10.0_f32.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
