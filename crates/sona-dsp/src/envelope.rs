//! Attack/release envelope follower
//!
//! Turns rectified sample magnitude into a slowly varying level: a separate
//! one-pole time constant for each direction lets the level snap up on
//! transients and fall smoothly afterwards, so consumers polling once per
//! tick see a continuous signal rather than per-sample jumps.

use sona_core::Sample;

use crate::{Processor, ProcessorConfig};

/// Default attack time in seconds
pub const DEFAULT_ATTACK_SECS: f32 = 0.010;
/// Default release time in seconds
pub const DEFAULT_RELEASE_SECS: f32 = 0.150;

/// Decayed-peak follower with asymmetric smoothing
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: Sample,
    attack_secs: f32,
    release_secs: f32,
    attack_coeff: Sample,
    release_coeff: Sample,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_times(sample_rate, DEFAULT_ATTACK_SECS, DEFAULT_RELEASE_SECS)
    }

    pub fn with_times(sample_rate: u32, attack_secs: f32, release_secs: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_secs,
            release_secs,
            attack_coeff: 1.0,
            release_coeff: 1.0,
        };
        follower.set_sample_rate(sample_rate);
        follower
    }

    /// Feed one (filtered) sample; returns the updated envelope
    #[inline]
    pub fn process(&mut self, input: Sample) -> Sample {
        let magnitude = input.abs();
        let coeff = if magnitude > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += coeff * (magnitude - self.envelope);
        self.envelope
    }

    /// Current envelope value in linear amplitude
    #[inline]
    pub fn level(&self) -> Sample {
        self.envelope
    }
}

/// One-pole coefficient reaching ~63% of a step in `secs`
fn time_coeff(secs: f32, sample_rate: u32) -> Sample {
    if secs <= 0.0 {
        1.0
    } else {
        1.0 - (-1.0 / (secs * sample_rate as f32)).exp()
    }
}

impl Processor for EnvelopeFollower {
    fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

impl ProcessorConfig for EnvelopeFollower {
    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.attack_coeff = time_coeff(self.attack_secs, sample_rate);
        self.release_coeff = time_coeff(self.release_secs, sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_under_signal() {
        let mut follower = EnvelopeFollower::new(48_000);

        for _ in 0..2_000 {
            follower.process(0.5);
        }
        assert!(follower.level() > 0.4, "got {}", follower.level());
    }

    #[test]
    fn falls_in_silence() {
        let mut follower = EnvelopeFollower::new(48_000);

        for _ in 0..2_000 {
            follower.process(0.8);
        }
        let peak = follower.level();

        for _ in 0..20_000 {
            follower.process(0.0);
        }
        assert!(follower.level() < peak * 0.2, "got {}", follower.level());
    }

    #[test]
    fn attack_is_faster_than_release() {
        let mut follower = EnvelopeFollower::new(48_000);

        // One attack window of signal...
        for _ in 0..480 {
            follower.process(1.0);
        }
        let risen = follower.level();

        // ...then the same duration of silence barely dents the level.
        for _ in 0..480 {
            follower.process(0.0);
        }
        let fallen = risen - follower.level();
        assert!(risen > 0.6, "attack too slow: {risen}");
        assert!(fallen < risen * 0.2, "release too fast: fell {fallen}");
    }

    #[test]
    fn rectifies_negative_input() {
        let mut follower = EnvelopeFollower::new(48_000);

        for _ in 0..2_000 {
            follower.process(-0.5);
        }
        assert!(follower.level() > 0.4);
    }
}
