//! Per-tick level tracker
//!
//! Derives the two scalars parameter-binding adapters consume: a normalized
//! 0-1 level and the current gain in dB. Auto-gain follows the loudest peak
//! seen so far with a slow decay, so the normalized level stays usable
//! across quiet and loud program material without manual trimming.

use sona_core::{Decibels, Sample};
use sona_dsp::bank::FilterType;

use crate::AudioCapture;

/// Decay rate of the held auto-gain peak, dB per second
const PEAK_DECAY_DB_PER_SEC: f32 = 0.6;

/// The held peak never decays below this, bounding auto-gain at +48 dB so
/// long silence cannot wind the gain up into noise
const PEAK_FLOOR_DB: f32 = -48.0;

/// Tracker configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TrackerConfig {
    /// Channel to follow
    pub channel: usize,
    /// Band to follow
    pub band: FilterType,
    /// Dynamic-range window below full scale mapped onto 0..1, in dB
    pub dynamic_range_db: f32,
    /// Adapt gain to the held peak; when false, `input_gain_db` applies
    pub auto_gain: bool,
    /// Manual input gain in dB, ignored under auto-gain
    pub input_gain_db: f32,
    /// Maximum fall of the normalized level, units per second
    pub fall_speed: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            band: FilterType::Bypass,
            dynamic_range_db: 12.0,
            auto_gain: true,
            input_gain_db: 0.0,
            fall_speed: 2.0,
        }
    }
}

/// Follows one channel/band of an [`AudioCapture`] and republishes the
/// derived scalars once per tick.
#[derive(Debug)]
pub struct LevelTracker {
    config: TrackerConfig,
    /// Held peak in dBFS; the auto-gain reference
    peak_db: f32,
    normalized: f32,
}

impl LevelTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            peak_db: 0.0,
            normalized: 0.0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Gain in dB applied before normalization: the inverse of the held
    /// peak under auto-gain, the configured input gain otherwise.
    pub fn current_gain(&self) -> f32 {
        if self.config.auto_gain {
            -self.peak_db
        } else {
            self.config.input_gain_db
        }
    }

    /// [`current_gain`](Self::current_gain) as a linear amplitude factor,
    /// for adapters that multiply rather than add in dB
    pub fn current_gain_amplitude(&self) -> Sample {
        Decibels(self.current_gain()).to_amplitude()
    }

    /// Normalized 0-1 level published at the last update
    pub fn normalized_level(&self) -> f32 {
        self.normalized
    }

    /// Recompute both scalars from the capture's current levels. `dt` is
    /// the time elapsed since the previous update, in seconds (one tick).
    pub fn update(&mut self, capture: &AudioCapture, dt: f32) {
        if !capture.is_ready() {
            self.fall_toward(0.0, dt);
            return;
        }

        let input_db = capture.channel_band_level(self.config.channel, self.config.band);

        if self.config.auto_gain {
            self.peak_db = (self.peak_db - PEAK_DECAY_DB_PER_SEC * dt).max(PEAK_FLOOR_DB);
            if input_db > self.peak_db {
                self.peak_db = input_db;
            }
        }

        let target = normalize(input_db + self.current_gain(), self.config.dynamic_range_db);
        if target >= self.normalized {
            self.normalized = target;
        } else {
            self.fall_toward(target, dt);
        }
    }

    fn fall_toward(&mut self, target: f32, dt: f32) {
        self.normalized = (self.normalized - self.config.fall_speed * dt).max(target);
    }
}

/// Map a gained dBFS value through a window of `dynamic_range_db` below
/// full scale onto 0..1
fn normalize(gained_db: Sample, dynamic_range_db: f32) -> f32 {
    (1.0 + gained_db / dynamic_range_db).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureConfig;
    use approx::assert_relative_eq;

    fn capture_with_signal(amplitude: Sample, frames: usize) -> AudioCapture {
        let mut capture = AudioCapture::new(CaptureConfig::default());
        capture.start(48_000).unwrap();
        let source = capture.source();
        source.write(&vec![amplitude; frames], 1);
        capture.tick();
        capture
    }

    #[test]
    fn normalized_level_stays_in_unit_range() {
        let capture = capture_with_signal(1.0, 4_800);
        let mut tracker = LevelTracker::new(TrackerConfig::default());

        tracker.update(&capture, 0.016);
        let level = tracker.normalized_level();
        assert!((0.0..=1.0).contains(&level));
        assert!(level > 0.9, "full-scale input should read hot: {level}");
    }

    #[test]
    fn not_ready_reads_as_silence() {
        let mut capture = AudioCapture::new(CaptureConfig::default());
        capture.start(48_000).unwrap();
        let mut tracker = LevelTracker::new(TrackerConfig::default());

        tracker.update(&capture, 0.016);
        assert_eq!(tracker.normalized_level(), 0.0);
    }

    #[test]
    fn auto_gain_adapts_to_quiet_material() {
        let mut capture = AudioCapture::new(CaptureConfig::default());
        capture.start(48_000).unwrap();
        let source = capture.source();
        let mut tracker = LevelTracker::new(TrackerConfig::default());

        // A -30 dBFS signal, long simulated ticks so the held peak decays
        // down to meet it.
        for _ in 0..10 {
            source.write(&vec![0.0316; 4_800], 1);
            capture.tick();
            tracker.update(&capture, 10.0);
        }

        assert!(
            tracker.current_gain() > 20.0,
            "gain should wind up toward the quiet peak: {}",
            tracker.current_gain()
        );
        assert!(
            tracker.normalized_level() > 0.8,
            "adapted level should read hot: {}",
            tracker.normalized_level()
        );
    }

    #[test]
    fn manual_gain_is_reported_verbatim() {
        let capture = capture_with_signal(0.5, 4_800);
        let mut tracker = LevelTracker::new(TrackerConfig {
            auto_gain: false,
            input_gain_db: 6.0,
            ..TrackerConfig::default()
        });

        tracker.update(&capture, 0.016);
        assert_eq!(tracker.current_gain(), 6.0);
        assert_relative_eq!(tracker.current_gain_amplitude(), 1.9953, epsilon = 1e-3);
    }

    #[test]
    fn fall_speed_limits_downward_slew() {
        let mut capture = capture_with_signal(1.0, 4_800);
        let mut tracker = LevelTracker::new(TrackerConfig {
            auto_gain: false,
            ..TrackerConfig::default()
        });
        tracker.update(&capture, 0.016);
        assert!(tracker.normalized_level() > 0.9);

        // One tick of silence: the envelope collapses much faster than the
        // published level is allowed to fall.
        let source = capture.source();
        source.write(&vec![0.0; 4_800], 1);
        capture.tick();
        tracker.update(&capture, 0.1);

        assert_relative_eq!(tracker.normalized_level(), 0.8, epsilon = 0.05);
    }
}
