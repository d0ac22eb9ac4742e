//! Double-buffered sample ingest
//!
//! The producer (audio callback) appends into a fill buffer; the consumer
//! exchanges the pair once per tick and drains the ready side. One mutex
//! guards the fill side together with the producer-observed channel count,
//! and is the only synchronization primitive between the two contexts.
//! Neither critical section does per-sample work: the producer side is a
//! bulk append plus scalar writes, the consumer side a pointer swap plus a
//! clear.

use parking_lot::Mutex;
use sona_core::Sample;

/// Channel count sentinel before the first callback has been observed
pub const CHANNELS_UNKNOWN: i32 = -1;

/// Divisor applied to the guard rate ceiling: the fill side may hold at
/// most 1/4 second of audio per channel before the overflow guard clears it
const GUARD_WINDOW_DIV: u32 = 4;

/// Result of one swap-and-drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Channel count most recently observed by the producer, as of the swap
    pub channel_count: i32,
    /// Samples discarded by the overflow guard since the previous drain
    pub dropped_samples: u64,
}

#[derive(Debug)]
struct FillSide {
    fill: Vec<Sample>,
    channel_count: i32,
    dropped_samples: u64,
}

/// Double-buffered store moving samples from the audio callback to the
/// tick consumer.
///
/// The pair is this mutex-guarded fill vector plus the consumer-owned
/// ready vector handed to [`swap_and_drain`](Self::swap_and_drain); their
/// roles flip atomically under the lock, and the vector that becomes the
/// new fill target is cleared (capacity retained) before the lock drops.
#[derive(Debug)]
pub struct IngestBuffer {
    shared: Mutex<FillSide>,
    guard_rate_ceiling: u32,
}

impl IngestBuffer {
    /// `initial_capacity` pre-sizes the fill side so steady-state appends
    /// do not allocate; `guard_rate_ceiling` bounds growth when the
    /// consumer stalls (e.g. the host application is paused).
    pub fn new(initial_capacity: usize, guard_rate_ceiling: u32) -> Self {
        Self {
            shared: Mutex::new(FillSide {
                fill: Vec::with_capacity(initial_capacity),
                channel_count: CHANNELS_UNKNOWN,
                dropped_samples: 0,
            }),
            guard_rate_ceiling,
        }
    }

    /// Append one callback's interleaved samples (producer context).
    ///
    /// Records `channel_count` as the latest observed value, overwriting
    /// whatever a previous callback reported. The slice only needs to stay
    /// valid for the duration of the call; it is appended in bulk without
    /// an intermediate allocation.
    ///
    /// If the consumer has stalled long enough for the fill side to exceed
    /// the guard bound, the buffered audio is dropped in favor of bounded
    /// memory. The bound derives from the channel count of this call, so a
    /// mid-accumulation channel change makes it approximate.
    pub fn push(&self, samples: &[Sample], channel_count: usize) {
        let mut shared = self.shared.lock();
        shared.channel_count = channel_count as i32;
        shared.fill.extend_from_slice(samples);

        let bound = channel_count.max(1) * (self.guard_rate_ceiling / GUARD_WINDOW_DIV) as usize;
        if shared.fill.len() > bound {
            shared.dropped_samples += shared.fill.len() as u64;
            shared.fill.clear();
        }
    }

    /// Exchange the fill side with `ready` and clear the new fill side
    /// (consumer context).
    ///
    /// After the call, `ready` holds every sample pushed since the previous
    /// drain in push order; its previous contents become the cleared fill
    /// target. With no intervening push, `ready` comes back empty and the
    /// pair is unchanged.
    pub fn swap_and_drain(&self, ready: &mut Vec<Sample>) -> DrainOutcome {
        let mut shared = self.shared.lock();
        std::mem::swap(&mut shared.fill, ready);
        shared.fill.clear();

        DrainOutcome {
            channel_count: shared.channel_count,
            dropped_samples: std::mem::take(&mut shared.dropped_samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ingest() -> IngestBuffer {
        IngestBuffer::new(64, 48_000)
    }

    #[test]
    fn drains_exact_concatenation_in_order() {
        let ingest = ingest();
        ingest.push(&[1.0, 2.0], 2);
        ingest.push(&[3.0, 4.0, 5.0, 6.0], 2);

        let mut ready = Vec::new();
        let outcome = ingest.swap_and_drain(&mut ready);

        assert_eq!(ready, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(outcome.channel_count, 2);
        assert_eq!(outcome.dropped_samples, 0);
    }

    #[test]
    fn no_sample_appears_in_two_drains() {
        let ingest = ingest();
        let mut ready = Vec::new();

        ingest.push(&[1.0], 1);
        ingest.swap_and_drain(&mut ready);
        assert_eq!(ready, [1.0]);

        ingest.push(&[2.0], 1);
        ingest.swap_and_drain(&mut ready);
        assert_eq!(ready, [2.0]);

        ingest.swap_and_drain(&mut ready);
        assert!(ready.is_empty());
    }

    #[test]
    fn empty_drain_is_idempotent() {
        let ingest = ingest();

        // Stale consumer contents are discarded, not replayed.
        let mut ready = vec![9.0, 9.0];
        let first = ingest.swap_and_drain(&mut ready);
        assert!(ready.is_empty());
        assert_eq!(first.channel_count, CHANNELS_UNKNOWN);

        let second = ingest.swap_and_drain(&mut ready);
        assert!(ready.is_empty());
        assert_eq!(second, first);
    }

    #[test]
    fn channel_count_becomes_visible_at_the_next_drain() {
        let ingest = ingest();
        let mut ready = Vec::new();

        assert_eq!(
            ingest.swap_and_drain(&mut ready).channel_count,
            CHANNELS_UNKNOWN
        );

        ingest.push(&[0.0; 4], 2);
        assert_eq!(ingest.swap_and_drain(&mut ready).channel_count, 2);

        // The latest observation wins, with no averaging or validation.
        ingest.push(&[0.0; 4], 2);
        ingest.push(&[0.0; 6], 6);
        assert_eq!(ingest.swap_and_drain(&mut ready).channel_count, 6);
    }

    #[test]
    fn overflow_guard_truncates_and_counts() {
        // Bound for one channel: 48_000 / 4 = 12_000 samples.
        let ingest = ingest();
        let chunk = vec![0.25; 5_000];
        ingest.push(&chunk, 1);
        ingest.push(&chunk, 1);
        ingest.push(&chunk, 1);

        let mut ready = Vec::new();
        let outcome = ingest.swap_and_drain(&mut ready);
        assert!(ready.is_empty(), "overflowing fill must be cleared");
        assert_eq!(outcome.dropped_samples, 15_000);

        // The counter resets once reported.
        ingest.push(&chunk, 1);
        let outcome = ingest.swap_and_drain(&mut ready);
        assert_eq!(ready.len(), 5_000);
        assert_eq!(outcome.dropped_samples, 0);
    }

    #[test]
    fn producer_thread_handoff_accounts_for_every_sample() {
        let ingest = Arc::new(IngestBuffer::new(1_024, 48_000));
        let producer = {
            let ingest = Arc::clone(&ingest);
            std::thread::spawn(move || {
                for value in 0..1_000u32 {
                    ingest.push(&[value as Sample, value as Sample], 2);
                }
            })
        };

        let mut ready = Vec::new();
        let mut drained = 0u64;
        let mut dropped = 0u64;
        while drained + dropped < 2_000 {
            let outcome = ingest.swap_and_drain(&mut ready);
            drained += ready.len() as u64;
            dropped += outcome.dropped_samples;
        }
        producer.join().unwrap();

        assert_eq!(drained + dropped, 2_000);
    }
}
