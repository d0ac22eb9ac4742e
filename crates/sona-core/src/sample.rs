//! Sample type and interleaved-buffer helpers

/// Type alias for audio samples (f32, the host callback's PCM format)
pub type Sample = f32;

/// Number of whole frames in an interleaved buffer
#[inline]
pub fn frame_count(samples: usize, channel_count: usize) -> usize {
    if channel_count == 0 {
        0
    } else {
        samples / channel_count
    }
}

/// Iterate one channel of an interleaved buffer.
///
/// Yields `interleaved[channel]`, `interleaved[channel + channel_count]`, and
/// so on.
/// A channel at or beyond `channel_count` yields nothing.
pub fn channel_samples(
    interleaved: &[Sample],
    channel: usize,
    channel_count: usize,
) -> impl Iterator<Item = Sample> + '_ {
    let take = if channel < channel_count { usize::MAX } else { 0 };
    interleaved
        .iter()
        .skip(channel)
        .step_by(channel_count.max(1))
        .take(take)
        .copied()
}
