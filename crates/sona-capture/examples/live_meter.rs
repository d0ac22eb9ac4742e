//! Live capture demo: meters the default input device once per frame.
//!
//! Stands in for the two host boundaries the library expects: a cpal input
//! stream plays the real-time producer, and a 30 Hz loop plays the frame
//! scheduler driving the consumer tick.
//!
//! Run with `RUST_LOG=debug cargo run --example live_meter` to also see the
//! capture lifecycle events.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use sona_capture::{AudioCapture, CaptureConfig, LevelTracker, TrackerConfig};
use sona_dsp::bank::FilterType;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("no default input device")?;
    let supported = device.default_input_config()?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err(format!("unsupported sample format {:?}", supported.sample_format()).into());
    }
    let sample_rate = supported.sample_rate();
    let channel_count = supported.channels() as usize;

    let mut capture = AudioCapture::new(CaptureConfig::default());
    capture.start(sample_rate)?;
    let source = capture.source();

    let stream = device.build_input_stream(
        &supported.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| source.write(data, channel_count),
        |err| log::error!("stream error: {err}"),
        None,
    )?;
    stream.play()?;

    let mut tracker = LevelTracker::new(TrackerConfig::default());
    let tick = Duration::from_millis(33);
    loop {
        std::thread::sleep(tick);
        capture.tick();
        tracker.update(&capture, tick.as_secs_f32());

        if !capture.is_ready() {
            println!("waiting for audio...");
            continue;
        }

        print!("{} ch @ {} Hz |", capture.channel_count(), capture.sample_rate());
        for channel in 0..capture.channel_count() as usize {
            print!(" ch{channel} {:7.1} dB", capture.channel_level(channel));
        }
        println!(
            " | low {:7.1} dB | level {:.2} | gain {:+5.1} dB",
            capture.channel_band_level(0, FilterType::LowPass),
            tracker.normalized_level(),
            tracker.current_gain(),
        );
    }
}
