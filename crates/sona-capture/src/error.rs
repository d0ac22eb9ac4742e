//! Capture error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
