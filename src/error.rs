//! Errors returned by the estimators and the note converter.
//!
//! Silence, an estimator that finds no acceptable lag, and frequencies
//! outside the supported range are *not* errors: they surface as `Ok(None)`.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitchError {
    /// The note name is not one of the twelve entries of the note table.
    #[error("unknown note name `{0}`")]
    InvalidNote(String),

    /// A frequency handed to the note converter was zero, negative or not finite.
    #[error("frequency must be finite and positive, got {0}")]
    InvalidFrequency(f64),

    #[error("sample rate must be positive")]
    InvalidSampleRate,

    /// The frame contains a NaN or infinite sample.
    #[error("non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("configuration error: {0}")]
    Configuration(String),
}
