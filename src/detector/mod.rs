use crate::detector::internals::Pitch;
use crate::error::PitchError;
use crate::float::Float;

pub mod autocorrelation;
pub mod hps;
pub mod internals;
pub mod pyin;
pub mod yin;

/// Lowest supported fundamental, A0.
pub const MIN_FREQUENCY: f64 = 27.5;
/// Highest supported fundamental, C8.
pub const MAX_FREQUENCY: f64 = 4186.0;

/// The closed interval of frequencies a detector may report. Anything outside
/// is discarded rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    pub fn new(min: f64, max: f64) -> Result<Self, PitchError> {
        if !(min > 0.0 && min < max && max.is_finite()) {
            return Err(PitchError::Configuration(format!(
                "invalid frequency range {min}..={max}"
            )));
        }
        Ok(FrequencyRange { min, max })
    }

    pub fn contains<T: Float>(&self, frequency: T) -> bool {
        frequency
            .to_f64()
            .map_or(false, |f| f >= self.min && f <= self.max)
    }
}

impl Default for FrequencyRange {
    fn default() -> Self {
        FrequencyRange {
            min: MIN_FREQUENCY,
            max: MAX_FREQUENCY,
        }
    }
}

/// A single-frame fundamental frequency estimator.
///
/// Detectors hold only configuration, so one instance can serve any number of
/// frames and threads. `Ok(None)` means the search finished without an
/// acceptable candidate; `Err` is reserved for frames the detector cannot
/// process at all.
pub trait PitchDetector<T>: Send + Sync
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>, PitchError>;

    /// Short identifier used in logs and results.
    fn name(&self) -> &'static str;
}
