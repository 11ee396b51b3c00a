//! Picks one pitch per frame from an ordered chain of detectors.
//!
//! The frame first has to pass a signal-strength gate. The detectors are then asked in
//! order and the first in-range answer wins. How much the answer is trusted depends on
//! the stage that produced it, see [ConfidencePolicy].

use crate::detector::autocorrelation::AutocorrelationDetector;
use crate::detector::internals::get_power_level;
use crate::detector::pyin::ProbabilisticYinDetector;
use crate::detector::{FrequencyRange, PitchDetector};
use crate::error::PitchError;
use crate::float::Float;
use crate::note::{frequency_to_note, NoteInfo};

/// Frames with a lower RMS amplitude are treated as silence.
pub const SILENCE_THRESHOLD: f64 = 0.01;
/// Confidence awarded to the autocorrelation fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidencePolicy {
    /// Use the detector's own clarity.
    Reported,
    /// Always report this value, whatever the detector says.
    Fixed(f64),
}

/// The selector's answer for one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetectionResult {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub note: NoteInfo,
    pub confidence: f64,
    /// [PitchDetector::name] of the stage that produced the estimate.
    pub estimator: &'static str,
}

struct Stage<T: Float> {
    detector: Box<dyn PitchDetector<T>>,
    confidence: ConfidencePolicy,
}

pub struct PitchSelector<T>
where
    T: Float,
{
    stages: Vec<Stage<T>>,
    silence_threshold: f64,
    range: FrequencyRange,
}

impl<T> PitchSelector<T>
where
    T: Float,
{
    /// Probabilistic YIN first, then the autocorrelation fallback at a fixed confidence.
    pub fn new() -> Self {
        Self::empty()
            .with_stage(
                Box::new(ProbabilisticYinDetector::default()),
                ConfidencePolicy::Reported,
            )
            .with_stage(
                Box::new(AutocorrelationDetector::new()),
                ConfidencePolicy::Fixed(FALLBACK_CONFIDENCE),
            )
    }

    /// A selector without stages; it never detects anything until stages are added.
    pub fn empty() -> Self {
        PitchSelector {
            stages: Vec::new(),
            silence_threshold: SILENCE_THRESHOLD,
            range: FrequencyRange::default(),
        }
    }

    /// Append a detector to the end of the chain.
    pub fn with_stage(
        mut self,
        detector: Box<dyn PitchDetector<T>>,
        confidence: ConfidencePolicy,
    ) -> Self {
        self.stages.push(Stage {
            detector,
            confidence,
        });
        self
    }

    pub fn with_silence_threshold(mut self, silence_threshold: f64) -> Self {
        self.silence_threshold = silence_threshold;
        self
    }

    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.range = range;
        self
    }

    /// Estimate the pitch of one frame.
    ///
    /// Returns `Ok(None)` for silent frames and when no stage finds an in-range pitch.
    /// A failing stage is skipped unless it is the last one, whose error is returned.
    pub fn estimate(
        &self,
        signal: &[T],
        sample_rate: usize,
    ) -> Result<Option<DetectionResult>, PitchError> {
        if sample_rate == 0 {
            return Err(PitchError::InvalidSampleRate);
        }
        let rms = get_power_level(signal);
        if signal.is_empty() || rms < T::from_f64(self.silence_threshold).unwrap() {
            log::debug!("silent frame (rms {}), skipping detection", rms);
            return Ok(None);
        }

        let last = self.stages.len().saturating_sub(1);
        for (i, stage) in self.stages.iter().enumerate() {
            let name = stage.detector.name();
            let pitch = match stage.detector.get_pitch(signal, sample_rate) {
                Ok(pitch) => pitch,
                Err(e) if i < last => {
                    log::warn!("{} failed: {}, falling back", name, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(pitch) = pitch else {
                log::debug!("{} found no pitch", name);
                continue;
            };
            if !self.range.contains(pitch.frequency) {
                log::debug!("{} reported {} Hz, outside the range", name, pitch.frequency);
                continue;
            }

            let frequency = pitch.frequency.to_f64().unwrap();
            let confidence = match stage.confidence {
                ConfidencePolicy::Reported => pitch.clarity.to_f64().unwrap(),
                ConfidencePolicy::Fixed(confidence) => confidence,
            };
            return Ok(Some(DetectionResult {
                note: frequency_to_note(frequency)?,
                confidence: confidence.clamp(0.0, 1.0),
                estimator: name,
            }));
        }
        Ok(None)
    }
}

impl<T> Default for PitchSelector<T>
where
    T: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate the pitch of `samples` with the default [PitchSelector].
///
/// Probabilistic YIN analyzes 2048-sample frames and cannot see periods longer than
/// 1022 samples, about 43 Hz at 44.1 kHz. Lower notes are left to the autocorrelation
/// fallback, which needs roughly 4096 samples (0.093 s at 44.1 kHz) to find them, so
/// a 0.05 s frame of a tone below about 43 Hz gives no detection.
pub fn estimate_pitch<T: Float>(
    samples: &[T],
    sample_rate: usize,
) -> Result<Option<DetectionResult>, PitchError> {
    PitchSelector::new().estimate(samples, sample_rate)
}
