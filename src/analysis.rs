//! Offline comparison of the estimators over a whole recording.
//!
//! A frame slides over the samples; every frame is handed to the simple autocorrelation
//! detector, classic YIN and the harmonic product spectrum independently, and the
//! per-method results can then be summarized with [method_stats].

use crate::detector::autocorrelation::AutocorrelationDetector;
use crate::detector::hps::HpsDetector;
use crate::detector::internals::{get_power_level, validate_signal, Pitch};
use crate::detector::yin::YINDetector;
use crate::detector::PitchDetector;
use crate::error::PitchError;
use crate::float::Float;
use crate::note::{frequency_to_note, NoteInfo};
use crate::selector::SILENCE_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Method {
    Autocorrelation,
    Yin,
    Hps,
}

pub const METHODS: [Method; 3] = [Method::Autocorrelation, Method::Yin, Method::Hps];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonConfig {
    pub frame_size: usize,
    pub hop_size: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        ComparisonConfig {
            frame_size: 4096,
            hop_size: 2048,
        }
    }
}

/// Estimates of every method for the frame starting at `time` seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameComparison {
    pub time: f64,
    pub autocorrelation: Option<f64>,
    pub yin: Option<f64>,
    pub hps: Option<f64>,
}

impl FrameComparison {
    pub fn get(&self, method: Method) -> Option<f64> {
        match method {
            Method::Autocorrelation => self.autocorrelation,
            Method::Yin => self.yin,
            Method::Hps => self.hps,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MethodStats {
    pub method: Method,
    /// Fraction of frames with a detection, in `[0, 1]`.
    pub detection_rate: f64,
    pub mean_frequency: Option<f64>,
    /// Population standard deviation of the detected frequencies.
    pub std_frequency: Option<f64>,
    pub mean_note: Option<NoteInfo>,
}

/// Run every method over frames of `samples`. Only frames that fit entirely in the
/// recording are analyzed.
pub fn compare_methods<T: Float>(
    samples: &[T],
    sample_rate: usize,
    config: ComparisonConfig,
) -> Result<Vec<FrameComparison>, PitchError> {
    if config.frame_size == 0 || config.hop_size == 0 {
        return Err(PitchError::Configuration(
            "frame_size and hop_size must be positive".into(),
        ));
    }
    validate_signal(samples, sample_rate)?;

    let autocorrelation = AutocorrelationDetector::simple();
    let yin = YINDetector::default();
    let hps = HpsDetector::default();
    let silence = T::from_f64(SILENCE_THRESHOLD).unwrap();
    let to_hz = |pitch: Option<Pitch<T>>| pitch.and_then(|p| p.frequency.to_f64());

    let frame_count = if samples.len() > config.frame_size {
        (samples.len() - config.frame_size - 1) / config.hop_size + 1
    } else {
        0
    };
    log::debug!(
        "comparing methods over {} frames of {} samples",
        frame_count,
        config.frame_size
    );

    (0..frame_count)
        .map(|i| {
            let start = i * config.hop_size;
            let frame = &samples[start..start + config.frame_size];
            // Only the autocorrelation method carries its own silence gate.
            let autocorrelation = if get_power_level(frame) < silence {
                None
            } else {
                to_hz(autocorrelation.get_pitch(frame, sample_rate)?)
            };
            Ok(FrameComparison {
                time: start as f64 / sample_rate as f64,
                autocorrelation,
                yin: to_hz(yin.get_pitch(frame, sample_rate)?),
                hps: to_hz(hps.get_pitch(frame, sample_rate)?),
            })
        })
        .collect()
}

/// Summarize one method's column of `frames`.
pub fn method_stats(frames: &[FrameComparison], method: Method) -> MethodStats {
    let detected: Vec<f64> = frames.iter().filter_map(|f| f.get(method)).collect();
    let detection_rate = if frames.is_empty() {
        0.0
    } else {
        detected.len() as f64 / frames.len() as f64
    };

    let (mean_frequency, std_frequency) = if detected.is_empty() {
        (None, None)
    } else {
        let n = detected.len() as f64;
        let mean = detected.iter().sum::<f64>() / n;
        let variance = detected.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
        (Some(mean), Some(variance.sqrt()))
    };

    MethodStats {
        method,
        detection_rate,
        mean_frequency,
        std_frequency,
        mean_note: mean_frequency.and_then(|f| frequency_to_note(f).ok()),
    }
}
