//! Time-domain pitch detection from the autocorrelation of the frame.
//!
//! The frame is optionally windowed, its linear autocorrelation is computed with an
//! FFT and normalized by the zero-lag value, and a peak is picked among the lags that
//! correspond to the detector's [FrequencyRange]. Two acceptance policies are
//! available, see [PeakAcceptance].

use crate::detector::internals::{autocorrelation, validate_signal, Pitch};
use crate::detector::{FrequencyRange, PitchDetector};
use crate::error::PitchError;
use crate::float::Float;
use crate::utils::buffer::new_real_buffer;
use crate::utils::peak::{arg_max, choose_peak, detect_peaks};
use crate::utils::window::{apply_window_function, WindowFunction};

/// How a lag is chosen from the normalized autocorrelation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeakAcceptance {
    /// Take the first local maximum (smallest lag) whose height is at least
    /// `relative_height` times the largest correlation value. Preferring the
    /// smallest lag avoids reporting a subharmonic.
    FirstPeak { relative_height: f64 },
    /// Take the largest correlation in the lag window, if it exceeds `threshold`.
    BestPeak { threshold: f64 },
}

#[derive(Debug, Clone)]
pub struct AutocorrelationDetector {
    window: Option<WindowFunction>,
    acceptance: PeakAcceptance,
    range: FrequencyRange,
}

impl AutocorrelationDetector {
    /// Hann window and first-peak acceptance at 30% of the maximum.
    pub fn new() -> Self {
        AutocorrelationDetector {
            window: Some(WindowFunction::Hann),
            acceptance: PeakAcceptance::FirstPeak {
                relative_height: 0.3,
            },
            range: FrequencyRange::default(),
        }
    }

    /// No window and best-peak acceptance above 0.5.
    pub fn simple() -> Self {
        AutocorrelationDetector {
            window: None,
            acceptance: PeakAcceptance::BestPeak { threshold: 0.5 },
            range: FrequencyRange::default(),
        }
    }

    pub fn with_window(mut self, window: Option<WindowFunction>) -> Self {
        self.window = window;
        self
    }

    pub fn with_acceptance(mut self, acceptance: PeakAcceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.range = range;
        self
    }

    /// Lags to search, as the half-open interval `min_lag..max_lag`.
    fn lag_window(&self, sample_rate: usize, len: usize) -> (usize, usize) {
        let sample_rate = sample_rate as f64;
        let min_lag = ((sample_rate / self.range.max) as usize).max(1);
        let max_lag = ((sample_rate / self.range.min) as usize).min(len.saturating_sub(1));
        (min_lag, max_lag)
    }
}

impl Default for AutocorrelationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PitchDetector<T> for AutocorrelationDetector
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>, PitchError> {
        validate_signal(signal, sample_rate)?;

        let (min_lag, max_lag) = self.lag_window(sample_rate, signal.len());
        if min_lag >= max_lag {
            return Ok(None);
        }

        let mut windowed = signal.to_vec();
        if let Some(window) = self.window {
            apply_window_function(window, &mut windowed);
        }

        let mut autocorr = new_real_buffer(signal.len());
        autocorrelation(&windowed, &mut autocorr);
        let zero_lag = autocorr[0];
        if zero_lag <= T::zero() {
            return Ok(None);
        }
        autocorr.iter_mut().for_each(|r| *r = *r / zero_lag);

        let search = &autocorr[min_lag..max_lag];
        let peak = match self.acceptance {
            PeakAcceptance::FirstPeak { relative_height } => {
                let max = autocorr.iter().copied().fold(T::neg_infinity(), T::max);
                let height = T::from_f64(relative_height).unwrap() * max;
                choose_peak(detect_peaks(search), height)
            }
            PeakAcceptance::BestPeak { threshold } => arg_max(search)
                .filter(|&(_, value)| value > T::from_f64(threshold).unwrap()),
        };

        Ok(peak
            .map(|(idx, clarity)| Pitch {
                frequency: T::from_usize(sample_rate).unwrap()
                    / T::from_usize(idx + min_lag).unwrap(),
                clarity,
            })
            .filter(|pitch| self.range.contains(pitch.frequency)))
    }

    fn name(&self) -> &'static str {
        "autocorrelation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, size: usize, sample_rate: usize) -> Vec<f64> {
        (0..size)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn lag_window_is_clipped_to_the_frame() {
        let detector = AutocorrelationDetector::new();
        assert_eq!(detector.lag_window(44100, 4096), (10, 1603));
        assert_eq!(detector.lag_window(44100, 1024), (10, 1023));
        assert_eq!(detector.lag_window(4000, 4096), (1, 145));
    }

    #[test]
    fn first_peak_finds_the_period() {
        let signal = sine(441.0, 4096, 44100);
        let pitch = AutocorrelationDetector::new()
            .get_pitch(&signal, 44100)
            .unwrap()
            .unwrap();
        assert!((pitch.frequency - 441.0).abs() < 5.0);
        assert!(pitch.clarity > 0.3 && pitch.clarity <= 1.0);
    }

    #[test]
    fn best_peak_finds_the_period() {
        let signal = sine(441.0, 4096, 44100);
        let pitch = AutocorrelationDetector::simple()
            .get_pitch(&signal, 44100)
            .unwrap()
            .unwrap();
        assert_eq!(pitch.frequency, 441.0);
        assert!(pitch.clarity > 0.9);
    }

    #[test]
    fn best_peak_rejects_weak_correlation() {
        // A lone impulse never lines up with itself.
        let signal: Vec<f64> = (0..512).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect();
        let pitch = AutocorrelationDetector::simple().get_pitch(&signal, 44100).unwrap();
        assert!(pitch.is_none());
    }

    #[test]
    fn silence_has_no_pitch() {
        let signal = vec![0.0f32; 2048];
        let pitch = AutocorrelationDetector::new().get_pitch(&signal, 44100).unwrap();
        assert!(pitch.is_none());
    }

    #[test]
    fn too_short_for_any_lag() {
        let signal = sine(441.0, 8, 44100);
        let pitch = AutocorrelationDetector::new().get_pitch(&signal, 44100).unwrap();
        assert!(pitch.is_none());
    }

    #[test]
    fn non_finite_samples_are_a_fault() {
        let mut signal = sine(441.0, 1024, 44100);
        signal[10] = f64::NAN;
        let result = AutocorrelationDetector::new().get_pitch(&signal, 44100);
        assert_eq!(result, Err(PitchError::NonFiniteSample { index: 10 }));
    }
}
