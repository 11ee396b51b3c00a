//! Probabilistic YIN.
//!
//! Follows the first stage of *pYIN: A Fundamental Frequency Estimator Using
//! Probabilistic Threshold Distributions* (Mauch & Dixon). Instead of a single absolute
//! threshold, a whole grid of thresholds is tried, each weighted by a beta-distributed
//! prior. A threshold that finds a dip in the cumulative mean normalized difference
//! function votes for that dip's lag with its full weight; a threshold that finds none
//! votes for the global minimum with a small fraction of its weight, and that vote counts
//! as unvoiced. The voiced probability of a frame is the total weight of the voiced votes.
//!
//! The signal is cut into overlapping frames. [ProbabilisticYinDetector::analyze] returns
//! the estimate of every frame, while [PitchDetector::get_pitch] reports the voiced frame
//! with the highest voiced probability.

use crate::detector::internals::{
    validate_signal, windowed_square_error, yin_normalize_square_error, Pitch,
};
use crate::detector::{FrequencyRange, PitchDetector};
use crate::error::PitchError;
use crate::float::Float;
use crate::utils::buffer::new_real_buffer;
use crate::utils::peak::{arg_min, correct_peak, local_minima, PeakCorrection};

/// Shape parameters `(alpha, beta)` of the threshold prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BetaPrior {
    Mean10,
    Mean15,
    Mean20,
    Custom { alpha: f64, beta: f64 },
}

impl BetaPrior {
    pub fn alpha_beta(self) -> (f64, f64) {
        match self {
            BetaPrior::Mean10 => (2.0, 18.0),
            BetaPrior::Mean15 => (2.0, 11.333_333),
            BetaPrior::Mean20 => (2.0, 8.0),
            BetaPrior::Custom { alpha, beta } => (alpha, beta),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PyinConfig {
    /// Samples per analysis frame. Signals shorter than this are analyzed as one frame.
    pub frame_length: usize,
    /// Distance between frame starts; `None` means a quarter of the frame.
    pub hop_length: Option<usize>,
    /// Thresholds `1/n, 2/n, ..., 1`.
    pub threshold_count: usize,
    pub beta_prior: BetaPrior,
    /// Weight fraction given to the global minimum when a threshold finds no dip.
    pub absolute_min_weight: f64,
    /// Minimum voiced probability for a frame to count as voiced.
    pub voicing_threshold: f64,
    pub range: FrequencyRange,
}

impl Default for PyinConfig {
    fn default() -> Self {
        PyinConfig {
            frame_length: 2048,
            hop_length: None,
            threshold_count: 100,
            beta_prior: BetaPrior::Mean10,
            absolute_min_weight: 0.01,
            voicing_threshold: 0.5,
            range: FrequencyRange::default(),
        }
    }
}

impl PyinConfig {
    fn validate(&self) -> Result<(), PitchError> {
        let (alpha, beta) = self.beta_prior.alpha_beta();
        let problem = if self.frame_length < 4 {
            Some("frame_length must be at least 4")
        } else if self.hop_length == Some(0) {
            Some("hop_length must be positive")
        } else if self.threshold_count == 0 {
            Some("threshold_count must be positive")
        } else if !(alpha > 0.0 && beta > 0.0) {
            Some("beta prior parameters must be positive")
        } else if !(0.0..=1.0).contains(&self.absolute_min_weight) {
            Some("absolute_min_weight must be in [0, 1]")
        } else if !(0.0..=1.0).contains(&self.voicing_threshold) {
            Some("voicing_threshold must be in [0, 1]")
        } else {
            None
        };
        match problem {
            Some(message) => Err(PitchError::Configuration(message.into())),
            None => Ok(()),
        }
    }
}

/// The outcome for one analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEstimate<T>
where
    T: Float,
{
    pub index: usize,
    /// Start of the frame, in seconds.
    pub time: f64,
    /// `None` for unvoiced frames.
    pub frequency: Option<T>,
    pub voiced_probability: f64,
}

struct Vote {
    tau: usize,
    weight: f64,
    voiced: bool,
}

#[derive(Debug, Clone)]
pub struct ProbabilisticYinDetector {
    config: PyinConfig,
    thresholds: Vec<f64>,
    priors: Vec<f64>,
}

impl ProbabilisticYinDetector {
    pub fn new(config: PyinConfig) -> Result<Self, PitchError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PyinConfig) -> Self {
        let n = config.threshold_count;
        let thresholds: Vec<f64> = (1..=n).map(|i| i as f64 / n as f64).collect();
        let priors = beta_prior_distribution(&thresholds, config.beta_prior);
        ProbabilisticYinDetector {
            config,
            thresholds,
            priors,
        }
    }

    pub fn config(&self) -> &PyinConfig {
        &self.config
    }

    /// Estimate every frame of `signal`. Returns no frames when the signal is too
    /// short to hold a single period in range.
    pub fn analyze<T: Float>(
        &self,
        signal: &[T],
        sample_rate: usize,
    ) -> Result<Vec<FrameEstimate<T>>, PitchError> {
        validate_signal(signal, sample_rate)?;

        let frame_length = self.config.frame_length.min(signal.len());
        if frame_length < 4 {
            return Ok(Vec::new());
        }
        let hop_length = self.config.hop_length.unwrap_or(frame_length / 4).max(1);
        let window_size = frame_length / 2;

        let rate = sample_rate as f64;
        // Rounding down keeps the top of the range reachable; the refined frequency is
        // checked against the range afterwards.
        let min_tau = ((rate / self.config.range.max).floor() as usize).max(1);
        let max_tau = ((rate / self.config.range.min).floor() as usize).min(window_size - 2);
        if min_tau > max_tau {
            return Ok(Vec::new());
        }

        let thresholds: Vec<T> = self
            .thresholds
            .iter()
            .map(|&s| T::from_f64(s).unwrap())
            .collect();
        let mut difference = new_real_buffer(window_size);
        let mut cmnd = new_real_buffer(window_size);

        let frame_count = 1 + (signal.len() - frame_length) / hop_length;
        let estimates = (0..frame_count)
            .map(|index| {
                let start = index * hop_length;
                let frame = &signal[start..start + frame_length];
                windowed_square_error(frame, window_size, &mut difference);
                cmnd.copy_from_slice(&difference);
                yin_normalize_square_error(&mut cmnd);

                let (frequency, voiced_probability) = self.frame_pitch(
                    &difference,
                    &cmnd,
                    &thresholds,
                    min_tau,
                    max_tau,
                    sample_rate,
                );
                FrameEstimate {
                    index,
                    time: start as f64 / rate,
                    frequency,
                    voiced_probability,
                }
            })
            .collect();
        Ok(estimates)
    }

    /// Votes are cast on the CMND; the winning lag is refined on the raw difference
    /// function, whose dips stay symmetric at short lags.
    fn frame_pitch<T: Float>(
        &self,
        difference: &[T],
        cmnd: &[T],
        thresholds: &[T],
        min_tau: usize,
        max_tau: usize,
        sample_rate: usize,
    ) -> (Option<T>, f64) {
        // `max_tau + 2` keeps a right neighbour for every candidate lag.
        let minima: Vec<usize> = local_minima(&cmnd[..max_tau + 2])
            .into_iter()
            .filter(|&tau| tau >= min_tau)
            .collect();
        let global_min = arg_min(cmnd, min_tau..=max_tau).unwrap_or(min_tau);

        let mut votes: Vec<Vote> = Vec::new();
        for (threshold, &prior) in thresholds.iter().zip(self.priors.iter()) {
            let vote = match minima.iter().find(|&&tau| cmnd[tau] < *threshold) {
                Some(&tau) => Vote {
                    tau,
                    weight: prior,
                    voiced: true,
                },
                None => Vote {
                    tau: global_min,
                    weight: prior * self.config.absolute_min_weight,
                    voiced: false,
                },
            };
            match votes
                .iter_mut()
                .find(|v| v.tau == vote.tau && v.voiced == vote.voiced)
            {
                Some(existing) => existing.weight += vote.weight,
                None => votes.push(vote),
            }
        }

        let voiced_probability = votes
            .iter()
            .filter(|v| v.voiced)
            .map(|v| v.weight)
            .sum::<f64>()
            .min(1.0);
        let best = votes
            .iter()
            .filter(|v| v.voiced)
            .fold(None, |best: Option<&Vote>, v| match best {
                Some(b) if v.weight <= b.weight => best,
                _ => Some(v),
            });

        let frequency = best
            .filter(|_| voiced_probability >= self.config.voicing_threshold)
            .map(|v| {
                let (refined_tau, _) = correct_peak(
                    (v.tau, difference[v.tau]),
                    difference,
                    PeakCorrection::Quadratic,
                );
                T::from_usize(sample_rate).unwrap() / refined_tau
            });
        (frequency, voiced_probability)
    }
}

impl Default for ProbabilisticYinDetector {
    fn default() -> Self {
        Self::from_valid_config(PyinConfig::default())
    }
}

impl<T> PitchDetector<T> for ProbabilisticYinDetector
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>, PitchError> {
        let best = self
            .analyze(signal, sample_rate)?
            .into_iter()
            .filter_map(|frame| {
                frame
                    .frequency
                    .filter(|&f| self.config.range.contains(f))
                    .map(|f| (f, frame.voiced_probability))
            })
            .fold(None, |best: Option<(T, f64)>, (f, p)| match best {
                Some((_, bp)) if p <= bp => best,
                _ => Some((f, p)),
            });

        Ok(best.map(|(frequency, probability)| Pitch {
            frequency,
            clarity: T::from_f64(probability).unwrap(),
        }))
    }

    fn name(&self) -> &'static str {
        "pyin"
    }
}

/// Discrete beta prior weights over `thresholds`, normalized to sum to one.
fn beta_prior_distribution(thresholds: &[f64], prior: BetaPrior) -> Vec<f64> {
    let (alpha, beta) = prior.alpha_beta();
    let mut weights: Vec<f64> = thresholds
        .iter()
        .map(|&s| {
            if s <= 0.0 || s >= 1.0 {
                0.0
            } else {
                s.powf(alpha - 1.0) * (1.0 - s).powf(beta - 1.0)
            }
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter_mut().for_each(|w| *w /= sum);
    }
    weights
}
