//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//! It is efficient and offers an improvement over basic autocorrelation.
//!
//! Let $S=(s_0,s_1,\ldots,s_N)$ be a discrete signal and $W = N/2$. The *difference function* at lag $t$
//! is defined by
//! $$ d(t) = \sum_{i=0}^{W-1} (s_i-s_{i+t})^2. $$
//! This function is close to zero when the signal "lines up" with itself. However, *close* is a relative term,
//! and the value of $d(t)$ depends on volume, which should not affect the pitch of the signal. For this
//! reason, the signal is normalized. The YIN algorithm computes the *cumulative mean normalized difference function*,
//! $$ d\'(t) = \begin{cases}1&\text{if }t=0\\\\ d(t) / \left[ \tfrac{1}{t}\sum_{i=1}^t d(i) \right] & \text{otherwise}\end{cases}. $$
//! Then, it searches for the first dip of $d\'(t)$ below a given threshold and follows it down to its local minimum.
//!
//! ## Implementation
//! Rather than compute the difference function directly,
//! an [FFT](https://en.wikipedia.org/wiki/Fast_Fourier_transform) is used, providing a dramatic speed increase for large buffers.
//! The reported frequency is `sample_rate / t` for the integer lag `t`; no interpolation is applied.
//!
//! See [ProbabilisticYinDetector][crate::detector::pyin::ProbabilisticYinDetector] for the
//! multi-threshold variant that also reports a voiced probability.

use crate::detector::internals::{cumulative_mean_normalized_difference, validate_signal, Pitch};
use crate::detector::{FrequencyRange, PitchDetector};
use crate::error::PitchError;
use crate::float::Float;

/// Absolute threshold used in the YIN paper.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct YINDetector {
    threshold: f64,
    range: FrequencyRange,
}

impl YINDetector {
    pub fn new(threshold: f64) -> Result<Self, PitchError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(PitchError::Configuration(format!(
                "YIN threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(YINDetector {
            threshold,
            range: FrequencyRange::default(),
        })
    }

    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.range = range;
        self
    }
}

impl Default for YINDetector {
    fn default() -> Self {
        YINDetector {
            threshold: DEFAULT_THRESHOLD,
            range: FrequencyRange::default(),
        }
    }
}

/// Pitch detection based on the YIN algorithm. See <http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf>
impl<T> PitchDetector<T> for YINDetector
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>, PitchError> {
        validate_signal(signal, sample_rate)?;

        // STEP 2 and 3: the difference function, d_t, normalized to d_t'.
        let cmnd = cumulative_mean_normalized_difference(signal);
        let half = cmnd.len();
        let threshold = T::from_f64(self.threshold).unwrap();

        // STEP 4: The absolute threshold. We want the first dip below `threshold`,
        // followed down to the bottom of the dip.
        let Some(mut tau) = (1..half).find(|&tau| cmnd[tau] < threshold) else {
            return Ok(None);
        };
        while tau + 1 < half && cmnd[tau + 1] < cmnd[tau] {
            tau += 1;
        }

        let pitch = Pitch {
            frequency: T::from_usize(sample_rate).unwrap() / T::from_usize(tau).unwrap(),
            // A `clarity` is not given by the YIN algorithm. A deeper dip is a cleaner period,
            // so report 1 - d'(t).
            clarity: (T::one() - cmnd[tau]).max(T::zero()).min(T::one()),
        };
        Ok(Some(pitch).filter(|pitch| self.range.contains(pitch.frequency)))
    }

    fn name(&self) -> &'static str {
        "yin"
    }
}
