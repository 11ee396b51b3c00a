//! Harmonic product spectrum.
//!
//! A periodic sound has spectral peaks at every multiple of its fundamental. Compressing
//! the magnitude spectrum by a factor `h` (keeping every `h`-th bin) moves the `h`-th
//! harmonic onto the fundamental's bin, so multiplying the spectrum by its compressed
//! copies reinforces the fundamental and suppresses everything else.
//!
//! The frequency resolution is `sample_rate / signal.len()`: longer frames give finer
//! estimates.

use crate::detector::internals::{magnitude_spectrum, validate_signal, Pitch};
use crate::detector::{FrequencyRange, PitchDetector};
use crate::error::PitchError;
use crate::float::Float;
use crate::utils::peak::arg_max;

pub const DEFAULT_HARMONICS: usize = 5;

#[derive(Debug, Clone)]
pub struct HpsDetector {
    harmonics: usize,
    range: FrequencyRange,
}

impl HpsDetector {
    /// `harmonics` counts the fundamental, so `1` is a plain spectral peak picker.
    pub fn new(harmonics: usize) -> Result<Self, PitchError> {
        if harmonics == 0 {
            return Err(PitchError::Configuration(
                "harmonics must be at least 1".into(),
            ));
        }
        Ok(HpsDetector {
            harmonics,
            range: FrequencyRange::default(),
        })
    }

    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.range = range;
        self
    }
}

impl Default for HpsDetector {
    fn default() -> Self {
        HpsDetector {
            harmonics: DEFAULT_HARMONICS,
            range: FrequencyRange::default(),
        }
    }
}

/// Multiply `spectrum` element-wise by its copies decimated by `2..=harmonics`.
/// Each copy is shorter than the spectrum, so only the overlapping prefix is multiplied.
pub fn harmonic_product<T: Float>(spectrum: &[T], harmonics: usize) -> Vec<T> {
    let mut product = spectrum.to_vec();
    for h in 2..=harmonics {
        product
            .iter_mut()
            .zip(spectrum.iter().step_by(h))
            .for_each(|(p, &s)| *p = *p * s);
    }
    product
}

impl<T> PitchDetector<T> for HpsDetector
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>, PitchError> {
        validate_signal(signal, sample_rate)?;
        if signal.len() < 2 {
            return Ok(None);
        }

        let mut spectrum = magnitude_spectrum(signal);
        spectrum.truncate(signal.len() / 2);
        let product = harmonic_product(&spectrum, self.harmonics);

        let Some((bin, peak)) = arg_max(&product) else {
            return Ok(None);
        };
        let total = product.iter().copied().sum::<T>();
        let clarity = if total > T::zero() {
            peak / total
        } else {
            T::zero()
        };
        let frequency = T::from_usize(bin * sample_rate).unwrap() / T::from_usize(signal.len()).unwrap();

        Ok(Some(Pitch { frequency, clarity }).filter(|pitch| self.range.contains(pitch.frequency)))
    }

    fn name(&self) -> &'static str {
        "hps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harmonic_tone(freq: f64, size: usize, sample_rate: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (1..=5)
                    .map(|h| (2.0 * std::f64::consts::PI * freq * h as f64 * t).sin() / h as f64)
                    .sum::<f64>() as f32
                    * 0.3
            })
            .collect()
    }

    #[test]
    fn decimation_multiplies_the_overlapping_prefix() {
        let spectrum = [1.0, 2.0, 3.0, 4.0, 5.0];
        // h = 2 multiplies by [1, 3, 5], h = 3 by [1, 4].
        assert_eq!(
            harmonic_product(&spectrum, 3),
            vec![1.0, 24.0, 15.0, 4.0, 5.0]
        );
        assert_eq!(harmonic_product(&spectrum, 1), spectrum.to_vec());
    }

    #[test]
    fn finds_the_fundamental_of_a_harmonic_tone() {
        let signal = harmonic_tone(220.0, 44100, 44100);
        let pitch = HpsDetector::default().get_pitch(&signal, 44100).unwrap().unwrap();
        assert_eq!(pitch.frequency, 220.0);
        assert!(pitch.clarity > 0.5);
    }

    #[test]
    fn dc_only_is_out_of_range() {
        let signal = vec![0.5f64; 1024];
        let pitch = HpsDetector::default().get_pitch(&signal, 44100).unwrap();
        assert!(pitch.is_none());
    }

    #[test]
    fn zero_harmonics_is_rejected() {
        assert!(HpsDetector::new(0).is_err());
        assert!(HpsDetector::new(1).is_ok());
    }
}
