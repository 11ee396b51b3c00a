use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::PitchError;
use crate::float::Float;
use crate::utils::buffer::{copy_real_to_complex, modulus_squared, square_sum};
use crate::utils::buffer::{new_complex_buffer, new_real_buffer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    pub frequency: T,
    pub clarity: T,
}

/// Reject frames no detector can work with.
pub fn validate_signal<T: Float>(signal: &[T], sample_rate: usize) -> Result<(), PitchError> {
    if sample_rate == 0 {
        return Err(PitchError::InvalidSampleRate);
    }
    match signal.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(PitchError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

/// Root mean square amplitude of `signal`. Zero for an empty signal.
pub fn get_power_level<T: Float>(signal: &[T]) -> T {
    if signal.is_empty() {
        return T::zero();
    }
    (square_sum(signal) / T::from_usize(signal.len()).unwrap()).sqrt()
}

/// Compute the linear autocorrelation of `signal` for the lags `0..signal.len()`
/// and put it in `result`:
///
/// > r(t) = sum_{i=0}^{n-1-t} x_i*x_{i+t}
///
/// The signal is zero-padded to at least twice its length so the FFT does not wrap around.
pub fn autocorrelation<T>(signal: &[T], result: &mut [T])
where
    T: Float,
{
    assert!(result.len() >= signal.len());
    if signal.is_empty() {
        return;
    }

    let fft_len = (2 * signal.len()).next_power_of_two();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_len);
    let inv_fft = planner.plan_fft_inverse(fft_len);

    let mut signal_complex = new_complex_buffer(fft_len);
    copy_real_to_complex(signal, &mut signal_complex);
    fft.process(&mut signal_complex);
    modulus_squared(&mut signal_complex);
    inv_fft.process(&mut signal_complex);

    // rustfft does not normalize, so the round trip scales everything by `fft_len`.
    let normalization_const = T::one() / T::from_usize(fft_len).unwrap();
    result
        .iter_mut()
        .zip(signal_complex.iter())
        .take(signal.len())
        .for_each(|(r, c)| *r = c.re * normalization_const);
}

/// Magnitude of the discrete Fourier transform of `signal`, all `signal.len()` bins.
pub fn magnitude_spectrum<T: Float>(signal: &[T]) -> Vec<T> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(signal.len());

    let mut spectrum = new_complex_buffer(signal.len());
    copy_real_to_complex(signal, &mut spectrum);
    fft.process(&mut spectrum);
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Compute the windowed autocorrelation of `signal` and put the result in `result`.
/// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
/// the function
///
/// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
///
/// This function assumes `window_size` is at most half of the length of `signal`.
pub fn windowed_autocorrelation<T>(signal: &[T], window_size: usize, result: &mut [T])
where
    T: Float,
{
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(signal.len());
    let inv_fft = planner.plan_fft_inverse(signal.len());

    let mut signal_complex: Vec<Complex<T>> = new_complex_buffer(signal.len());
    let mut truncated_signal_complex: Vec<Complex<T>> = new_complex_buffer(signal.len());

    // To achieve the windowed autocorrelation, we compute the cross correlation between
    // the original signal and the signal truncated to lie in `0..window_size`
    copy_real_to_complex(signal, &mut signal_complex);
    copy_real_to_complex(&signal[..window_size], &mut truncated_signal_complex);
    fft.process(&mut signal_complex);
    fft.process(&mut truncated_signal_complex);
    // The forward and inverse transforms together scale by `signal.len()`; undo it once.
    let normalization_const = T::one() / T::from_usize(signal.len()).unwrap();
    signal_complex
        .iter_mut()
        .zip(truncated_signal_complex.iter())
        .for_each(|(a, b)| {
            *a = *a * normalization_const * b.conj();
        });
    inv_fft.process(&mut signal_complex);

    // The result is valid only for `0..window_size`
    result
        .iter_mut()
        .zip(signal_complex[..window_size].iter())
        .for_each(|(r, c)| *r = c.re);
}

/// Compute the windowed square error, _d(t)_, of `signal`. For a window size of _w_ and a signal
/// _x=(x_0,x_1,...)_, this is defined by
///
///  > d(t) = sum_{i=0}^{w-1} (x_i - x_{i+t})^2
///
/// for `t` in `0..w`. This function is computed efficiently using an FFT. It is assumed that
/// `window_size` is at most half the length of `signal`.
pub fn windowed_square_error<T>(signal: &[T], window_size: usize, result: &mut [T])
where
    T: Float,
{
    assert!(
        2 * window_size <= signal.len(),
        "The window size cannot be more than half the signal length"
    );
    assert!(result.len() >= window_size);

    let two = T::from_f64(2.).unwrap();

    // The windowed square error function, d(t), can be computed
    // as d(t) = pow_0^w + pow_t^{t+w} - 2*windowed_autocorrelation(t)
    // where pow_a^b is the sum of the square of `signal` on the window `a..b`
    // We proceed accordingly.
    windowed_autocorrelation(signal, window_size, result);
    let mut windowed_power = square_sum(&signal[..window_size]);
    let power = windowed_power;

    result[..window_size]
        .iter_mut()
        .enumerate()
        .for_each(|(i, a)| {
            // use the formula pow_0^w + pow_t^{t+w} - 2*windowed_autocorrelation(t)
            *a = power + windowed_power - two * *a;
            // Since we're processing everything in order, we can computed pow_{t+1}^{t+1+w}
            // directly from pow_t^{t+w} by adding and subtracting the boundary terms.
            windowed_power = windowed_power - signal[i] * signal[i]
                + signal[i + window_size] * signal[i + window_size];
        })
}

/// Calculate the "cumulative mean normalized difference function" as
/// specified in the YIN paper. If _d(t)_ is the square error function,
/// compute _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) / [ (1/t) * sum_{i=1}^t d(i) ]
///
/// Where the running sum is not positive (a silent prefix), _d'(t) = 1_.
pub fn yin_normalize_square_error<T: Float>(square_error: &mut [T]) {
    if square_error.is_empty() {
        return;
    }
    let mut sum = T::zero();
    square_error[0] = T::one();
    square_error
        .iter_mut()
        .enumerate()
        .skip(1)
        .for_each(|(i, a)| {
            sum = sum + *a;
            *a = if sum > T::zero() {
                *a * T::from_usize(i).unwrap() / sum
            } else {
                T::one()
            };
        });
}

/// Convenience wrapper: difference function plus normalization over the first
/// `signal.len() / 2` lags.
pub fn cumulative_mean_normalized_difference<T: Float>(signal: &[T]) -> Vec<T> {
    let window_size = signal.len() / 2;
    let mut result = new_real_buffer(window_size);
    if window_size == 0 {
        return result;
    }
    windowed_square_error(signal, window_size, &mut result);
    yin_normalize_square_error(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_autocorrelation_test() {
        let signal: Vec<f64> = vec![0., 1., 2., 0., -1., -2.];
        let window_size: usize = 3;

        let result: Vec<f64> = (0..window_size)
            .map(|i| {
                signal[..window_size]
                    .iter()
                    .zip(signal[i..(i + window_size)].iter())
                    .map(|(a, b)| *a * *b)
                    .sum()
            })
            .collect();

        let mut computed_result = vec![0.; window_size];
        windowed_autocorrelation(&signal, window_size, &mut computed_result);
        // Using an FFT loses precision; we don't care that much, so round generously.
        computed_result
            .iter_mut()
            .for_each(|x| *x = (*x * 100.).round() / 100.);

        assert_eq!(result, computed_result);
    }

    #[test]
    fn windowed_square_error_test() {
        let signal: Vec<f64> = vec![0., 1., 2., 0., -1., -2.];
        let window_size: usize = 3;

        let result: Vec<f64> = (0..window_size)
            .map(|i| {
                signal[..window_size]
                    .iter()
                    .zip(signal[i..(i + window_size)].iter())
                    .map(|(x_j, x_j_tau)| (*x_j - *x_j_tau) * (*x_j - *x_j_tau))
                    .sum()
            })
            .collect();

        let mut computed_result = vec![0.; window_size];
        windowed_square_error(&signal, window_size, &mut computed_result);
        // Using an FFT loses precision; we don't care that much, so round generously.
        computed_result
            .iter_mut()
            .for_each(|x| *x = (*x * 100.).round() / 100.);

        assert_eq!(result, computed_result);
    }

    #[test]
    fn square_error_matches_the_direct_sum() {
        let signal: Vec<f64> = (0..64)
            .map(|i| (i as f64 * 0.37).sin() + 0.3 * (i as f64 * 1.1).cos())
            .collect();
        let half = signal.len() / 2;
        let mut computed = vec![0.; half];
        windowed_square_error(&signal, half, &mut computed);

        for tau in 0..half {
            let direct: f64 = (0..half)
                .map(|i| (signal[i] - signal[i + tau]).powi(2))
                .sum();
            assert!((direct - computed[tau]).abs() < 1e-9, "tau {}", tau);
        }
    }

    #[test]
    fn yin_normalized_square_error_test() {
        let signal: &mut Vec<f64> = &mut vec![0., 6., 14.];
        let result = vec![1., 1., 2. * 14. / (6. + 14.)];

        yin_normalize_square_error(signal);

        assert_eq!(result, *signal);
    }

    #[test]
    fn yin_normalization_of_silence_is_one() {
        let mut square_error = vec![0.0f32; 4];
        yin_normalize_square_error(&mut square_error);
        assert_eq!(square_error, vec![1.0; 4]);
    }

    #[test]
    fn autocorrelation_matches_the_direct_sum() {
        let signal: Vec<f64> = vec![1., -2., 3., 0.5, -1.];
        let mut computed = vec![0.; signal.len()];
        autocorrelation(&signal, &mut computed);

        for lag in 0..signal.len() {
            let direct: f64 = (0..signal.len() - lag)
                .map(|i| signal[i] * signal[i + lag])
                .sum();
            assert!((direct - computed[lag]).abs() < 1e-9);
        }
    }

    #[test]
    fn power_level_is_rms() {
        assert_eq!(get_power_level(&[3.0f64, -3.0, 3.0, -3.0]), 3.0);
        assert_eq!(get_power_level::<f32>(&[]), 0.0);
    }

    #[test]
    fn validation_reports_the_first_bad_sample() {
        assert_eq!(
            validate_signal(&[0.0, f32::NAN, f32::INFINITY], 44100),
            Err(PitchError::NonFiniteSample { index: 1 })
        );
        assert_eq!(
            validate_signal(&[0.0f64], 0),
            Err(PitchError::InvalidSampleRate)
        );
        assert_eq!(validate_signal(&[0.0f64], 8000), Ok(()));
    }

    #[test]
    fn magnitude_of_a_dc_signal() {
        let spectrum = magnitude_spectrum(&[1.0f64; 4]);
        assert!((spectrum[0] - 4.0).abs() < 1e-12);
        assert!(spectrum[1..].iter().all(|m| m.abs() < 1e-12));
    }
}
