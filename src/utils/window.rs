//! [Window functions](https://en.wikipedia.org/wiki/Window_function).
use crate::float::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunction {
    /// <https://en.wikipedia.org/wiki/Window_function#Hann_and_Hamming_windows>
    Hann,
    /// <https://en.wikipedia.org/wiki/Window_function#Hann_and_Hamming_windows>
    Hamming,
}

/// Performs point-wise multiplication of a buffer and a symmetric window of the given type.
/// A single-sample buffer is left untouched.
pub fn apply_window_function<T: Float>(window_function: WindowFunction, buffer: &mut [T]) {
    let (a0, a1) = match window_function {
        WindowFunction::Hann => (0.5, 0.5),
        WindowFunction::Hamming => (0.54, 0.46),
    };
    let len = buffer.len();
    if len < 2 {
        return;
    }
    let step = 2.0 * std::f64::consts::PI / (len - 1) as f64;
    buffer.iter_mut().enumerate().for_each(|(n, value)| {
        let w = a0 - a1 * (step * n as f64).cos();
        *value = *value * T::from_f64(w).unwrap();
    });
}
