use std::cmp::Ordering;

use crate::float::Float;

pub enum PeakCorrection {
    Quadratic,
    None,
}

struct Point<T: Float> {
    x: T,
    y: T,
}

/// Iterate over the local maxima of `arr` in order of increasing index.
///
/// A sample is a peak when it is strictly greater than its left neighbour and
/// strictly greater than the first differing sample to its right. Flat tops
/// are reported at their midpoint (rounded down). The first and last samples
/// are never peaks.
pub fn detect_peaks<'a, T: Float>(arr: &'a [T]) -> impl Iterator<Item = (usize, T)> + 'a {
    let last = arr.len().saturating_sub(1);
    let mut i = 1;
    std::iter::from_fn(move || {
        while i < last {
            let mut peak = None;
            if arr[i - 1] < arr[i] {
                let mut ahead = i + 1;
                while ahead < last && arr[ahead] == arr[i] {
                    ahead += 1;
                }
                if arr[ahead] < arr[i] {
                    peak = Some((i + ahead - 1) / 2);
                    i = ahead;
                }
            }
            i += 1;
            if let Some(idx) = peak {
                return Some((idx, arr[idx]));
            }
        }
        None
    })
}

/// The first peak whose height is at least `threshold`.
pub fn choose_peak<I: Iterator<Item = (usize, T)>, T: Float>(
    mut peaks: I,
    threshold: T,
) -> Option<(usize, T)> {
    peaks.find(|p| p.1 >= threshold)
}

/// Index and value of the largest element. Ties go to the lowest index.
pub fn arg_max<T: Float>(arr: &[T]) -> Option<(usize, T)> {
    arr.iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}

/// Index of the smallest element of `arr[range]`. Ties go to the lowest index.
pub fn arg_min<T: Float>(arr: &[T], range: std::ops::RangeInclusive<usize>) -> Option<usize> {
    range.min_by(|&a, &b| {
        arr[a]
            .partial_cmp(&arr[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    })
}

/// Indices `t` of the local minima of `arr`, i.e. `arr[t] < arr[t - 1]` and
/// `arr[t] <= arr[t + 1]`.
pub fn local_minima<T: Float>(arr: &[T]) -> Vec<usize> {
    arr.windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] < w[0] && w[1] <= w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

pub fn correct_peak<T: Float>(peak: (usize, T), data: &[T], correction: PeakCorrection) -> (T, T) {
    let idx = peak.0;
    match correction {
        PeakCorrection::Quadratic if idx > 0 && idx + 1 < data.len() => {
            let point = quadratic_interpolation(
                Point {
                    x: T::from_usize(idx - 1).unwrap(),
                    y: data[idx - 1],
                },
                Point {
                    x: T::from_usize(idx).unwrap(),
                    y: data[idx],
                },
                Point {
                    x: T::from_usize(idx + 1).unwrap(),
                    y: data[idx + 1],
                },
            );
            (point.x, point.y)
        }
        _ => (T::from_usize(idx).unwrap(), peak.1),
    }
}

/// Vertex of the parabola through three equally spaced points. Works for
/// minima as well as maxima.
fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let denominator = T::from_f64(2.0).unwrap() * center.y - left.y - right.y;
    if denominator == T::zero() {
        return center;
    }
    let shift = T::from_f64(0.5).unwrap() * (right.y - left.y) / denominator;
    let x = center.x + shift;
    let y = center.y + T::from_f64(0.25).unwrap() * (right.y - left.y) * shift;
    Point { x, y }
}
