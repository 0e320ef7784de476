//! Pure numeric primitives backing the fee suggestions.

/// Computes the exponential moving average of `values` with a smoothing
/// constant derived from `window` (`alpha = 2 / (window + 1)`).
///
/// The output has the same length as the input; the first entry seeds the
/// average with the first value. An empty input yields an empty output.
pub fn exponential_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut ema = Vec::with_capacity(values.len());
    for &value in values {
        let next = match ema.last() {
            Some(&prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        ema.push(next);
    }
    ema
}

/// Ordinary least-squares slope of `ys` against `xs`.
///
/// Returns 0.0 when fewer than two points are given, or when the x values
/// are degenerate (all identical).
pub fn linear_regression_slope(ys: &[f64], xs: &[f64]) -> f64 {
    let n = ys.len().min(xs.len());
    if n < 2 {
        return 0.0
    }
    let n = n as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Maps an accumulated weight to a `[0, 1]` progress value: 0 below
/// `sample_min`, 1 above `sample_max`, and a smoothstep (`3x^2 - 2x^3`) ramp
/// in between. Monotonic and continuous over the whole domain.
pub fn sampling_curve(sum_weight: f64, sample_min: f64, sample_max: f64) -> f64 {
    if sum_weight <= sample_min {
        return 0.0
    }
    if sum_weight >= sample_max {
        return 1.0
    }
    let x = (sum_weight - sample_min) / (sample_max - sample_min);
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_with_first_value() {
        // window 3 => alpha = 0.5
        let ema = exponential_moving_average(&[1.0, 2.0, 3.0], 3);
        assert_eq!(ema, vec![1.0, 1.5, 2.25]);
    }

    #[test]
    fn ema_of_empty_input_is_empty() {
        assert!(exponential_moving_average(&[], 10).is_empty());
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let ema = exponential_moving_average(&[4.0; 8], 8);
        assert!(ema.iter().all(|&v| v == 4.0));
    }

    #[test]
    fn regression_slope_of_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        assert_eq!(linear_regression_slope(&ys, &xs), 2.0);
    }

    #[test]
    fn regression_slope_degenerate_cases() {
        assert_eq!(linear_regression_slope(&[1.0], &[0.0]), 0.0);
        assert_eq!(linear_regression_slope(&[], &[]), 0.0);
        // constant xs, denominator is zero
        assert_eq!(linear_regression_slope(&[1.0, 2.0], &[3.0, 3.0]), 0.0);
    }

    #[test]
    fn regression_slope_of_constant_series_is_zero() {
        let xs = [0.0, 1.0, 2.0];
        assert_eq!(linear_regression_slope(&[5.0, 5.0, 5.0], &xs), 0.0);
    }

    #[test]
    fn sampling_curve_saturates_at_bounds() {
        assert_eq!(sampling_curve(0.0, 0.1, 0.3), 0.0);
        assert_eq!(sampling_curve(0.1, 0.1, 0.3), 0.0);
        assert_eq!(sampling_curve(0.3, 0.1, 0.3), 1.0);
        assert_eq!(sampling_curve(0.95, 0.1, 0.3), 1.0);
        // smoothstep midpoint
        assert_eq!(sampling_curve(0.2, 0.1, 0.3), 0.5);
    }

    #[test]
    fn sampling_curve_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=1000 {
            let w = i as f64 / 1000.0;
            let v = sampling_curve(w, 0.1, 0.3);
            assert!(v >= prev, "curve decreased at {w}");
            assert!((0.0..=1.0).contains(&v));
            prev = v;
        }
    }
}
