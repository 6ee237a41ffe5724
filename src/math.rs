//! Rounding and small statistics helpers
//!
//! Prices and amounts sent to the exchange are rounded to a fixed decimal
//! resolution expressed as a power of ten (`10_000.0` keeps four decimals).

/// Round `x` to the resolution given by `unit` (multiply, round, divide).
///
/// Rounds half away from zero, so `round_to(1.00005, 10_000.0)` is `1.0001`.
pub fn round_to(x: f64, unit: f64) -> f64 {
    (x * unit).round() / unit
}

/// Median of a sequence. Returns `0.0` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let len = sorted.len();
    if len == 0 {
        0.0
    } else if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}

/// Render a decimal for the exchange: shortest representation that
/// round-trips, never in exponent form.
pub fn format_decimal(x: f64) -> String {
    format!("{}", x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_to_four_decimals() {
        assert_relative_eq!(round_to(1.23456, 10_000.0), 1.2346);
        assert_relative_eq!(round_to(1.01504, 10_000.0), 1.015);
        assert_relative_eq!(round_to(0.99999, 10_000.0), 1.0);
    }

    #[test]
    fn test_round_to_three_decimals() {
        assert_relative_eq!(round_to(4.97512, 1_000.0), 4.975);
        assert_relative_eq!(round_to(5.0, 1_000.0), 5.0);
    }

    #[test]
    fn test_round_removes_accumulated_noise() {
        let price = 1.0 + 0.005 * 3.0;
        assert_eq!(format_decimal(round_to(price, 10_000.0)), "1.015");
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let values = vec![3.0, 1.0, 2.0];
        let _ = median(&values);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1.0), "1");
        assert_eq!(format_decimal(0.0001), "0.0001");
        assert_eq!(format_decimal(4.975), "4.975");
        assert_eq!(format_decimal(12345678.5), "12345678.5");
    }
}
