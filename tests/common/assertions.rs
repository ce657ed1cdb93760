//! Assertion utilities for testing.
//!
//! This module provides helper functions for making assertions in tests,
//! particularly for floating-point comparisons.

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two sequences of floating-point values are approximately element-wise equal.
///
/// # Panics
///
/// Panics if the sequences have different lengths or if any element-wise comparison fails.
pub fn assert_array_approx_eq<'a, A, E>(actual: A, expected: E, epsilon: Option<f64>)
where
    A: IntoIterator<Item = &'a f64>,
    E: IntoIterator<Item = &'a f64>,
{
    let actual: Vec<f64> = actual.into_iter().copied().collect();
    let expected: Vec<f64> = expected.into_iter().copied().collect();
    assert_eq!(
        actual.len(),
        expected.len(),
        "Arrays have different lengths: actual = {}, expected = {}",
        actual.len(),
        expected.len()
    );

    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= eps,
            "Arrays differ at index {}: actual = {}, expected = {}, diff = {}, epsilon = {}",
            i,
            a,
            e,
            diff,
            eps
        );
    }
}

/// Assert that every value lies within `[min, max]`.
pub fn assert_all_in_range<'a>(values: impl IntoIterator<Item = &'a f64>, min: f64, max: f64) {
    for (i, &value) in values.into_iter().enumerate() {
        assert!(
            value >= min && value <= max,
            "Value {} not in range: actual = {}, min = {}, max = {}",
            i,
            value,
            min,
            max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_array_approx_eq() {
        assert_array_approx_eq(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], None);
        assert_array_approx_eq(&[1.0, 2.0, 3.0], &[1.001, 2.001, 3.001], Some(0.01));
    }

    #[test]
    fn test_assert_all_in_range() {
        assert_all_in_range(&[0.0, 5.0, 10.0], 0.0, 10.0);
    }
}
