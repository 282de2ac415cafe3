//! Linear model with a logistic link.
//!
//! The classifier is a pure function of the weight vector and a standardized
//! feature vector. `weights[0]` is the bias and `weights[j + 1]` multiplies
//! feature `j`.

/// Logistic function evaluated without overflowing `exp` for large |z|.
///
/// For `z >= 0` it computes `1 / (1 + e^-z)`; for `z < 0` it computes
/// `e^z / (1 + e^z)`, so the exponent is never positive.
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        let e = (-z).exp();
        1.0 / (1.0 + e)
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Bias plus the dot product of coefficients and standardized features.
///
/// Extra coefficients or features beyond the shorter side are ignored; the
/// model validates lengths before any call reaches this point.
#[inline]
pub fn linear_score(weights: &[f64], standardized: &[f64]) -> f64 {
    let Some((&bias, coefficients)) = weights.split_first() else {
        return 0.0;
    };
    coefficients
        .iter()
        .zip(standardized)
        .fold(bias, |z, (&w, &x)| z + w * x)
}

/// Success probability for one standardized feature vector.
#[inline]
pub fn predict_probability(weights: &[f64], standardized: &[f64]) -> f64 {
    sigmoid(linear_score(weights, standardized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_of_zero_is_one_half() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for &z in &[-30.0, -5.0, -0.75, 0.1, 1.0, 4.2, 25.0] {
            assert_abs_diff_eq!(sigmoid(z) + sigmoid(-z), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sigmoid_stays_inside_open_interval_for_moderate_inputs() {
        for &z in &[-700.0, -100.0, -1.0, 0.0, 1.0, 30.0] {
            let p = sigmoid(z);
            assert!(p > 0.0 && p < 1.0, "sigmoid({z}) = {p} left (0, 1)");
        }
    }

    #[test]
    fn sigmoid_is_finite_for_extreme_inputs() {
        assert_eq!(sigmoid(-1e6), 0.0);
        assert_eq!(sigmoid(1e6), 1.0);
        assert!(sigmoid(f64::MIN).is_finite());
        assert!(sigmoid(f64::MAX).is_finite());
    }

    #[test]
    fn sigmoid_is_strictly_increasing() {
        let mut previous = sigmoid(-20.0);
        let mut z = -20.0;
        while z < 20.0 {
            z += 0.25;
            let current = sigmoid(z);
            assert!(current > previous, "sigmoid not increasing at z={z}");
            previous = current;
        }
    }

    #[test]
    fn linear_score_adds_bias_and_weighted_features() {
        let weights = [0.5, 1.0, -2.0, 0.0];
        let x = [2.0, 1.0, 100.0];
        assert_abs_diff_eq!(linear_score(&weights, &x), 0.5 + 2.0 - 2.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_weights_give_even_odds() {
        let weights = [0.0; 6];
        let x = [3.0, -1.0, 8.0, 0.5, 2.0];
        assert_eq!(predict_probability(&weights, &x), 0.5);
    }
}
