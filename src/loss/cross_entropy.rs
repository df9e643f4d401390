/// Categorical cross-entropy over softmax probabilities.
pub struct CrossEntropyLoss;

/// Floor applied to probabilities before `ln` so that `ln(0)` never happens.
pub const EPS: f64 = 1e-15;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * ln(max(predicted[i], eps)))
    ///
    /// `predicted` is a softmax distribution, `expected` a one-hot target.
    /// The result is never negative.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        assert_eq!(predicted.len(), expected.len(), "loss vectors must have equal length");
        let sum: f64 = predicted.iter().zip(expected.iter())
            .map(|(p, e)| e * p.max(EPS).ln())
            .sum();
        // -0.0 for a perfect prediction reads badly in logs.
        if sum == 0.0 { 0.0 } else { -sum }
    }

    /// Gradient of softmax + cross-entropy w.r.t. the pre-softmax logits:
    ///   dL/dz_i = predicted[i] - expected[i]
    ///
    /// Only valid because the output layer emits raw logits and softmax is
    /// applied outside of it.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| p - e)
            .collect()
    }
}

/// Vector of `width` zeros with a single `1.0` at `index`.
///
/// # Panics
/// Panics if `index >= width`. Labels come from a validated dataset, so an
/// out-of-range class is a bug upstream.
pub fn one_hot(index: usize, width: usize) -> Vec<f64> {
    assert!(index < width, "class index {} is out of range for {} classes", index, width);
    let mut v = vec![0.0; width];
    v[index] = 1.0;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_places_single_one() {
        assert_eq!(one_hot(2, 4), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn one_hot_rejects_out_of_range() {
        one_hot(10, 10);
    }

    #[test]
    fn zero_probability_is_floored() {
        let l = CrossEntropyLoss::loss(&[0.0, 1.0], &[1.0, 0.0]);
        assert!(l.is_finite());
        assert!((l - (-(EPS.ln()))).abs() < 1e-9);
    }
}
