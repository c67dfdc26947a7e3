// Vector helpers shared by the factorization and similarity stages

use ndarray::ArrayView1;

/// Norms below this are treated as zero vectors
pub const ZERO_NORM_EPSILON: f64 = 1e-12;

pub fn l2_norm(v: ArrayView1<f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// Cosine similarity given precomputed norms; 0 when either vector is zero.
pub fn cosine_with_norms(
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
    norm_a: f64,
    norm_b: f64,
) -> f64 {
    if norm_a < ZERO_NORM_EPSILON || norm_b < ZERO_NORM_EPSILON {
        return 0.0;
    }
    a.dot(&b) / (norm_a * norm_b)
}

pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    cosine_with_norms(a, b, l2_norm(a), l2_norm(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_l2_norm() {
        let v = array![3.0, 4.0];
        assert!((l2_norm(v.view()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = array![1.0, 1.0, 0.0];
        let b = array![1.0, 0.0, 0.0];
        let expected = 1.0 / 2.0_f64.sqrt();
        assert!((cosine_similarity(a.view(), b.view()) - expected).abs() < 1e-12);

        let c = array![-2.0, -2.0, 0.0];
        assert!((cosine_similarity(a.view(), c.view()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = array![0.0, 0.0];
        let b = array![1.0, 2.0];
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);
        assert_eq!(cosine_similarity(a.view(), a.view()), 0.0);
    }
}
