use crate::utils::{cosine_with_norms, l2_norm};
use ndarray::{Array2, ArrayView1};
use std::cmp::Ordering;
use tracing::info;

/// Dense user × user cosine similarity over latent features
///
/// Computed eagerly for all pairs. Only the upper triangle is evaluated and
/// mirrored, so the matrix is exactly symmetric. The diagonal is fixed at 1,
/// including for users whose feature vector is zero.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    values: Array2<f64>,
}

impl SimilarityIndex {
    pub fn from_features(features: &Array2<f64>) -> Self {
        let n = features.nrows();
        let norms: Vec<f64> = features.rows().into_iter().map(l2_norm).collect();

        let mut values = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            values[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let sim = cosine_with_norms(features.row(i), features.row(j), norms[i], norms[j]);
                values[[i, j]] = sim;
                values[[j, i]] = sim;
            }
        }

        info!(users = n, "Computed user similarity matrix");

        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Up to `n` most similar rows to `row`, excluding `row` itself.
    ///
    /// Sorted by similarity descending; the sort is stable, so ties keep
    /// ascending row order.
    pub fn nearest(&self, row: usize, n: usize) -> Vec<(usize, f64)> {
        let mut scored: Vec<(usize, f64)> = self
            .values
            .row(row)
            .iter()
            .copied()
            .enumerate()
            .filter(|(other, _)| *other != row)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(n);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_matrix() {
        let features = array![[1.0, 0.0], [1.0, 1.0], [0.0, 2.0], [-1.0, 0.0]];
        let index = SimilarityIndex::from_features(&features);

        assert_eq!(index.len(), 4);
        assert!((index.get(0, 1) - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(index.get(0, 2).abs() < 1e-12);
        assert!((index.get(0, 3) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_and_symmetry() {
        let features = array![
            [0.3, -1.2, 4.0],
            [2.2, 0.1, -0.7],
            [0.0, 0.0, 0.0],
            [1.5, 1.5, 1.5]
        ];
        let index = SimilarityIndex::from_features(&features);

        for i in 0..4 {
            assert!((index.get(i, i) - 1.0).abs() < 1e-9);
            for j in 0..4 {
                assert_eq!(index.get(i, j), index.get(j, i));
            }
        }
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        let features = array![[0.0, 0.0], [1.0, 2.0]];
        let index = SimilarityIndex::from_features(&features);

        assert_eq!(index.get(0, 1), 0.0);
        assert_eq!(index.get(0, 0), 1.0);
    }

    #[test]
    fn test_nearest_excludes_self_and_breaks_ties_by_row() {
        // Rows 0 to 3 are identical
        let features = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let index = SimilarityIndex::from_features(&features);

        let nearest = index.nearest(2, 3);
        let rows: Vec<usize> = nearest.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![0, 1, 3]);

        let all = index.nearest(4, 10);
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|(row, _)| *row != 4));
    }

    #[test]
    fn test_empty_features() {
        let index = SimilarityIndex::from_features(&Array2::zeros((0, 0)));
        assert!(index.is_empty());
    }
}
