//! Latent Factor Model
//!
//! Truncated SVD of the interaction matrix via a seeded randomized range
//! finder (Gaussian sketch + power iterations), followed by an exact SVD of
//! the small projected matrix.
//!
//! # Workflow
//! 1. Sketch: Y = A·Ω with Ω a seeded Gaussian C × (k + oversamples)
//! 2. Power iterations: Q ← qr(A·qr(Aᵀ·Q))
//! 3. Project: B = Qᵀ·A, decompose B = U_B·Σ·Vᵀ
//! 4. Features: U·Σ with U = Q·U_B, truncated to k columns
//!
//! Output rows follow the interaction matrix's row order.

use crate::config::ModelConfig;
use crate::error::{RecommendError, Result};
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::f64::consts::PI;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    n_components: usize,
    power_iterations: usize,
    oversamples: usize,
    random_seed: u64,
    clamp_rank: bool,
}

/// Output of a factorization: per-user features plus the decomposition that
/// produced them
#[derive(Debug, Clone)]
pub struct LatentFactors {
    /// R × k, row i = latent profile of matrix row i
    features: Array2<f64>,
    /// k × C right singular vectors
    components: Array2<f64>,
    singular_values: Array1<f64>,
    explained_variance_ratio: f64,
}

impl TruncatedSvd {
    pub fn new(n_components: usize, random_seed: u64) -> Self {
        Self {
            n_components,
            power_iterations: 5,
            oversamples: 10,
            random_seed,
            clamp_rank: false,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            n_components: config.n_components,
            power_iterations: config.power_iterations,
            oversamples: config.oversamples,
            random_seed: config.random_seed,
            clamp_rank: config.clamp_rank,
        }
    }

    /// Reduce the rank to the feasible bound instead of failing
    pub fn with_rank_clamping(mut self, clamp: bool) -> Self {
        self.clamp_rank = clamp;
        self
    }

    /// Rank actually used for a `rows` × `cols` matrix.
    ///
    /// The rank must not exceed `min(rows, cols) - 1`.
    pub fn effective_rank(&self, rows: usize, cols: usize) -> Result<usize> {
        let bound = rows.min(cols).saturating_sub(1);

        if self.n_components >= 1 && self.n_components <= bound {
            return Ok(self.n_components);
        }

        if self.clamp_rank && self.n_components >= 1 && bound >= 1 {
            warn!(
                requested = self.n_components,
                effective = bound,
                "n_components exceeds matrix bound, clamping rank"
            );
            return Ok(bound);
        }

        Err(RecommendError::infeasible_rank(self.n_components, rows, cols))
    }

    pub fn fit_transform(&self, a: &Array2<f64>) -> Result<LatentFactors> {
        let (rows, cols) = a.dim();
        let k = self.effective_rank(rows, cols)?;
        let sketch_width = (k + self.oversamples).min(rows).min(cols);

        let a_mat = DMatrix::from_fn(rows, cols, |i, j| a[[i, j]]);

        let mut rng = StdRng::seed_from_u64(self.random_seed);
        let omega = DMatrix::from_fn(cols, sketch_width, |_, _| standard_normal(&mut rng));

        let mut q = (&a_mat * &omega).qr().q();
        for _ in 0..self.power_iterations {
            let z = (a_mat.transpose() * &q).qr().q();
            q = (&a_mat * &z).qr().q();
        }

        let b = q.transpose() * &a_mat;
        let svd = SVD::new(b, true, true);
        let u_b = svd
            .u
            .as_ref()
            .ok_or_else(|| RecommendError::Factorization("SVD did not return U".to_string()))?;
        let v_t = svd
            .v_t
            .as_ref()
            .ok_or_else(|| RecommendError::Factorization("SVD did not return V^T".to_string()))?;

        // Descending singular values, first k kept
        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&x, &y| {
            svd.singular_values[y]
                .partial_cmp(&svd.singular_values[x])
                .unwrap_or(Ordering::Equal)
        });
        order.truncate(k);

        let u_full = &q * u_b;
        let singular_values: Array1<f64> =
            order.iter().map(|&i| svd.singular_values[i]).collect();
        let mut u = Array2::from_shape_fn((rows, k), |(r, c)| u_full[(r, order[c])]);
        let mut components = Array2::from_shape_fn((k, cols), |(r, c)| v_t[(order[r], c)]);

        flip_signs(&mut u, &mut components);

        let features = &u * &singular_values.view().insert_axis(Axis(0));

        let total_energy: f64 = a.iter().map(|x| x * x).sum();
        let captured: f64 = singular_values.iter().map(|s| s * s).sum();
        let explained_variance_ratio = if total_energy > 0.0 {
            captured / total_energy
        } else {
            0.0
        };

        debug!(
            sketch_width,
            power_iterations = self.power_iterations,
            seed = self.random_seed,
            "Randomized SVD finished"
        );
        info!(
            rows,
            cols,
            rank = k,
            explained_variance_ratio,
            "Computed latent user factors"
        );

        Ok(LatentFactors {
            features,
            components,
            singular_values,
            explained_variance_ratio,
        })
    }
}

impl LatentFactors {
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    /// Share of the matrix's squared Frobenius norm captured by the kept
    /// components
    pub fn explained_variance_ratio(&self) -> f64 {
        self.explained_variance_ratio
    }

    pub fn rank(&self) -> usize {
        self.features.ncols()
    }
}

/// Make the largest-magnitude entry of every component positive so the
/// output does not depend on the solver's sign choice.
fn flip_signs(u: &mut Array2<f64>, components: &mut Array2<f64>) {
    for i in 0..components.nrows() {
        let pivot = components
            .row(i)
            .iter()
            .copied()
            .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });

        if pivot < 0.0 {
            u.column_mut(i).mapv_inplace(|x| -x);
            components.row_mut(i).mapv_inplace(|x| -x);
        }
    }
}

/// Box-Muller sample from N(0, 1)
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
