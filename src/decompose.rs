
use nalgebra::DMatrix;
use ndarray::prelude::*;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::StandardNormal;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use crate::config::{JsonDecompose, Solver};
use crate::error::EmbeddingError;
use crate::preprocess::CenteredMatrix;


/// Truncated decomposition of the centered matrix.
///
/// `components` is n x k, column j being the j-th right singular vector. Each column
/// has its largest magnitude entry positive (lowest index on ties), which pins down
/// the sign the SVD leaves undetermined, so that repeated runs give the same axes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Spectrum {
    pub singular_values: Array1<f64>,
    pub components: Array2<f64>,
    pub explained_variance_ratio: Array1<f64>,
}

impl Spectrum {

    pub fn k(&self) -> usize {
        self.singular_values.len()
    }

    pub fn component(&self, j: usize) -> ArrayView1<'_, f64> {
        self.components.column(j)
    }

    // share of the total variance kept by the k components
    pub fn explained_variance(&self) -> f64 {
        self.explained_variance_ratio.sum()
    }
}

/// Rank-`k` decomposition with the default solver settings.
pub fn decompose(mc: &CenteredMatrix, k: usize) -> Result<Spectrum, EmbeddingError> {
    let params = JsonDecompose {
        n_components: k,
        ..JsonDecompose::default()
    };
    decompose_with(mc, &params)
}

pub fn decompose_with(mc: &CenteredMatrix, params: &JsonDecompose) -> Result<Spectrum, EmbeddingError> {

    let a = mc.view();
    let (rows, cols) = a.dim();
    let k = params.n_components;
    let min_dim = rows.min(cols);

    if k == 0 {
        return Err(EmbeddingError::InvalidK { k: k, min: 1, max: min_dim });
    }
    if k > min_dim {
        return Err(EmbeddingError::convergence(format!("cannot extract {} components from a {} x {} matrix", k, rows, cols)));
    }

    let solver = match params.solver {
        Solver::Auto => {
            if rows.max(cols) > 500 && (k as f64) < 0.8 * min_dim as f64 { Solver::Randomized } else { Solver::Full }
        },
        other => other
    };

    let timer = Instant::now();
    let (sigmas, v_t) = match solver {
        Solver::Randomized => randomized_svd(a, k, params)?,
        _ => full_svd(&to_dmatrix(a), params.max_iter)?
    };
    debug!("{:?} svd of {} x {} took {} ms", solver, rows, cols, timer.elapsed().as_millis());

    // descending order, stable so equal values keep the lower index first
    let mut order = (0..sigmas.len()).collect::<Vec<usize>>();
    order.sort_by(|&i, &j| sigmas[j].total_cmp(&sigmas[i]));

    let sigma_max = sigmas[order[0]];
    let tol = sigma_max * rows.max(cols) as f64 * f64::EPSILON;
    let rank = sigmas.iter().filter(|s| **s > tol).count();
    if k > rank {
        return Err(EmbeddingError::convergence(format!("requested {} components but the centered matrix has numerical rank {}", k, rank)));
    }

    let singular_values: Array1<f64> = order[..k].iter().map(|&i| sigmas[i]).collect();
    let mut components: Array2<f64> = Array2::from_shape_fn((cols, k), |(i, j)| v_t[(order[j], i)]);
    fix_signs(&mut components);

    let total: f64 = a.iter().map(|x| x * x).sum();
    let explained_variance_ratio = singular_values.mapv(|s| s * s / total);

    info!("kept {} components, explaining {:.4} of the variance", k, explained_variance_ratio.sum());

    Ok(Spectrum {
        singular_values: singular_values,
        components: components,
        explained_variance_ratio: explained_variance_ratio,
    })
}

// flip each column so its largest magnitude entry is positive
fn fix_signs(components: &mut Array2<f64>) {

    for mut column in components.axis_iter_mut(Axis(1)) {
        let mut pivot = 0;
        for (i, x) in column.iter().enumerate() {
            if x.abs() > column[pivot].abs() {
                pivot = i;
            }
        }
        if column[pivot] < 0.0 {
            column.mapv_inplace(|x| -x);
        }
    }
}

// singular values (unordered) and V^T, one right singular vector per row
fn full_svd(a: &DMatrix<f64>, max_iter: usize) -> Result<(Vec<f64>, DMatrix<f64>), EmbeddingError> {

    let svd = a
        .clone()
        .try_svd(false, true, f64::EPSILON, max_iter)
        .ok_or_else(|| EmbeddingError::convergence(format!("svd did not converge within {} iterations", max_iter)))?;

    let v_t = svd.v_t.ok_or_else(|| EmbeddingError::convergence("svd returned no right singular vectors"))?;
    Ok((svd.singular_values.iter().copied().collect(), v_t))
}

// randomized range finder followed by an exact svd of the small projected matrix.
// the gaussian test matrix is seeded so results are reproducible.
fn randomized_svd(a: ArrayView2<f64>, k: usize, params: &JsonDecompose) -> Result<(Vec<f64>, DMatrix<f64>), EmbeddingError> {

    let (rows, cols) = a.dim();
    let l = (k + params.n_oversamples).min(rows.min(cols));

    let mut rng = StdRng::seed_from_u64(params.seed);
    let omega: Array2<f64> = Array2::random_using((cols, l), StandardNormal, &mut rng);

    let mut q = orthonormalize(&a.dot(&omega));
    for _ in 0..power_iterations(params, k, rows.min(cols)) {
        let z = orthonormalize(&a.t().dot(&q));
        q = orthonormalize(&a.dot(&z));
    }

    // l x cols, same right singular vectors as a restricted to the range of q
    let b = q.t().dot(&a);
    full_svd(&to_dmatrix(b.view()), params.max_iter)
}

// unset means 7 sweeps, dropping to 4 once k reaches a tenth of the smaller dimension
fn power_iterations(params: &JsonDecompose, k: usize, min_dim: usize) -> usize {
    params.n_power_iter.unwrap_or(if (k as f64) < 0.1 * min_dim as f64 { 7 } else { 4 })
}

fn orthonormalize(y: &Array2<f64>) -> Array2<f64> {
    let q = to_dmatrix(y.view()).qr().q();
    Array2::from_shape_fn((q.nrows(), q.ncols()), |(i, j)| q[(i, j)])
}

fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}
