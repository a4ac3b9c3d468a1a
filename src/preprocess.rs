
use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use crate::error::EmbeddingError;


// the log transformed, column centered cooccurrence matrix.
// can only be built through `preprocess`, read only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CenteredMatrix {
    mc: Array2<f64>,
}

impl CenteredMatrix {

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.mc.view()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.mc.dim()
    }

    pub fn column_means(&self) -> Array1<f64> {
        // cannot fail, the matrix is never empty
        self.mc.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(self.mc.ncols()))
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.mc
    }
}

/// Applies `log(1 + x)` elementwise and subtracts the per column mean from every row.
///
/// Fails fast with [`EmbeddingError::Shape`] on a non square or empty matrix, and on
/// negative or non finite entries, instead of letting NaN flow into the decomposition.
pub fn preprocess(m: &Array2<f64>) -> Result<CenteredMatrix, EmbeddingError> {

    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(EmbeddingError::shape(format!("cooccurrence matrix must be square, got {} x {}", rows, cols)));
    }
    if rows == 0 {
        return Err(EmbeddingError::shape("cooccurrence matrix is empty"));
    }

    // min() refuses NaN (undefined order), infinities are checked separately
    let m_min = *m.min().map_err(|e| EmbeddingError::shape(format!("cannot order matrix entries: {}", e)))?;
    if m_min < 0.0 {
        return Err(EmbeddingError::shape(format!("cooccurrence matrix has a negative entry ({})", m_min)));
    }
    if let Some(((i, j), x)) = m.indexed_iter().find(|(_, x)| !x.is_finite()) {
        return Err(EmbeddingError::shape(format!("cooccurrence matrix has a non finite entry {} at ({}, {})", x, i, j)));
    }

    let logged = m.mapv(f64::ln_1p);
    let means = logged
        .mean_axis(Axis(0))
        .ok_or_else(|| EmbeddingError::shape("cannot average an empty matrix"))?;

    // broadcasting subtracts the mean vector from every row
    let mc = logged - &means;

    Ok(CenteredMatrix { mc: mc })
}


#[cfg(test)]
mod tests {

    use ndarray::{array, Array2};
    use ndarray_rand::RandomExt;
    use ndarray_rand::rand_distr::Uniform;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use super::preprocess;
    use crate::error::EmbeddingError;

    #[test]
    fn column_means_are_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let m = Array2::random_using((40, 40), Uniform::new(0.0, 50.0), &mut rng);
        let mc = preprocess(&m).unwrap();
        for mean in mc.column_means() {
            assert!(mean.abs() < 1e-12, "column mean {} is not centered", mean);
        }
    }

    #[test]
    fn log1p_then_center() {
        let m = array![[0.0, 3.0], [0.0, 0.0]];
        let mc = preprocess(&m).unwrap().into_inner();
        let l = 4.0_f64.ln();

        // first column is all zeros -> stays zero
        assert_eq!(mc[[0, 0]], 0.0);
        assert_eq!(mc[[1, 0]], 0.0);
        assert!((mc[[0, 1]] - l / 2.0).abs() < 1e-15);
        assert!((mc[[1, 1]] + l / 2.0).abs() < 1e-15);
    }

    #[test]
    fn rejects_non_square() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(matches!(preprocess(&m), Err(EmbeddingError::Shape(_))));
    }

    #[test]
    fn rejects_empty() {
        let m = Array2::<f64>::zeros((0, 0));
        assert!(matches!(preprocess(&m), Err(EmbeddingError::Shape(_))));
    }

    #[test]
    fn rejects_negative_entries() {
        let m = array![[1.0, -0.5], [2.0, 1.0]];
        assert!(matches!(preprocess(&m), Err(EmbeddingError::Shape(_))));
    }

    #[test]
    fn rejects_nan_and_infinity() {
        let m = array![[1.0, f64::NAN], [2.0, 1.0]];
        assert!(matches!(preprocess(&m), Err(EmbeddingError::Shape(_))));

        let m = array![[1.0, f64::INFINITY], [2.0, 1.0]];
        assert!(matches!(preprocess(&m), Err(EmbeddingError::Shape(_))));
    }
}
