
use ndarray::prelude::*;
use tracing::debug;
use crate::error::EmbeddingError;
use crate::preprocess::CenteredMatrix;

// below this norm a row or column cannot be scaled to unit length
pub const NORM_EPS: f64 = 1e-12;


/// Projects the centered matrix onto the components and normalizes the result.
///
/// Columns of `P = Mc V` are scaled to unit length first, which equalizes the principal
/// axes regardless of their singular value, and only then every row, so that dot
/// products between rows are cosine similarities. The two steps do not commute.
pub fn build_embeddings(mc: &CenteredMatrix, components: &Array2<f64>) -> Result<Array2<f64>, EmbeddingError> {

    let (n, d) = mc.dim();
    if components.nrows() != d {
        return Err(EmbeddingError::shape(format!("components have {} rows but the centered matrix has {} columns", components.nrows(), d)));
    }

    let mut p = mc.view().dot(components);
    normalize_columns(&mut p)?;
    normalize_rows(&mut p)?;

    debug!("built {} embeddings of dimension {}", n, p.ncols());
    Ok(p)
}

pub fn normalize_columns(p: &mut Array2<f64>) -> Result<(), EmbeddingError> {
    normalize_lanes(p, Axis(1), "column")
}

pub fn normalize_rows(p: &mut Array2<f64>) -> Result<(), EmbeddingError> {
    normalize_lanes(p, Axis(0), "row")
}

fn normalize_lanes(p: &mut Array2<f64>, axis: Axis, what: &str) -> Result<(), EmbeddingError> {

    for (i, mut lane) in p.axis_iter_mut(axis).enumerate() {
        let norm = lane.dot(&lane).sqrt();
        if !(norm > NORM_EPS) {
            return Err(EmbeddingError::degenerate(format!("{} {}", what, i), norm));
        }
        lane /= norm;
    }
    Ok(())
}

/// Scales a single vector to unit length.
pub fn normalized(v: ArrayView1<f64>, what: &str) -> Result<Array1<f64>, EmbeddingError> {
    let norm = v.dot(&v).sqrt();
    if !(norm > NORM_EPS) {
        return Err(EmbeddingError::degenerate(what, norm));
    }
    Ok(&v / norm)
}
