//! Least squares regression.

use ndarray::{Array1, Array2, Axis, s};

use crate::MathError;

/// Pivot magnitude below which the normal equations are treated as singular.
const SINGULAR_PIVOT: f64 = 1e-14;

/// Result of a least squares fit.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Estimated coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// Residuals `y - X * beta`.
    pub residuals: Array1<f64>,
    /// R-squared.
    pub r_squared: f64,
}

/// Prepend a column of ones to a design matrix.
#[must_use]
pub fn add_intercept(x: &Array2<f64>) -> Array2<f64> {
    let mut design = Array2::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(s![.., 1..]).assign(x);
    design
}

/// Ordinary least squares.
///
/// Solves: argmin_beta sum((y_i - X_i * beta)^2)
///
/// # Errors
/// Returns `MathError::ZeroVariance` when `y` is constant (R-squared undefined),
/// `MathError::Singular` when `X'X` cannot be inverted, and a dimension error when
/// `x` and `y` disagree on row count.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let weights = Array1::ones(y.len());
    weighted_least_squares(y, x, &weights)
}

/// Weighted least squares.
///
/// Solves: argmin_beta sum(w_i * (y_i - X_i * beta)^2) through the normal equations.
///
/// # Errors
/// Same conditions as [`ordinary_least_squares`], plus a dimension error for `weights`.
pub fn weighted_least_squares(
    y: &Array1<f64>,
    x: &Array2<f64>,
    weights: &Array1<f64>,
) -> Result<OlsResult, MathError> {
    let n = y.len();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if weights.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: weights.len() });
    }
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite regression input".to_string()));
    }

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return Err(MathError::ZeroVariance);
    }

    let y_weighted = y * weights;
    let x_weighted = x * &weights.view().insert_axis(Axis(1));

    let xtx = x_weighted.t().dot(x);
    let xty = x.t().dot(&y_weighted);
    let coefficients = solve_linear_system(&xtx, &xty)?;

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = 1.0 - ss_res / ss_tot;

    Ok(OlsResult { coefficients, residuals, r_squared })
}

/// Solve `Ax = b` using Gaussian elimination with partial pivoting.
fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }

    let mut aug = Array2::<f64>::zeros((n, n + 1));
    aug.slice_mut(s![.., ..n]).assign(a);
    aug.column_mut(n).assign(b);

    for col in 0..n {
        let (max_row, max_val) = (col..n)
            .map(|row| (row, aug[[row, col]].abs()))
            .fold((col, 0.0_f64), |best, cur| if cur.1 > best.1 { cur } else { best });

        if max_val < SINGULAR_PIVOT {
            return Err(MathError::Singular);
        }

        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[[i, n]];
        for j in (i + 1)..n {
            sum -= aug[[i, j]] * x[j];
        }
        x[i] = sum / aug[[i, i]];
    }

    Ok(x)
}
