use ndarray::{Array1, Array2, Axis};

use crate::{
    error::{AppError, AppResult},
    models::ModelSummary,
    services::features::{FeatureVector, FEATURE_COUNT},
};

/// Fewer rated entries than this cannot support a per-user fit
pub const MIN_TRAINING_ENTRIES: usize = 5;

/// Eigenvalues smaller than this fraction of the largest one are treated as zero
const RANK_TOLERANCE: f64 = 1e-10;

const MAX_JACOBI_SWEEPS: usize = 64;

/// Ordinary least-squares regression with intercept
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LinearModel {
    /// Fits on centered data through the normal equations.
    ///
    /// Rank-deficient inputs do not fail: a feature constant across the history
    /// gets a zero coefficient, and collinear features split their weight
    /// (the minimum-norm least-squares solution).
    pub fn fit(features: &[FeatureVector], targets: &[f64]) -> AppResult<Self> {
        if features.len() != targets.len() {
            return Err(AppError::Internal(format!(
                "{} feature rows for {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.len() < MIN_TRAINING_ENTRIES {
            return Err(AppError::InsufficientTrainingData {
                required: MIN_TRAINING_ENTRIES,
                found: features.len(),
            });
        }

        let x = Array2::from_shape_fn((features.len(), FEATURE_COUNT), |(i, j)| {
            features[i].to_array()[j]
        });
        let y = Array1::from(targets.to_vec());

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AppError::Internal("empty design matrix".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| AppError::Internal("empty target vector".to_string()))?;

        let x_centered = &x - &x_mean;
        let y_centered = &y - y_mean;

        let gram = x_centered.t().dot(&x_centered);
        let moments = x_centered.t().dot(&y_centered);
        let coefficients = solve_normal_equations(gram, moments);
        let intercept = y_mean - x_mean.dot(&coefficients);

        tracing::debug!(
            samples = features.len(),
            intercept,
            coefficients = ?coefficients.to_vec(),
            "Linear model fitted"
        );

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        self.intercept + Array1::from(features.to_array().to_vec()).dot(&self.coefficients)
    }

    pub fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
        features.iter().map(|f| self.predict_one(f)).collect()
    }

    pub fn summary(&self) -> ModelSummary {
        let mut coefficients = [0.0; FEATURE_COUNT];
        for (slot, value) in coefficients.iter_mut().zip(self.coefficients.iter()) {
            *slot = *value;
        }
        ModelSummary {
            intercept: self.intercept,
            coefficients,
        }
    }
}

/// Minimum-norm solution of `a x = b` for a symmetric positive semi-definite `a`.
///
/// Solves through the pseudo-inverse `V Λ⁺ Vᵀ`. Eigen-directions whose eigenvalue
/// is below the rank tolerance carry no weight, so collinear features share their
/// coefficient instead of one of them taking all of it.
fn solve_normal_equations(a: Array2<f64>, b: Array1<f64>) -> Array1<f64> {
    let (eigenvalues, eigenvectors) = symmetric_eigen(a);
    let largest = eigenvalues.iter().copied().fold(0.0, f64::max);
    let tolerance = largest * RANK_TOLERANCE;

    let mut solution = Array1::zeros(b.len());
    for (k, &lambda) in eigenvalues.iter().enumerate() {
        if lambda <= tolerance || lambda <= 0.0 {
            continue;
        }
        let direction = eigenvectors.column(k);
        let weight = direction.dot(&b) / lambda;
        solution.scaled_add(weight, &direction);
    }
    solution
}

/// Cyclic Jacobi eigendecomposition.
///
/// Returns the eigenvalues and the matching eigenvectors as columns.
fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..MAX_JACOBI_SWEEPS {
        let total: f64 = a.iter().map(|x| x * x).sum();
        let off_diagonal: f64 = a
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, x)| x * x)
            .sum();
        if off_diagonal <= total * f64::EPSILON * f64::EPSILON {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}
