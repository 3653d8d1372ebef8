//! Principal-eigenvector priorities for comparison matrices.
//!
//! All complex arithmetic stays inside [`dominant_eigenpair`]: by
//! Perron–Frobenius a positive matrix has a simple, real, largest eigenvalue
//! with a one-signed eigenvector, so anything else leaving that function is a
//! computation error rather than a value callers must handle.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::consistency::{self, ConsistencyReport, CONSISTENCY_THRESHOLD};
use crate::error::AhpError;
use crate::matrix::ComparisonMatrix;

/// Relative imaginary residue tolerated on the dominant eigenvalue.
pub const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// Allowed deviation of a priority vector's sum from 1.
pub const SUM_TOLERANCE: f64 = 1e-6;

// Relative bound on ‖Mv − λv‖ / ‖v‖ for the recovered eigenvector.
const RESIDUAL_TOLERANCE: f64 = 1e-6;

// Negative entries this close to zero (relative to the largest entry) are noise.
const SIGN_NOISE: f64 = 1e-12;

/// Numeric knobs for priority extraction and consistency checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AhpConfig {
    /// CR at or above this value fails the consistency check.
    pub consistency_threshold: f64,
    /// Relative imaginary part above which the dominant eigenvalue is rejected.
    pub imaginary_tolerance: f64,
}

impl Default for AhpConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: CONSISTENCY_THRESHOLD,
            imaginary_tolerance: IMAGINARY_TOLERANCE,
        }
    }
}

impl AhpConfig {
    pub fn validate(&self) -> Result<(), AhpError> {
        consistency::validate_threshold(self.consistency_threshold)?;
        if !self.imaginary_tolerance.is_finite() || self.imaginary_tolerance < 0.0 {
            return Err(AhpError::InvalidThreshold {
                threshold: self.imaginary_tolerance,
            });
        }
        Ok(())
    }
}

/// Normalized weights aligned with the rows of the matrix they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriorityVector {
    weights: Vec<f64>,
}

impl PriorityVector {
    /// Wrap externally supplied weights: non-empty, finite, non-negative, summing to 1.
    pub fn new(weights: Vec<f64>) -> Result<Self, AhpError> {
        if weights.is_empty() {
            return Err(AhpError::InvalidWeights {
                reason: "empty weight vector".to_string(),
            });
        }
        if let Some((idx, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(AhpError::InvalidWeights {
                reason: format!("entry {idx} is {w}"),
            });
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(AhpError::InvalidWeights {
                reason: format!("weights sum to {sum}, expected 1"),
            });
        }
        Ok(Self { weights })
    }

    /// Rescale non-negative scores so they sum to 1.
    pub fn normalized(scores: &[f64]) -> Result<Self, AhpError> {
        if let Some((idx, s)) = scores
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s < 0.0)
        {
            return Err(AhpError::InvalidWeights {
                reason: format!("entry {idx} is {s}"),
            });
        }
        let sum: f64 = scores.iter().sum();
        if scores.is_empty() || sum <= 0.0 {
            return Err(AhpError::InvalidWeights {
                reason: "weights must have a positive sum".to_string(),
            });
        }
        Ok(Self {
            weights: scores.iter().map(|s| s / sum).collect(),
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.weights
    }
}

impl TryFrom<Vec<f64>> for PriorityVector {
    type Error = AhpError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<PriorityVector> for Vec<f64> {
    fn from(v: PriorityVector) -> Self {
        v.weights
    }
}

/// Largest real eigenvalue and a (non-normalized) eigenvector for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DominantEigenpair {
    pub value: f64,
    pub vector: DVector<f64>,
}

/// Extract the dominant real eigenpair of a comparison matrix.
///
/// Eigenvalues come from the real Schur form; the eigenvector is the null
/// vector of `M − λI`, read off the SVD as the right singular vector of the
/// smallest singular value. Fails when the dominant eigenvalue carries a
/// non-negligible imaginary part or the recovered vector does not satisfy
/// `Mv ≈ λv`.
pub fn dominant_eigenpair(
    matrix: &ComparisonMatrix,
    label: &str,
    imaginary_tolerance: f64,
) -> Result<DominantEigenpair, AhpError> {
    let m = matrix.as_matrix();
    let n = m.nrows();
    if n == 1 {
        return Ok(DominantEigenpair {
            value: m[(0, 0)],
            vector: DVector::from_element(1, 1.0),
        });
    }

    let eigenvalues = m.complex_eigenvalues();
    let dominant = eigenvalues
        .iter()
        .copied()
        .max_by(|a, b| a.re.total_cmp(&b.re))
        .ok_or_else(|| AhpError::eigen_failure(label, "no eigenvalues"))?;
    if !dominant.re.is_finite() || !dominant.im.is_finite() {
        return Err(AhpError::eigen_failure(label, "non-finite eigenvalue"));
    }
    if dominant.im.abs() > imaginary_tolerance * dominant.re.abs().max(1.0) {
        return Err(AhpError::ComplexEigenpair {
            label: label.to_string(),
            imaginary: dominant.im,
        });
    }
    let lambda = dominant.re;

    let shifted = m - DMatrix::<f64>::identity(n, n) * lambda;
    let svd = shifted.svd(false, true);
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| AhpError::eigen_failure(label, "SVD did not produce V^T"))?;
    let (null_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .ok_or_else(|| AhpError::eigen_failure(label, "SVD produced no singular values"))?;
    let vector: DVector<f64> = v_t.row(null_idx).transpose();

    let norm = vector.norm();
    let residual = (m * &vector - &vector * lambda).norm() / norm;
    if !residual.is_finite() || residual > RESIDUAL_TOLERANCE * lambda.abs().max(1.0) {
        return Err(AhpError::eigen_failure(
            label,
            format!("eigenvector residual {residual:.3e} too large"),
        ));
    }

    Ok(DominantEigenpair {
        value: lambda,
        vector,
    })
}

/// Orient an eigenvector so it is positive and scale it to sum to 1.
///
/// The SVD may return either sign of the Perron vector. Negative entries within
/// noise of zero are clamped; a genuinely mixed-sign vector is an error.
fn normalize_principal(vector: &DVector<f64>, label: &str) -> Result<Vec<f64>, AhpError> {
    let raw_sum: f64 = vector.iter().sum();
    if !raw_sum.is_finite() || raw_sum == 0.0 {
        return Err(AhpError::eigen_failure(label, "eigenvector sums to zero"));
    }
    let sign = raw_sum.signum();
    let scale = vector.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let mut oriented = Vec::with_capacity(vector.len());
    for (index, raw) in vector.iter().enumerate() {
        let value = raw * sign;
        if value >= 0.0 {
            oriented.push(value);
        } else if -value <= SIGN_NOISE * scale {
            oriented.push(0.0);
        } else {
            return Err(AhpError::MixedSignEigenvector {
                label: label.to_string(),
                index,
                value: *raw,
            });
        }
    }

    let total: f64 = oriented.iter().sum();
    Ok(oriented.into_iter().map(|v| v / total).collect())
}

/// Priority weights and consistency report for one comparison matrix.
///
/// Size is checked against the random-index table before any decomposition,
/// so oversized matrices fail without computation. `label` only names the
/// report.
pub fn priority_vector(
    matrix: &ComparisonMatrix,
    label: &str,
    config: &AhpConfig,
) -> Result<(PriorityVector, ConsistencyReport), AhpError> {
    config.validate()?;
    let size = matrix.size();
    let random_index = consistency::random_index(size)?;

    let threshold = config.consistency_threshold;
    match size {
        1 => {
            let report = ConsistencyReport::measured(label, 1, 1.0, random_index, threshold);
            return Ok((PriorityVector { weights: vec![1.0] }, report));
        }
        2 => {
            // Any 2×2 reciprocal matrix is consistent: λmax = 2, weights a/(a+1), 1/(a+1).
            let a = matrix.get(0, 1);
            let weights = vec![a / (a + 1.0), 1.0 / (a + 1.0)];
            let report = ConsistencyReport::measured(label, 2, 2.0, random_index, threshold);
            return Ok((PriorityVector { weights }, report));
        }
        _ => {}
    }

    let pair = dominant_eigenpair(matrix, label, config.imaginary_tolerance)?;
    let weights = normalize_principal(&pair.vector, label)?;
    let report = ConsistencyReport::measured(label, size, pair.value, random_index, threshold);
    trace!(
        label,
        size,
        lambda_max = pair.value,
        consistency_ratio = report.consistency_ratio,
        "priority vector extracted"
    );

    Ok((PriorityVector { weights }, report))
}
