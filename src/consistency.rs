//! Consistency ratio bookkeeping.
//!
//! A failed check is advisory: weights are still produced and returned, the
//! report only tells the caller which table to distrust.

use serde::{Deserialize, Serialize};

use crate::error::AhpError;

/// Conventional CR cut-off; a matrix passes when `CR < 0.10`.
pub const CONSISTENCY_THRESHOLD: f64 = 0.10;

/// Label attached to the criteria matrix report.
pub const CRITERIA_LABEL: &str = "Criteria Table";

/// Largest matrix the random-index table covers.
pub const MAX_MATRIX_SIZE: usize = 11;

// Saaty's random consistency index, indexed by `size - 1`.
const RANDOM_INDEX: [f64; MAX_MATRIX_SIZE] =
    [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51];

/// Label attached to the alternatives matrix of one criterion.
pub fn alternatives_label(criterion: &str) -> String {
    format!("Alternatives Table for Criterion {criterion}")
}

/// Random index for a matrix of `size` items.
pub fn random_index(size: usize) -> Result<f64, AhpError> {
    if size == 0 {
        return Err(AhpError::EmptyMatrix);
    }
    RANDOM_INDEX
        .get(size - 1)
        .copied()
        .ok_or(AhpError::UnsupportedSize {
            size,
            max: MAX_MATRIX_SIZE,
        })
}

/// Consistency diagnostics for one comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub label: String,
    pub size: usize,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub random_index: f64,
    pub consistency_ratio: f64,
    pub passed: bool,
}

impl ConsistencyReport {
    /// Derive CI and CR from the principal eigenvalue and judge CR against
    /// `threshold`.
    ///
    /// `CI = (λmax - k) / (k - 1)`; `CR = CI / RI`, defined as 0 when RI is 0
    /// (sizes 1 and 2 are consistent by construction).
    pub fn measured(
        label: &str,
        size: usize,
        lambda_max: f64,
        random_index: f64,
        threshold: f64,
    ) -> Self {
        let consistency_index = if size > 1 {
            (lambda_max - size as f64) / (size as f64 - 1.0)
        } else {
            0.0
        };
        let consistency_ratio = if random_index > 0.0 {
            consistency_index / random_index
        } else {
            0.0
        };
        Self {
            label: label.to_string(),
            size,
            lambda_max,
            consistency_index,
            random_index,
            consistency_ratio,
            passed: consistency_ratio < threshold,
        }
    }

    /// Same measurements under another label, used when results are reused.
    pub fn relabeled(&self, label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..self.clone()
        }
    }
}

/// Re-judge an existing report: `passed = CR < threshold`.
pub fn validate(mut report: ConsistencyReport, threshold: f64) -> ConsistencyReport {
    report.passed = report.consistency_ratio < threshold;
    report
}

/// Reports that did not pass, in input order.
pub fn failures(reports: &[ConsistencyReport]) -> Vec<&ConsistencyReport> {
    reports.iter().filter(|r| !r.passed).collect()
}

pub fn validate_threshold(threshold: f64) -> Result<f64, AhpError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AhpError::InvalidThreshold { threshold });
    }
    Ok(threshold)
}
