//! Two-level hierarchy (criteria → alternatives) and its synthesis.

use std::collections::HashSet;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AhpError;
use crate::matrix::ComparisonMatrix;
use crate::priority::PriorityVector;

/// Validated criteria/alternatives bundle ready for evaluation.
///
/// Construction checks every shape up front; afterwards the hierarchy is
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    criteria: Vec<String>,
    alternatives: Vec<String>,
    criteria_matrix: ComparisonMatrix,
    alternative_matrices: Vec<ComparisonMatrix>,
}

impl Hierarchy {
    /// `alternative_matrices[i]` compares the alternatives under `criteria[i]`.
    pub fn new(
        criteria: Vec<String>,
        alternatives: Vec<String>,
        criteria_matrix: ComparisonMatrix,
        alternative_matrices: Vec<ComparisonMatrix>,
    ) -> Result<Self, AhpError> {
        check_names("criteria", &criteria)?;
        check_names("alternatives", &alternatives)?;

        let n = criteria.len();
        let m = alternatives.len();
        if criteria_matrix.size() != n {
            return Err(AhpError::shape_mismatch(
                "criteria matrix",
                n,
                criteria_matrix.size(),
            ));
        }
        if alternative_matrices.len() != n {
            return Err(AhpError::shape_mismatch(
                "alternative matrices",
                n,
                alternative_matrices.len(),
            ));
        }
        for (criterion, matrix) in criteria.iter().zip(&alternative_matrices) {
            if matrix.size() != m {
                return Err(AhpError::shape_mismatch(
                    format!("alternatives matrix for criterion {criterion}"),
                    m,
                    matrix.size(),
                ));
            }
        }

        Ok(Self {
            criteria,
            alternatives,
            criteria_matrix,
            alternative_matrices,
        })
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn criteria_matrix(&self) -> &ComparisonMatrix {
        &self.criteria_matrix
    }

    pub fn alternative_matrices(&self) -> &[ComparisonMatrix] {
        &self.alternative_matrices
    }
}

/// Names must be non-empty after trimming and unique within their list.
pub(crate) fn check_names(field: &'static str, names: &[String]) -> Result<(), AhpError> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(AhpError::EmptyName { field });
        }
        if !seen.insert(name.as_str()) {
            return Err(AhpError::DuplicateName {
                field,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Final alternative weights, aligned with the hierarchy's alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalRanking {
    weights: Vec<f64>,
}

impl GlobalRanking {
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Index of the highest-weighted alternative; the earliest wins ties.
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, w) in self.weights.iter().enumerate() {
            match best {
                Some(b) if self.weights[b] >= *w => {}
                _ => best = Some(idx),
            }
        }
        best
    }
}

/// Combine criteria weights with per-criterion alternative weights.
///
/// Row `i` of `alternative_weights` holds the alternatives' weights under
/// criterion `i`. The result is `W[a] = Σ_i criteria[i] · rows[i][a]`, a convex
/// combination when every input sums to 1.
pub fn synthesize(
    criteria_weights: &PriorityVector,
    alternative_weights: &[PriorityVector],
) -> Result<GlobalRanking, AhpError> {
    let n = criteria_weights.len();
    if alternative_weights.len() != n {
        return Err(AhpError::shape_mismatch(
            "alternative weight rows",
            n,
            alternative_weights.len(),
        ));
    }
    let m = alternative_weights
        .first()
        .map(PriorityVector::len)
        .ok_or_else(|| AhpError::shape_mismatch("alternative weight rows", n, 0))?;
    for (idx, row) in alternative_weights.iter().enumerate() {
        if row.len() != m {
            return Err(AhpError::shape_mismatch(
                format!("alternative weights row {idx}"),
                m,
                row.len(),
            ));
        }
    }

    let stack = DMatrix::from_fn(n, m, |i, a| alternative_weights[i].weights()[a]);
    let criteria = DVector::from_column_slice(criteria_weights.weights());
    let global = stack.tr_mul(&criteria);

    Ok(GlobalRanking {
        weights: global.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn pv(w: &[f64]) -> PriorityVector {
        PriorityVector::new(w.to_vec()).unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn synthesize_weighted_sum() {
        let ranking = synthesize(
            &pv(&[0.6, 0.4]),
            &[pv(&[0.7, 0.3]), pv(&[0.2, 0.8])],
        )
        .unwrap();
        assert!((ranking.weights()[0] - 0.50).abs() < 1e-12);
        assert!((ranking.weights()[1] - 0.50).abs() < 1e-12);
    }

    #[test]
    fn synthesize_three_alternatives() {
        let ranking = synthesize(
            &pv(&[0.5, 0.3, 0.2]),
            &[
                pv(&[0.2, 0.3, 0.5]),
                pv(&[0.6, 0.2, 0.2]),
                pv(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]),
            ],
        )
        .unwrap();
        let want = [
            0.5 * 0.2 + 0.3 * 0.6 + 0.2 / 3.0,
            0.5 * 0.3 + 0.3 * 0.2 + 0.2 / 3.0,
            0.5 * 0.5 + 0.3 * 0.2 + 0.2 / 3.0,
        ];
        for (g, w) in ranking.weights().iter().zip(want) {
            assert!((g - w).abs() < 1e-12);
        }
        assert!((ranking.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(ranking.best(), Some(2));
    }

    #[test]
    fn synthesize_rejects_ragged_rows() {
        let err = synthesize(
            &pv(&[0.5, 0.5]),
            &[pv(&[0.5, 0.5]), pv(&[0.2, 0.3, 0.5])],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn synthesize_rejects_wrong_row_count() {
        let err = synthesize(&pv(&[0.5, 0.5]), &[pv(&[0.5, 0.5])]).unwrap_err();
        assert_eq!(
            err,
            AhpError::shape_mismatch("alternative weight rows", 2, 1)
        );
    }

    #[test]
    fn hierarchy_checks_shapes_and_names() {
        let c2 = ComparisonMatrix::uniform(2).unwrap();
        let a3 = ComparisonMatrix::uniform(3).unwrap();
        let a2 = ComparisonMatrix::uniform(2).unwrap();

        assert!(Hierarchy::new(
            names(&["cost", "capacity"]),
            names(&["x", "y", "z"]),
            c2.clone(),
            vec![a3.clone(), a3.clone()],
        )
        .is_ok());

        let err = Hierarchy::new(
            names(&["cost", "capacity"]),
            names(&["x", "y", "z"]),
            c2.clone(),
            vec![a3.clone(), a2],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        let err = Hierarchy::new(
            names(&["cost", "capacity"]),
            names(&["x", "y", "z"]),
            c2.clone(),
            vec![a3.clone()],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        let err = Hierarchy::new(
            names(&["cost", "cost"]),
            names(&["x", "y", "z"]),
            c2,
            vec![a3.clone(), a3],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AhpError::DuplicateName {
                field: "criteria",
                name: "cost".to_string()
            }
        );
    }
}
