//! Pairwise comparison matrices and their reciprocal completion.
//!
//! Judgments arrive as the upper triangle only: `v[i][j]` for `i < j` says how
//! many times more item `i` matters than item `j`. The lower triangle is
//! always derived (`M[j][i] = 1 / M[i][j]`) and the diagonal is pinned to 1.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AhpError;

/// Lower end of the conventional 1..9 Saaty scale (reciprocal side).
pub const SAATY_MIN: f64 = 1.0 / 9.0;
/// Upper end of the conventional 1..9 Saaty scale.
pub const SAATY_MAX: f64 = 9.0;
/// Allowed drift of `M[i][j] * M[j][i]` away from 1 for externally supplied matrices.
pub const RECIPROCAL_TOLERANCE: f64 = 1e-9;

/// Square, positive, reciprocal judgment matrix.
///
/// Only constructible through [`MatrixBuilder`], [`ComparisonMatrix::from_rows`]
/// or [`ComparisonMatrix::uniform`], all of which enforce the invariants, so
/// downstream code never re-checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ComparisonMatrix {
    values: DMatrix<f64>,
}

impl ComparisonMatrix {
    /// All-ones matrix: every item judged equally important.
    pub fn uniform(size: usize) -> Result<Self, AhpError> {
        if size == 0 {
            return Err(AhpError::EmptyMatrix);
        }
        Ok(Self {
            values: DMatrix::from_element(size, size, 1.0),
        })
    }

    /// Validate an already complete matrix given as rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, AhpError> {
        let n = rows.len();
        if n == 0 {
            return Err(AhpError::EmptyMatrix);
        }
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != n {
                return Err(AhpError::NonSquare {
                    row,
                    expected: n,
                    got: entries.len(),
                });
            }
            for (col, &value) in entries.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(AhpError::InvalidJudgment { row, col, value });
                }
            }
        }
        for (index, entries) in rows.iter().enumerate() {
            let value = entries[index];
            if (value - 1.0).abs() > RECIPROCAL_TOLERANCE {
                return Err(AhpError::NonUnitDiagonal { index, value });
            }
        }
        for row in 0..n {
            for col in (row + 1)..n {
                let forward = rows[row][col];
                let backward = rows[col][row];
                if (forward * backward - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(AhpError::NotReciprocal {
                        row,
                        col,
                        forward,
                        backward,
                    });
                }
            }
        }

        Ok(Self {
            values: DMatrix::from_fn(n, n, |r, c| if r == c { 1.0 } else { rows[r][c] }),
        })
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Entry at `(row, col)`. Panics on out-of-range indices like any matrix index.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let n = self.size();
        (0..n)
            .map(|r| (0..n).map(|c| self.values[(r, c)]).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for ComparisonMatrix {
    type Error = AhpError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<ComparisonMatrix> for Vec<Vec<f64>> {
    fn from(matrix: ComparisonMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Collects pairwise judgments and completes them into a [`ComparisonMatrix`].
///
/// A judgment given below the diagonal (`row > col`) is stored as its
/// reciprocal in the upper triangle, so `judge(2, 0, 3.0)` equals
/// `judge(0, 2, 1.0 / 3.0)`. All validation happens in [`MatrixBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct MatrixBuilder {
    size: usize,
    judgments: Vec<(usize, usize, f64)>,
}

impl MatrixBuilder {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            judgments: Vec::new(),
        }
    }

    /// Records that item `row` is `value` times as important as item `col`.
    pub fn judge(mut self, row: usize, col: usize, value: f64) -> Self {
        self.push(row, col, value);
        self
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.judgments.push((row, col, value));
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn build(&self) -> Result<ComparisonMatrix, AhpError> {
        if self.size == 0 {
            return Err(AhpError::EmptyMatrix);
        }

        let mut upper: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(row, col, value) in &self.judgments {
            if row >= self.size || col >= self.size {
                return Err(AhpError::IndexOutOfBounds {
                    row,
                    col,
                    size: self.size,
                });
            }
            if row == col {
                return Err(AhpError::SelfComparison { index: row });
            }
            if !value.is_finite() || value <= 0.0 {
                return Err(AhpError::InvalidJudgment { row, col, value });
            }
            let (key, stored) = if row < col {
                ((row, col), value)
            } else {
                ((col, row), value.recip())
            };
            if !stored.is_finite() || stored <= 0.0 {
                return Err(AhpError::InvalidJudgment { row, col, value });
            }
            if upper.insert(key, stored).is_some() {
                return Err(AhpError::DuplicateJudgment {
                    row: key.0,
                    col: key.1,
                });
            }
        }

        complete(self.size, &upper)
    }
}

/// Complete a matrix from an upper-triangular judgment map keyed by `(i, j)`.
///
/// Keys with `i > j` are accepted and treated as the reciprocal judgment, as in
/// [`MatrixBuilder`].
pub fn complete_upper_triangular(
    size: usize,
    judgments: &BTreeMap<(usize, usize), f64>,
) -> Result<ComparisonMatrix, AhpError> {
    let mut builder = MatrixBuilder::new(size);
    for (&(row, col), &value) in judgments {
        builder.push(row, col, value);
    }
    builder.build()
}

fn complete(
    size: usize,
    upper: &BTreeMap<(usize, usize), f64>,
) -> Result<ComparisonMatrix, AhpError> {
    let mut values = DMatrix::<f64>::identity(size, size);
    for row in 0..size {
        for col in (row + 1)..size {
            let value = *upper
                .get(&(row, col))
                .ok_or(AhpError::MissingJudgment { row, col })?;
            let reciprocal = value.recip();
            // Subnormal judgments have no finite reciprocal.
            if !reciprocal.is_finite() {
                return Err(AhpError::InvalidJudgment { row, col, value });
            }
            if !(SAATY_MIN..=SAATY_MAX).contains(&value) {
                debug!(row, col, value, "judgment outside the conventional 1/9..9 scale");
            }
            values[(row, col)] = value;
            values[(col, row)] = reciprocal;
        }
    }
    Ok(ComparisonMatrix { values })
}
