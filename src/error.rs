//! Error types for the AHP engine.

use thiserror::Error;

/// Coarse error classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A judgment, name or matrix violated an input precondition.
    InvalidInput,
    /// The matrix is larger than the random-index table covers.
    UnsupportedSize,
    /// Eigen-decomposition produced something a positive reciprocal matrix cannot.
    Computation,
    /// Weight vectors or matrices disagree on shape.
    ShapeMismatch,
}

/// Errors raised while building matrices, extracting priorities or synthesizing rankings.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AhpError {
    #[error("matrix must have at least one row")]
    EmptyMatrix,

    #[error("invalid judgment at ({row}, {col}): {value} (must be finite and > 0)")]
    InvalidJudgment { row: usize, col: usize, value: f64 },

    #[error("judgment index ({row}, {col}) out of bounds for size {size}")]
    IndexOutOfBounds { row: usize, col: usize, size: usize },

    #[error("self comparison at index {index}")]
    SelfComparison { index: usize },

    #[error("pair ({row}, {col}) judged more than once")]
    DuplicateJudgment { row: usize, col: usize },

    #[error("missing judgment for pair ({row}, {col})")]
    MissingJudgment { row: usize, col: usize },

    #[error("matrix is not square: row {row} has {got} entries, expected {expected}")]
    NonSquare { row: usize, expected: usize, got: usize },

    #[error("diagonal entry {index} is {value}, expected 1")]
    NonUnitDiagonal { index: usize, value: f64 },

    #[error("reciprocal invariant violated at ({row}, {col}): {forward} * {backward} != 1")]
    NotReciprocal {
        row: usize,
        col: usize,
        forward: f64,
        backward: f64,
    },

    #[error("empty name in {field}")]
    EmptyName { field: &'static str },

    #[error("duplicate name in {field}: {name}")]
    DuplicateName { field: &'static str, name: String },

    #[error("unknown name in {field}: {name}")]
    UnknownName { field: &'static str, name: String },

    #[error("invalid consistency threshold: {threshold}")]
    InvalidThreshold { threshold: f64 },

    #[error("invalid criteria weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("matrix size {size} is not supported (random index table covers 1..={max})")]
    UnsupportedSize { size: usize, max: usize },

    #[error("dominant eigenvalue of {label} has non-negligible imaginary part {imaginary}")]
    ComplexEigenpair { label: String, imaginary: f64 },

    #[error("eigen decomposition of {label} failed: {reason}")]
    EigenFailure { label: String, reason: String },

    #[error("principal eigenvector of {label} has mixed signs (entry {index} = {value})")]
    MixedSignEigenvector {
        label: String,
        index: usize,
        value: f64,
    },

    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        got: usize,
    },
}

impl AhpError {
    pub fn shape_mismatch(what: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            got,
        }
    }

    pub fn eigen_failure(label: &str, reason: impl Into<String>) -> Self {
        Self::EigenFailure {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    /// Map the variant onto its taxonomy class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyMatrix
            | Self::InvalidJudgment { .. }
            | Self::IndexOutOfBounds { .. }
            | Self::SelfComparison { .. }
            | Self::DuplicateJudgment { .. }
            | Self::MissingJudgment { .. }
            | Self::NonSquare { .. }
            | Self::NonUnitDiagonal { .. }
            | Self::NotReciprocal { .. }
            | Self::EmptyName { .. }
            | Self::DuplicateName { .. }
            | Self::UnknownName { .. }
            | Self::InvalidThreshold { .. }
            | Self::InvalidWeights { .. } => ErrorKind::InvalidInput,
            Self::UnsupportedSize { .. } => ErrorKind::UnsupportedSize,
            Self::ComplexEigenpair { .. }
            | Self::EigenFailure { .. }
            | Self::MixedSignEigenvector { .. } => ErrorKind::Computation,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
        }
    }

    /// Short code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnsupportedSize => "unsupported_size",
            ErrorKind::Computation => "computation",
            ErrorKind::ShapeMismatch => "shape_mismatch",
        }
    }
}
