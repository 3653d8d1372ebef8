#![forbid(unsafe_code)]

//! # ahp-harness
//!
//! Analytic Hierarchy Process, eigenvector flavour.
//!
//! Pairwise judgments ("criterion A matters 3× as much as criterion B") are
//! completed into reciprocal matrices, each matrix is reduced to the
//! normalized principal eigenvector of Perron–Frobenius theory, every matrix
//! gets a consistency ratio against Saaty's random index, and per-criterion
//! alternative weights are folded into one global ranking.
//!
//! ```text
//! AhpRequest ──to_hierarchy──▶ Hierarchy ──evaluate──▶ AhpOutcome
//!                               │                         ├─ criteria / alternative weights
//!              MatrixBuilder ───┘                         ├─ consistency reports
//!                                                         └─ global ranking
//! ```
//!
//! Consistency failures are reported, never fatal; hard errors are
//! [`AhpError`] values classified by [`ErrorKind`].

pub mod cache;
pub mod consistency;
pub mod error;
pub mod hierarchy;
pub mod matrix;
pub mod pipeline;
pub mod priority;
pub mod request;

pub use cache::{MemoryPriorityCache, PriorityCache, PriorityCacheKey};
pub use consistency::{ConsistencyReport, CONSISTENCY_THRESHOLD};
pub use error::{AhpError, ErrorKind};
pub use hierarchy::{synthesize, GlobalRanking, Hierarchy};
pub use matrix::{ComparisonMatrix, MatrixBuilder};
pub use pipeline::{evaluate, evaluate_with_cache, AhpOutcome};
pub use priority::{priority_vector, AhpConfig, PriorityVector};
pub use request::{parse_names, AhpRequest, NamedJudgment};
