//! Named, JSON-friendly input and its conversion into a [`Hierarchy`].
//!
//! This is the only place names and free text are interpreted. By the time a
//! [`Hierarchy`] exists every matrix is complete and every shape is fixed.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AhpError;
use crate::hierarchy::{self, Hierarchy};
use crate::matrix::{ComparisonMatrix, MatrixBuilder};
use crate::priority::AhpConfig;

/// Ratio used for pairs nobody judged: equal importance.
pub const NEUTRAL_RATIO: f64 = 1.0;

/// "`a` is `ratio` times as important as `b`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedJudgment {
    pub a: String,
    pub b: String,
    pub ratio: f64,
}

impl NamedJudgment {
    pub fn new(a: impl Into<String>, b: impl Into<String>, ratio: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            ratio,
        }
    }
}

/// One AHP problem as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpRequest {
    pub criteria: Vec<String>,
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub criteria_judgments: Vec<NamedJudgment>,
    /// Keyed by criterion name.
    #[serde(default)]
    pub alternative_judgments: BTreeMap<String, Vec<NamedJudgment>>,
    #[serde(default)]
    pub config: Option<AhpConfig>,
}

impl AhpRequest {
    /// A request with every pair present at the neutral ratio, ready to edit.
    pub fn template(criteria: Vec<String>, alternatives: Vec<String>) -> Result<Self, AhpError> {
        let criteria = trimmed(&criteria);
        let alternatives = trimmed(&alternatives);
        hierarchy::check_names("criteria", &criteria)?;
        hierarchy::check_names("alternatives", &alternatives)?;

        let alternative_judgments = criteria
            .iter()
            .map(|c| (c.clone(), neutral_pairs(&alternatives)))
            .collect();
        Ok(Self {
            criteria_judgments: neutral_pairs(&criteria),
            criteria,
            alternatives,
            alternative_judgments,
            config: None,
        })
    }

    pub fn config(&self) -> AhpConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Resolve names to indices and complete every matrix.
    pub fn to_hierarchy(&self) -> Result<Hierarchy, AhpError> {
        let criteria = trimmed(&self.criteria);
        let alternatives = trimmed(&self.alternatives);
        hierarchy::check_names("criteria", &criteria)?;
        hierarchy::check_names("alternatives", &alternatives)?;

        let mut keyed = HashSet::new();
        for key in self.alternative_judgments.keys() {
            let name = key.trim();
            if !criteria.iter().any(|c| c == name) {
                return Err(AhpError::UnknownName {
                    field: "alternative_judgments",
                    name: key.clone(),
                });
            }
            // " cost" and "cost" are distinct map keys naming one criterion.
            if !keyed.insert(name) {
                return Err(AhpError::DuplicateName {
                    field: "alternative_judgments",
                    name: name.to_string(),
                });
            }
        }

        let criteria_matrix =
            named_matrix("criteria_judgments", &criteria, &self.criteria_judgments)?;

        let empty = Vec::new();
        let mut alternative_matrices = Vec::with_capacity(criteria.len());
        for criterion in &criteria {
            let judgments = self
                .alternative_judgments
                .iter()
                .find(|(k, _)| k.trim() == criterion)
                .map(|(_, v)| v)
                .unwrap_or(&empty);
            alternative_matrices.push(named_matrix(
                "alternative_judgments",
                &alternatives,
                judgments,
            )?);
        }

        Hierarchy::new(criteria, alternatives, criteria_matrix, alternative_matrices)
    }
}

/// Split free text such as `"cost; capacity, risk"` into names.
///
/// Separators are `,`, `;` and tab. Every segment must be non-empty after
/// trimming and names must be unique.
pub fn parse_names(field: &'static str, text: &str) -> Result<Vec<String>, AhpError> {
    let names: Vec<String> = text
        .split([',', ';', '\t'])
        .map(|s| s.trim().to_string())
        .collect();
    hierarchy::check_names(field, &names)?;
    Ok(names)
}

fn trimmed(names: &[String]) -> Vec<String> {
    names.iter().map(|s| s.trim().to_string()).collect()
}

fn neutral_pairs(names: &[String]) -> Vec<NamedJudgment> {
    let mut out = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            out.push(NamedJudgment::new(&names[i], &names[j], NEUTRAL_RATIO));
        }
    }
    out
}

fn named_matrix(
    field: &'static str,
    names: &[String],
    judgments: &[NamedJudgment],
) -> Result<ComparisonMatrix, AhpError> {
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();
    let lookup = |name: &str| {
        index
            .get(name.trim())
            .copied()
            .ok_or_else(|| AhpError::UnknownName {
                field,
                name: name.to_string(),
            })
    };

    let mut builder = MatrixBuilder::new(names.len());
    let mut judged = HashSet::new();
    for j in judgments {
        let a = lookup(&j.a)?;
        let b = lookup(&j.b)?;
        builder.push(a, b, j.ratio);
        judged.insert((a.min(b), a.max(b)));
    }

    for i in 0..names.len() {
        for k in (i + 1)..names.len() {
            if !judged.contains(&(i, k)) {
                debug!(field, a = %names[i], b = %names[k], "unjudged pair defaults to equal importance");
                builder.push(i, k, NEUTRAL_RATIO);
            }
        }
    }

    builder.build()
}
