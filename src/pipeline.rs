//! End-to-end AHP evaluation: criteria weights, per-criterion alternative
//! weights, consistency reports, and the synthesized global ranking.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{self, PriorityCache};
use crate::consistency::{self, ConsistencyReport, CRITERIA_LABEL};
use crate::error::AhpError;
use crate::hierarchy::{self, GlobalRanking, Hierarchy};
use crate::matrix::ComparisonMatrix;
use crate::priority::{self, AhpConfig, PriorityVector};

/// Everything a presentation layer needs after one evaluation.
///
/// `consistency` holds the criteria report first, then one report per
/// criterion in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpOutcome {
    pub criteria: Vec<String>,
    pub alternatives: Vec<String>,
    pub criteria_matrix: ComparisonMatrix,
    pub alternative_matrices: Vec<ComparisonMatrix>,
    pub criteria_weights: PriorityVector,
    pub alternative_weights: Vec<PriorityVector>,
    pub global_ranking: GlobalRanking,
    pub consistency: Vec<ConsistencyReport>,
}

impl AhpOutcome {
    pub fn all_consistent(&self) -> bool {
        self.consistency.iter().all(|r| r.passed)
    }

    pub fn consistency_failures(&self) -> Vec<&ConsistencyReport> {
        consistency::failures(&self.consistency)
    }

    /// Alternatives with their global weight, best first. Ties keep declared order.
    pub fn ranked_alternatives(&self) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = self
            .alternatives
            .iter()
            .cloned()
            .zip(self.global_ranking.weights().iter().copied())
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }

    /// Re-run synthesis with caller-adjusted criteria weights.
    ///
    /// The scores are normalized before use, so `[3, 1]` and `[0.75, 0.25]`
    /// give the same ranking. Alternative weights are reused unchanged.
    pub fn reweighted(&self, criteria_scores: &[f64]) -> Result<GlobalRanking, AhpError> {
        if criteria_scores.len() != self.criteria.len() {
            return Err(AhpError::shape_mismatch(
                "criteria weights",
                self.criteria.len(),
                criteria_scores.len(),
            ));
        }
        let weights = PriorityVector::normalized(criteria_scores)?;
        hierarchy::synthesize(&weights, &self.alternative_weights)
    }
}

/// Evaluate a hierarchy directly.
pub fn evaluate(hierarchy: &Hierarchy, config: &AhpConfig) -> Result<AhpOutcome, AhpError> {
    run(hierarchy, config, |matrix, label| {
        priority::priority_vector(matrix, label, config)
    })
}

/// Evaluate a hierarchy, reusing priority results from `cache` where the
/// matrix contents match.
pub fn evaluate_with_cache(
    hierarchy: &Hierarchy,
    config: &AhpConfig,
    cache: &dyn PriorityCache,
) -> Result<AhpOutcome, AhpError> {
    run(hierarchy, config, |matrix, label| {
        cache::priority_vector_cached(cache, matrix, label, config)
    })
}

fn run<F>(hierarchy: &Hierarchy, config: &AhpConfig, mut extract: F) -> Result<AhpOutcome, AhpError>
where
    F: FnMut(&ComparisonMatrix, &str) -> Result<(PriorityVector, ConsistencyReport), AhpError>,
{
    config.validate()?;

    let mut reports = Vec::with_capacity(hierarchy.criteria().len() + 1);
    let (criteria_weights, criteria_report) =
        extract(hierarchy.criteria_matrix(), CRITERIA_LABEL)?;
    reports.push(criteria_report);

    let mut alternative_weights = Vec::with_capacity(hierarchy.criteria().len());
    for (criterion, matrix) in hierarchy
        .criteria()
        .iter()
        .zip(hierarchy.alternative_matrices())
    {
        let label = consistency::alternatives_label(criterion);
        let (weights, report) = extract(matrix, &label)?;
        alternative_weights.push(weights);
        reports.push(report);
    }

    for report in consistency::failures(&reports) {
        warn!(
            label = %report.label,
            consistency_ratio = report.consistency_ratio,
            threshold = config.consistency_threshold,
            "Failed consistency check"
        );
    }

    let global_ranking = hierarchy::synthesize(&criteria_weights, &alternative_weights)?;
    debug!(
        criteria = hierarchy.criteria().len(),
        alternatives = hierarchy.alternatives().len(),
        "hierarchy synthesized"
    );

    Ok(AhpOutcome {
        criteria: hierarchy.criteria().to_vec(),
        alternatives: hierarchy.alternatives().to_vec(),
        criteria_matrix: hierarchy.criteria_matrix().clone(),
        alternative_matrices: hierarchy.alternative_matrices().to_vec(),
        criteria_weights,
        alternative_weights,
        global_ranking,
        consistency: reports,
    })
}
