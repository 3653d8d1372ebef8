use std::collections::BTreeMap;

use ahp_harness::{
    evaluate, evaluate_with_cache, priority_vector, synthesize, AhpConfig, AhpError, AhpRequest,
    ComparisonMatrix, ErrorKind, Hierarchy, MatrixBuilder, MemoryPriorityCache, NamedJudgment,
    PriorityVector,
};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn two_items_weigh_by_the_single_ratio() {
    let a = 7.0;
    let m = MatrixBuilder::new(2).judge(0, 1, a).build().unwrap();
    assert_eq!(m.to_rows(), vec![vec![1.0, a], vec![1.0 / a, 1.0]]);

    let (w, report) = priority_vector(&m, "pair", &AhpConfig::default()).unwrap();
    assert!(approx_eq(w.weights()[0], a / (a + 1.0), 1e-9));
    assert!(approx_eq(w.weights()[1], 1.0 / (a + 1.0), 1e-9));
    assert_eq!(report.consistency_ratio, 0.0);
}

#[test]
fn two_items_with_a_huge_ratio_still_weigh_by_it() {
    let a = 1e15;
    let m = MatrixBuilder::new(2).judge(0, 1, a).build().unwrap();
    let (w, report) = priority_vector(&m, "pair", &AhpConfig::default()).unwrap();
    assert!(approx_eq(w.weights()[0], a / (a + 1.0), 1e-15));
    assert!(approx_eq(w.weights()[1], 1.0 / (a + 1.0), 1e-25));
    assert_eq!(report.consistency_ratio, 0.0);
    assert!(report.passed);
}

#[test]
fn three_criteria_with_mild_inconsistency() {
    let m = MatrixBuilder::new(3)
        .judge(0, 1, 3.0)
        .judge(0, 2, 5.0)
        .judge(1, 2, 2.0)
        .build()
        .unwrap();
    let (w, report) = priority_vector(&m, "Criteria Table", &AhpConfig::default()).unwrap();
    let want = [0.648, 0.230, 0.122];
    for (got, want) in w.weights().iter().zip(want) {
        assert!(approx_eq(*got, want, 0.01), "{w:?}");
    }
    assert!(report.consistency_ratio < 0.10);
    assert!(report.passed);
}

#[test]
fn synthesis_of_two_criteria_over_two_alternatives() {
    let criteria = PriorityVector::new(vec![0.6, 0.4]).unwrap();
    let rows = vec![
        PriorityVector::new(vec![0.7, 0.3]).unwrap(),
        PriorityVector::new(vec![0.2, 0.8]).unwrap(),
    ];
    let ranking = synthesize(&criteria, &rows).unwrap();
    assert!(approx_eq(ranking.weights()[0], 0.6 * 0.7 + 0.4 * 0.2, 1e-12));
    assert!(approx_eq(ranking.weights()[1], 0.6 * 0.3 + 0.4 * 0.8, 1e-12));
}

#[test]
fn single_item_matrix_is_always_one() {
    let m = MatrixBuilder::new(1).build().unwrap();
    let (w, report) = priority_vector(&m, "single", &AhpConfig::default()).unwrap();
    assert_eq!(w.into_inner(), vec![1.0]);
    assert_eq!(report.consistency_ratio, 0.0);
}

#[test]
fn single_criterion_hierarchy_passes_alternative_weights_through() {
    let h = Hierarchy::new(
        names(&["only"]),
        names(&["x", "y"]),
        ComparisonMatrix::uniform(1).unwrap(),
        vec![MatrixBuilder::new(2).judge(0, 1, 3.0).build().unwrap()],
    )
    .unwrap();
    let outcome = evaluate(&h, &AhpConfig::default()).unwrap();
    assert!(approx_eq(outcome.global_ranking.weights()[0], 0.75, 1e-9));
    assert!(approx_eq(outcome.global_ranking.weights()[1], 0.25, 1e-9));
}

#[test]
fn error_taxonomy() {
    let invalid = MatrixBuilder::new(2).judge(0, 1, 0.0).build().unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::InvalidInput);

    let big = ComparisonMatrix::uniform(12).unwrap();
    let unsupported = priority_vector(&big, "big", &AhpConfig::default()).unwrap_err();
    assert_eq!(unsupported.kind(), ErrorKind::UnsupportedSize);

    let ragged = synthesize(
        &PriorityVector::new(vec![0.5, 0.5]).unwrap(),
        &[
            PriorityVector::new(vec![1.0]).unwrap(),
            PriorityVector::new(vec![0.5, 0.5]).unwrap(),
        ],
    )
    .unwrap_err();
    assert_eq!(ragged.kind(), ErrorKind::ShapeMismatch);

    let loose = AhpConfig {
        imaginary_tolerance: f64::NAN,
        ..AhpConfig::default()
    };
    let m = ComparisonMatrix::uniform(3).unwrap();
    assert!(matches!(
        priority_vector(&m, "cfg", &loose),
        Err(AhpError::InvalidThreshold { .. })
    ));
}

#[test]
fn request_to_outcome_end_to_end() {
    let req = AhpRequest {
        criteria: names(&["source fluid type", "capacity", "cost"]),
        alternatives: names(&["heat pump", "district heating"]),
        criteria_judgments: vec![
            NamedJudgment::new("cost", "capacity", 2.0),
            NamedJudgment::new("cost", "source fluid type", 4.0),
            NamedJudgment::new("capacity", "source fluid type", 2.0),
        ],
        alternative_judgments: BTreeMap::from([
            (
                "cost".to_string(),
                vec![NamedJudgment::new("heat pump", "district heating", 3.0)],
            ),
            (
                "capacity".to_string(),
                vec![NamedJudgment::new("district heating", "heat pump", 5.0)],
            ),
        ]),
        config: None,
    };
    let hierarchy = req.to_hierarchy().unwrap();
    let outcome = evaluate(&hierarchy, &req.config()).unwrap();

    // Criteria are perfectly consistent at 1 : 2 : 4.
    let cw = outcome.criteria_weights.weights();
    assert!(approx_eq(cw[0], 1.0 / 7.0, 1e-9));
    assert!(approx_eq(cw[1], 2.0 / 7.0, 1e-9));
    assert!(approx_eq(cw[2], 4.0 / 7.0, 1e-9));

    // Source fluid type had no judgments: equal split.
    assert!(approx_eq(outcome.alternative_weights[0].weights()[0], 0.5, 1e-9));

    let expected_heat_pump = (1.0 / 7.0) * 0.5 + (2.0 / 7.0) * (1.0 / 6.0) + (4.0 / 7.0) * 0.75;
    assert!(approx_eq(
        outcome.global_ranking.weights()[0],
        expected_heat_pump,
        1e-9
    ));
    assert_eq!(outcome.ranked_alternatives()[0].0, "heat pump");
    assert!(outcome.all_consistent());

    let cache = MemoryPriorityCache::new();
    let cached = evaluate_with_cache(&hierarchy, &req.config(), &cache).unwrap();
    assert_eq!(cached, outcome);
}

#[test]
fn outcome_serializes_matrices_as_rows() {
    let h = Hierarchy::new(
        names(&["a", "b"]),
        names(&["x", "y"]),
        MatrixBuilder::new(2).judge(0, 1, 2.0).build().unwrap(),
        vec![
            ComparisonMatrix::uniform(2).unwrap(),
            ComparisonMatrix::uniform(2).unwrap(),
        ],
    )
    .unwrap();
    let outcome = evaluate(&h, &AhpConfig::default()).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["criteria_matrix"], serde_json::json!([[1.0, 2.0], [0.5, 1.0]]));
    assert_eq!(json["consistency"][0]["label"], "Criteria Table");
    assert_eq!(json["global_ranking"].as_array().unwrap().len(), 2);
}
