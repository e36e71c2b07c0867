//! End-to-end classification tests: hypothesis swaps, smoothing limits,
//! batch behavior, and cache equivalence.

use std::num::NonZeroUsize;

use fraudbayes::{
    BayesError, Classifier, ClassifierConfig, ConfusionMatrix, DomainRegistry, Hypothesis,
    MemoryCounts,
};

/// gender (M=0, F=1) × fraud (no=0, yes=1): one M record, fraudulent;
/// five F records, all legitimate.
fn single_fraud_dataset() -> (DomainRegistry, MemoryCounts) {
    let registry = DomainRegistry::from_mappings([
        ("gender", vec!["M", "F"]),
        ("fraud", vec!["no", "yes"]),
    ])
    .unwrap();
    let mut rows = vec![vec![0, 1]];
    for _ in 0..5 {
        rows.push(vec![1, 0]);
    }
    (registry, MemoryCounts::from_rows(rows))
}

#[test]
fn vanishing_alpha_recovers_observed_record() {
    // Evidence matches exactly one record, which is fraudulent; with α → 0
    // the smoothed estimate converges to the empirical one and the classifier
    // must pick "yes".
    let (registry, counts) = single_fraud_dataset();
    let config = ClassifierConfig {
        alpha: 1e-9,
        ..ClassifierConfig::default()
    };
    let classifier = Classifier::new(registry, counts, config).unwrap();
    let outcome = classifier.classify([("gender", "M")]).unwrap();
    assert!(outcome.is_positive);
}

/// amount (low=0, high=1) × fraud dataset where the structure visibly
/// changes the prediction: marginally "no" dominates, but amount=high is
/// strong fraud evidence.
fn structure_sensitive_dataset() -> (DomainRegistry, MemoryCounts) {
    let registry = DomainRegistry::from_mappings([
        ("amount_bin", vec!["low", "high"]),
        ("fraud", vec!["no", "yes"]),
    ])
    .unwrap();
    let mut rows = Vec::new();
    for _ in 0..6 {
        rows.push(vec![0, 0]);
    }
    rows.push(vec![1, 0]);
    for _ in 0..3 {
        rows.push(vec![1, 1]);
    }
    (registry, MemoryCounts::from_rows(rows))
}

#[test]
fn hypothesis_choice_changes_the_prediction() {
    let (registry, counts) = structure_sensitive_dataset();
    let classifier =
        Classifier::new(registry, counts, ClassifierConfig::default()).unwrap();

    // Naive Bayes (the default): amount depends on fraud, so the high amount
    // pulls the prediction to "yes".
    let naive = classifier.classify([("amount_bin", "high")]).unwrap();
    assert!(naive.is_positive);

    // Fully independent structure: only the fraud marginal matters, and 70%
    // of records are legitimate.
    let empty = Hypothesis::empty(classifier.registry());
    let classifier = classifier.with_hypothesis(empty).unwrap();
    let independent = classifier.classify([("amount_bin", "high")]).unwrap();
    assert!(!independent.is_positive);
}

#[test]
fn installing_invalid_hypothesis_fails() {
    let (registry, counts) = structure_sensitive_dataset();
    let classifier =
        Classifier::new(registry, counts, ClassifierConfig::default()).unwrap();
    let cyclic = Hypothesis::from_parent_sets(
        classifier.registry(),
        [("amount_bin", vec!["fraud"]), ("fraud", vec!["amount_bin"])],
    )
    .unwrap();
    let err = classifier.with_hypothesis(cyclic).unwrap_err();
    assert!(matches!(err, BayesError::InvalidHypothesis(_)));
}

#[test]
fn one_bad_record_does_not_abort_a_batch() {
    let (registry, counts) = single_fraud_dataset();
    let classifier =
        Classifier::new(registry, counts, ClassifierConfig::default()).unwrap();

    let batch: Vec<(Vec<(&str, &str)>, bool)> = vec![
        (vec![("gender", "M")], true),
        (vec![("gender", "XX")], false), // unknown value
        (vec![("gender", "F")], false),
    ];

    let mut matrix = ConfusionMatrix::new();
    let mut failures = 0;
    for (evidence, truth) in &batch {
        match classifier.classify(evidence.iter().copied()) {
            Ok(outcome) => matrix.record(*truth, outcome.is_positive),
            Err(BayesError::UnknownValue { .. }) => failures += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(failures, 1);
    assert_eq!(matrix.total(), 2);
    assert_eq!(matrix.true_positives, 1);
    assert_eq!(matrix.true_negatives, 1);
}

#[test]
fn cache_toggle_is_invisible_in_results() {
    let (registry, counts) = structure_sensitive_dataset();
    let cached = Classifier::new(
        registry.clone(),
        counts.clone(),
        ClassifierConfig {
            cache_capacity: NonZeroUsize::new(64),
            ..ClassifierConfig::default()
        },
    )
    .unwrap();
    let uncached = Classifier::new(
        registry,
        counts,
        ClassifierConfig {
            cache_capacity: None,
            ..ClassifierConfig::default()
        },
    )
    .unwrap();

    for evidence in [("amount_bin", "low"), ("amount_bin", "high")] {
        // Repeat so the cached run actually hits its memo.
        for _ in 0..3 {
            let a = cached.classify([evidence]).unwrap();
            let b = uncached.classify([evidence]).unwrap();
            assert_eq!(a.is_positive, b.is_positive);
            assert_eq!(a.score, b.score);
        }
    }
}

#[test]
fn classification_reports_elapsed_time() {
    let (registry, counts) = single_fraud_dataset();
    let classifier =
        Classifier::new(registry, counts, ClassifierConfig::default()).unwrap();
    let outcome = classifier.classify([("gender", "F")]).unwrap();
    assert!(outcome.elapsed.as_nanos() > 0 || outcome.elapsed.is_zero());
    assert!(outcome.score > 0.0 && outcome.score <= 1.0);
}

#[test]
fn encoded_and_raw_classification_agree() {
    let (registry, counts) = single_fraud_dataset();
    let classifier =
        Classifier::new(registry, counts, ClassifierConfig::default()).unwrap();
    let gender = classifier.registry().var("gender").unwrap();

    let raw = classifier.classify([("gender", "M")]).unwrap();
    let encoded = classifier.classify_encoded(&[(gender, 0)]).unwrap();
    assert_eq!(raw.is_positive, encoded.is_positive);
    assert_eq!(raw.score, encoded.score);
}
