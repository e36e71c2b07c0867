//! Classification-quality metrics.
//!
//! A [`ConfusionMatrix`] accumulates `(truth, prediction)` pairs from a batch
//! of classifications and derives the standard quality measures. Degenerate
//! denominators yield 0.0 rather than NaN, so a run with no positive
//! predictions reports zero precision instead of poisoning downstream
//! aggregates.

use std::fmt;

/// Binary confusion matrix for the positive (fraud) class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    /// Positive records predicted positive.
    pub true_positives: u64,
    /// Negative records predicted negative.
    pub true_negatives: u64,
    /// Negative records predicted positive.
    pub false_positives: u64,
    /// Positive records predicted negative.
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    /// An empty matrix.
    pub fn new() -> Self {
        ConfusionMatrix::default()
    }

    /// Records one classified sample.
    pub fn record(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
        }
    }

    /// Total number of recorded samples.
    pub fn total(&self) -> u64 {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Fraction of samples classified correctly.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP).
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN).
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP={} TN={} FP={} FN={} (precision={:.4} recall={:.4} f1={:.4})",
            self.true_positives,
            self.true_negatives,
            self.false_positives,
            self.false_negatives,
            self.precision(),
            self.recall(),
            self.f1()
        )
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ConfusionMatrix {
        let mut m = ConfusionMatrix::new();
        // 3 TP, 4 TN, 1 FP, 2 FN
        for _ in 0..3 {
            m.record(true, true);
        }
        for _ in 0..4 {
            m.record(false, false);
        }
        m.record(false, true);
        for _ in 0..2 {
            m.record(true, false);
        }
        m
    }

    #[test]
    fn counts_accumulate_by_quadrant() {
        let m = matrix();
        assert_eq!(m.true_positives, 3);
        assert_eq!(m.true_negatives, 4);
        assert_eq!(m.false_positives, 1);
        assert_eq!(m.false_negatives, 2);
        assert_eq!(m.total(), 10);
    }

    #[test]
    fn derived_metrics_match_hand_computation() {
        let m = matrix();
        assert!((m.accuracy() - 0.7).abs() < 1e-12);
        assert!((m.precision() - 0.75).abs() < 1e-12);
        assert!((m.recall() - 0.6).abs() < 1e-12);
        let f1 = 2.0 * 0.75 * 0.6 / (0.75 + 0.6);
        assert!((m.f1() - f1).abs() < 1e-12);
    }

    #[test]
    fn degenerate_denominators_yield_zero() {
        let empty = ConfusionMatrix::new();
        assert_eq!(empty.accuracy(), 0.0);
        assert_eq!(empty.precision(), 0.0);
        assert_eq!(empty.recall(), 0.0);
        assert_eq!(empty.f1(), 0.0);
    }
}
