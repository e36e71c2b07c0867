//! Error types for classifier construction, classification, and structure learning.

use thiserror::Error;

/// Errors that can occur while building domains, classifying evidence,
/// or learning dependency structures.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BayesError {
    /// The domain registry is missing a variable referenced by a hypothesis,
    /// a variable ordering, or an evidence map.
    ///
    /// Fatal: surfaced immediately and never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Evidence contains a raw value outside a variable's known domain.
    ///
    /// Surfaced per record; a batch of classifications must not be aborted
    /// because one record carries an unknown value.
    #[error("unknown value '{value}' for variable '{variable}'")]
    UnknownValue {
        /// The variable whose domain was consulted.
        variable: String,
        /// The raw value that has no assigned code.
        value: String,
    },

    /// A joint-distribution computation needed a code for a variable that the
    /// evidence does not assign.
    ///
    /// Every non-target variable must be covered by the evidence; absence is
    /// a caller error and fails fast.
    #[error("evidence missing required variable '{variable}'")]
    MissingEvidence {
        /// The unassigned variable.
        variable: String,
    },

    /// A hypothesis declares a variable as its own parent or contains a
    /// directed cycle.
    ///
    /// Detected eagerly when a hypothesis is installed; an ill-formed
    /// dependency graph would otherwise silently yield an undefined joint
    /// score.
    #[error("invalid hypothesis: {0}")]
    InvalidHypothesis(String),

    /// The counting source failed to answer a query (e.g., storage
    /// unavailable).
    ///
    /// Fatal operational error. The core performs no automatic retry; retry
    /// policy belongs to the counting source's own implementation.
    #[error("count source error: {0}")]
    CountSource(String),
}
