//! The classifier engine: smoothed conditional probabilities combined into a
//! hypothesis-factored joint score, and arg-max classification.
//!
//! Probabilities are Dirichlet-smoothed maximum-likelihood estimates built
//! from counting queries:
//!
//! ```text
//! P(var = value | parents) = (count(parents ∪ {var: value}) + α) / (total + α·r)
//! ```
//!
//! where `r` is the variable's cardinality and `total` the support of the
//! parent configuration (the dataset size `N` when the parent set is empty).
//! The per-candidate joint score is the product of these conditionals over
//! all variables; it is not normalized across candidates, but every factor
//! not involving the target cancels in ratio comparisons, so the arg-max
//! matches the arg-max of the true posterior under the hypothesis's
//! factorization.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::engine::counts::{CachedCounts, CountSource};
use crate::engine::domain::{DomainRegistry, VarId};
use crate::engine::errors::BayesError;
use crate::engine::hypothesis::Hypothesis;

/// Construction-time configuration for a [`Classifier`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Dirichlet smoothing strength, applied uniformly to every count.
    /// Must be positive.
    pub alpha: f64,
    /// Name of the target variable to classify.
    pub target: String,
    /// Raw value of the target treated as the positive class.
    pub positive_value: String,
    /// Capacity of the bounded count memo; `None` disables caching.
    pub cache_capacity: Option<NonZeroUsize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            alpha: 1.0,
            target: "fraud".to_string(),
            positive_value: "yes".to_string(),
            cache_capacity: NonZeroUsize::new(10_000),
        }
    }
}

/// The outcome of classifying one evidence record.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Whether the winning target value is the configured positive class.
    pub is_positive: bool,
    /// The winning (unnormalized) joint score.
    pub score: f64,
    /// Wall-clock time spent on this classification.
    pub elapsed: Duration,
}

/// A hypothesis-conditioned Bayesian-network classifier over counting queries.
///
/// Holds a read-only [`DomainRegistry`], a memoizing counting source, and one
/// active [`Hypothesis`]. Structural changes go through
/// [`Classifier::with_hypothesis`], which validates the new structure and
/// returns a new classifier; an installed hypothesis is never mutated in
/// place under an in-flight computation.
#[derive(Debug)]
pub struct Classifier<S> {
    registry: DomainRegistry,
    counts: CachedCounts<S>,
    hypothesis: Hypothesis,
    alpha: f64,
    target: VarId,
    positive_code: usize,
    /// Snapshot size, read once at construction.
    total: u64,
}

impl<S: CountSource> Classifier<S> {
    /// Builds a classifier over `source` with the naive Bayes structure
    /// installed as the initial hypothesis.
    ///
    /// Fails with a configuration error if the target variable is not
    /// registered, or with [`BayesError::UnknownValue`] if the positive value
    /// is outside the target's domain.
    pub fn new(
        registry: DomainRegistry,
        source: S,
        config: ClassifierConfig,
    ) -> Result<Self, BayesError> {
        if !(config.alpha > 0.0) {
            return Err(BayesError::Configuration(format!(
                "smoothing parameter alpha must be positive, got {}",
                config.alpha
            )));
        }
        let target = registry.require_var(&config.target)?;
        let positive_code = registry.encode(target, &config.positive_value)?;
        let counts = CachedCounts::new(source, config.cache_capacity);
        let total = counts.total_records()?;
        let hypothesis = Hypothesis::naive_bayes(&registry, target);
        let classifier = Classifier {
            registry,
            counts,
            hypothesis,
            alpha: config.alpha,
            target,
            positive_code,
            total,
        };
        classifier.prepare_indexes();
        Ok(classifier)
    }

    /// Installs a new dependency structure, returning a new classifier.
    ///
    /// The hypothesis is validated (self-parents and cycles are rejected) and
    /// index-preparation hints are issued to the counting source for every
    /// dependency pair.
    pub fn with_hypothesis(mut self, hypothesis: Hypothesis) -> Result<Self, BayesError> {
        hypothesis.validate(&self.registry)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            edges = hypothesis.parent_pairs().count(),
            "installing hypothesis"
        );
        self.hypothesis = hypothesis;
        self.prepare_indexes();
        Ok(self)
    }

    fn prepare_indexes(&self) {
        for (parent, child) in self.hypothesis.parent_pairs() {
            self.counts.prepare_index(parent, child);
        }
    }

    /// The registry this classifier was built over.
    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// The active dependency structure.
    pub fn hypothesis(&self) -> &Hypothesis {
        &self.hypothesis
    }

    /// The smoothing parameter α.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The target variable.
    pub fn target(&self) -> VarId {
        self.target
    }

    /// The memoizing counting source.
    pub fn counts(&self) -> &CachedCounts<S> {
        &self.counts
    }

    /// Mutable access to the counting source, e.g. to register
    /// precomputed counts.
    pub fn counts_mut(&mut self) -> &mut CachedCounts<S> {
        &mut self.counts
    }

    /// Dirichlet-smoothed conditional probability
    /// `P(var = value | parent_context)` given the support `total` of the
    /// parent configuration.
    ///
    /// Strictly positive even for unseen combinations, and sums to 1 over the
    /// variable's domain for a fixed parent context.
    pub fn conditional_probability(
        &self,
        var: VarId,
        value: usize,
        parent_context: &[(VarId, usize)],
        total: u64,
    ) -> Result<f64, BayesError> {
        let r = self.registry.cardinality(var) as f64;
        let mut constraints = Vec::with_capacity(parent_context.len() + 1);
        constraints.extend_from_slice(parent_context);
        constraints.push((var, value));
        let count = self.counts.count(&constraints)?;
        Ok((count as f64 + self.alpha) / (total as f64 + self.alpha * r))
    }

    /// Computes the unnormalized joint score for every candidate value of the
    /// target variable.
    ///
    /// `evidence` must assign a code to every non-target variable; a missing
    /// assignment fails fast with [`BayesError::MissingEvidence`]. Returns
    /// exactly one `(target code, score)` entry per target-domain value, in
    /// code order. The evidence slice is never mutated; each candidate gets a
    /// fresh assignment buffer.
    pub fn joint_distribution(
        &self,
        evidence: &[(VarId, usize)],
    ) -> Result<Vec<(usize, f64)>, BayesError> {
        let mut context: Vec<Option<usize>> = vec![None; self.registry.len()];
        for &(var, code) in evidence {
            context[var.index()] = Some(code);
        }

        let target_cardinality = self.registry.cardinality(self.target);
        let mut distribution = Vec::with_capacity(target_cardinality);
        let mut parent_context: Vec<(VarId, usize)> = Vec::new();

        for target_value in 0..target_cardinality {
            context[self.target.index()] = Some(target_value);
            let mut score = 1.0f64;
            for var in self.registry.variables() {
                let value = context[var.index()].ok_or_else(|| {
                    BayesError::MissingEvidence {
                        variable: self.registry.var_name(var).to_string(),
                    }
                })?;
                parent_context.clear();
                for &parent in self.hypothesis.parents(var) {
                    let code = context[parent.index()].ok_or_else(|| {
                        BayesError::MissingEvidence {
                            variable: self.registry.var_name(parent).to_string(),
                        }
                    })?;
                    parent_context.push((parent, code));
                }
                let total = if parent_context.is_empty() {
                    self.total
                } else {
                    self.counts.count(&parent_context)?
                };
                score *= self.conditional_probability(var, value, &parent_context, total)?;
            }
            distribution.push((target_value, score));
        }
        Ok(distribution)
    }

    /// Classifies raw evidence: encodes it through the registry, computes the
    /// joint distribution, and selects the highest-scoring target value.
    ///
    /// Ties are broken by encounter order: the first maximal value wins.
    /// Deterministic for a fixed dataset snapshot.
    pub fn classify<'a, I>(&self, evidence: I) -> Result<Classification, BayesError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let start = Instant::now();
        let indexed = self.registry.index_evidence(evidence)?;
        self.classify_indexed(&indexed, start)
    }

    /// Classifies evidence that is already encoded to `(variable, code)`
    /// pairs, skipping registry lookups.
    ///
    /// Useful when records come pre-indexed from the same snapshot the
    /// counting source answers for.
    pub fn classify_encoded(
        &self,
        evidence: &[(VarId, usize)],
    ) -> Result<Classification, BayesError> {
        self.classify_indexed(evidence, Instant::now())
    }

    fn classify_indexed(
        &self,
        evidence: &[(VarId, usize)],
        start: Instant,
    ) -> Result<Classification, BayesError> {
        let distribution = self.joint_distribution(evidence)?;
        let mut best: Option<(usize, f64)> = None;
        for (value, score) in distribution {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((value, score)),
            }
        }
        let (value, score) = best.ok_or_else(|| {
            BayesError::Configuration(format!(
                "target variable '{}' has an empty domain",
                self.registry.var_name(self.target)
            ))
        })?;
        Ok(Classification {
            is_positive: value == self.positive_code,
            score,
            elapsed: start.elapsed(),
        })
    }
}
