//! K2 structure learning: Bayesian-Dirichlet scoring of candidate parent
//! sets and search strategies for proposing them.
//!
//! The score of a `(child, parents)` pair is the log-scale marginal
//! likelihood
//!
//! ```text
//! Σ_i [ lnΓ(α·r) − lnΓ(N_i + α·r) + Σ_j ( lnΓ(N_ij + α) − lnΓ(α) ) ]
//! ```
//!
//! summed over parent-value configurations `i` with nonzero support, where
//! `r` is the child's cardinality, `N_i` the support of configuration `i`,
//! and `N_ij` the support of configuration `i` with the child at its `j`-th
//! value. Configurations absent from the data contribute no evidence and are
//! skipped, which also avoids the `lnΓ(0 + α·r)` vs `lnΓ(0 + α)` imbalance
//! degenerating the sum. Everything stays in log space; raw gamma values are
//! never computed.

use smallvec::SmallVec;
use statrs::function::gamma::ln_gamma;

use crate::engine::counts::CountSource;
use crate::engine::domain::{DomainRegistry, VarId};
use crate::engine::errors::BayesError;
use crate::engine::hypothesis::{Hypothesis, ParentSet};

/// Scores a candidate parent set for `child` against the counting source.
///
/// Log-scale; higher is better. Comparable only across parent sets for the
/// same child and the same snapshot.
pub fn k2_score<S: CountSource>(
    counts: &S,
    registry: &DomainRegistry,
    alpha: f64,
    child: VarId,
    parents: &[VarId],
) -> Result<f64, BayesError> {
    let r = registry.cardinality(child) as f64;
    let radices: Vec<usize> = parents.iter().map(|&p| registry.cardinality(p)).collect();
    if radices.iter().any(|&radix| radix == 0) {
        // A parent with an empty domain has no configurations to sum over.
        return Ok(0.0);
    }

    let mut total_score = 0.0;
    let mut digits = vec![0usize; parents.len()];
    loop {
        let parent_config: Vec<(VarId, usize)> = parents
            .iter()
            .copied()
            .zip(digits.iter().copied())
            .collect();
        let support = counts.count(&parent_config)?;
        if support > 0 {
            let mut config_score = ln_gamma(alpha * r) - ln_gamma(support as f64 + alpha * r);
            for child_value in 0..registry.cardinality(child) {
                let mut with_child = parent_config.clone();
                with_child.push((child, child_value));
                let n_ij = counts.count(&with_child)?;
                config_score += ln_gamma(n_ij as f64 + alpha) - ln_gamma(alpha);
            }
            total_score += config_score;
        }

        // Advance the mixed-radix counter over parent configurations.
        let mut i = 0;
        loop {
            if i == digits.len() {
                return Ok(total_score);
            }
            digits[i] += 1;
            if digits[i] < radices[i] {
                break;
            }
            digits[i] = 0;
            i += 1;
        }
    }
}

/// Scores a parent set for a fixed child variable.
pub type ParentScorer<'a> = dyn FnMut(&[VarId]) -> Result<f64, BayesError> + 'a;

/// A policy for proposing a parent set from eligible candidates.
///
/// Strategies only see the candidate list and a scoring callback, so
/// alternative searches can be substituted without touching the scoring
/// function.
pub trait SearchStrategy {
    /// Proposes a parent set drawn from `candidates`.
    ///
    /// A scoring failure for one candidate set must not abort the search for
    /// others; strategies treat such failures as "no improvement" and
    /// continue.
    fn propose_parents(
        &self,
        candidates: &[VarId],
        score: &mut ParentScorer<'_>,
    ) -> Result<ParentSet, BayesError>;
}

/// Greedy forward selection: the classic K2 inner loop.
///
/// Starts from the empty set; each round scores every remaining candidate
/// added to the current set and commits the single best strictly-improving
/// addition, stopping early when none improves. No backtracking, so the
/// result is locally but not globally optimal. Ties between equally improving
/// candidates go to the earlier candidate.
#[derive(Debug, Clone, Copy)]
pub struct GreedyForward {
    /// Maximum parent-set size.
    pub max_parents: usize,
}

impl SearchStrategy for GreedyForward {
    fn propose_parents(
        &self,
        candidates: &[VarId],
        score: &mut ParentScorer<'_>,
    ) -> Result<ParentSet, BayesError> {
        let mut current = ParentSet::new();
        let mut current_score = score(&current)?;

        for _ in 0..self.max_parents {
            if current.len() >= candidates.len() {
                break;
            }
            let mut best: Option<(VarId, f64)> = None;
            for &candidate in candidates {
                if current.contains(&candidate) {
                    continue;
                }
                let mut trial = current.clone();
                trial.push(candidate);
                match score(&trial) {
                    Ok(s) => {
                        let improves = s > current_score
                            && best.map_or(true, |(_, b)| s > b);
                        if improves {
                            best = Some((candidate, s));
                        }
                    }
                    Err(_e) => {
                        // One failing candidate must not abort the search.
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %_e, "candidate scoring failed, skipping");
                    }
                }
            }
            match best {
                Some((candidate, s)) => {
                    current.push(candidate);
                    current_score = s;
                }
                None => break,
            }
        }
        Ok(current)
    }
}

/// Exhaustive subset search, feasible only for small candidate counts.
///
/// Scores every subset of size at most `max_parents` and keeps the best one
/// that strictly beats the empty set. Subsets are enumerated in ascending
/// bitmask order, which fixes tie-breaking deterministically.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSearch {
    /// Maximum parent-set size.
    pub max_parents: usize,
}

impl SearchStrategy for ExhaustiveSearch {
    fn propose_parents(
        &self,
        candidates: &[VarId],
        score: &mut ParentScorer<'_>,
    ) -> Result<ParentSet, BayesError> {
        let n = candidates.len();
        assert!(n < usize::BITS as usize, "too many candidates for exhaustive search");

        let mut best_set = ParentSet::new();
        let mut best_score = score(&best_set)?;

        for mask in 1usize..(1 << n) {
            if (mask.count_ones() as usize) > self.max_parents {
                continue;
            }
            let subset: SmallVec<[VarId; 4]> = candidates
                .iter()
                .enumerate()
                .filter(|&(i, _)| mask & (1 << i) != 0)
                .map(|(_, &v)| v)
                .collect();
            match score(&subset) {
                Ok(s) if s > best_score => {
                    best_score = s;
                    best_set = subset;
                }
                Ok(_) => {}
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "subset scoring failed, skipping");
                }
            }
        }
        Ok(best_set)
    }
}

/// Learns a dependency structure with the K2 algorithm.
///
/// For each variable in `variable_order`, the eligible parents are the
/// variables strictly earlier in the order, so the result is acyclic by
/// construction. Variables missing from the order keep an empty parent set.
/// Deterministic given deterministic counts and a fixed strategy.
pub fn learn_structure<S: CountSource>(
    counts: &S,
    registry: &DomainRegistry,
    alpha: f64,
    strategy: &dyn SearchStrategy,
    variable_order: &[&str],
) -> Result<Hypothesis, BayesError> {
    let order: Vec<VarId> = variable_order
        .iter()
        .map(|name| registry.require_var(name))
        .collect::<Result<_, _>>()?;

    let mut hypothesis = Hypothesis::empty(registry);
    for (i, &child) in order.iter().enumerate() {
        let candidates = &order[..i];
        if candidates.is_empty() {
            continue;
        }
        let mut scorer =
            |parents: &[VarId]| k2_score(counts, registry, alpha, child, parents);
        let parents = strategy.propose_parents(candidates, &mut scorer)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            child = registry.var_name(child),
            parents = ?parents.iter().map(|&p| registry.var_name(p)).collect::<Vec<_>>(),
            "learned parent set"
        );
        hypothesis.set_parents(child, parents);
    }
    Ok(hypothesis)
}
