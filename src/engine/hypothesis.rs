//! Dependency hypotheses: which variables are probabilistic parents of which.
//!
//! A [`Hypothesis`] is an immutable value describing, for every registered
//! variable, its parent set. Installing a hypothesis into a classifier
//! validates it (no self-parents, no cycles) and produces a new classifier
//! rather than mutating structure under an in-flight computation.

use smallvec::SmallVec;

use crate::engine::domain::{DomainRegistry, VarId};
use crate::engine::errors::BayesError;

/// Parent set for a single variable. Parent counts stay small (bounded by
/// the structure learner's `max_parents`), so they live inline.
pub type ParentSet = SmallVec<[VarId; 4]>;

/// A directed dependency structure over the registered variables.
///
/// Maps every variable to its set of probabilistic parents. The graph must be
/// acyclic; [`Hypothesis::validate`] enforces this when a hypothesis is
/// installed. The joint score factors as a product of per-variable
/// conditionals given these parents, which is order-invariant once every
/// variable carries a full assignment, so no topological processing order is
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hypothesis {
    /// Parent sets indexed by `VarId`.
    parents: Vec<ParentSet>,
}

impl Hypothesis {
    /// A hypothesis with no dependencies: every variable is independent.
    pub fn empty(registry: &DomainRegistry) -> Self {
        Hypothesis {
            parents: vec![ParentSet::new(); registry.len()],
        }
    }

    /// The naive Bayes structure: every non-target variable has the target
    /// as its sole parent, and the target has none.
    pub fn naive_bayes(registry: &DomainRegistry, target: VarId) -> Self {
        let mut hypothesis = Hypothesis::empty(registry);
        for var in registry.variables() {
            if var != target {
                hypothesis.parents[var.index()].push(target);
            }
        }
        hypothesis
    }

    /// Builds a hypothesis from `child name → parent names` mappings.
    ///
    /// Variables not mentioned keep an empty parent set. Unknown names fail
    /// with a configuration error.
    pub fn from_parent_sets<'a, I, P>(
        registry: &DomainRegistry,
        parent_sets: I,
    ) -> Result<Self, BayesError>
    where
        I: IntoIterator<Item = (&'a str, P)>,
        P: IntoIterator<Item = &'a str>,
    {
        let mut hypothesis = Hypothesis::empty(registry);
        for (child, parents) in parent_sets {
            let child = registry.require_var(child)?;
            for parent in parents {
                let parent = registry.require_var(parent)?;
                hypothesis.parents[child.index()].push(parent);
            }
        }
        Ok(hypothesis)
    }

    /// Builds a hypothesis from the inverted `parent name → child names`
    /// edge-map format, as used by hand-written hypothesis catalogs.
    pub fn from_edge_map<'a, I, C>(
        registry: &DomainRegistry,
        edges: I,
    ) -> Result<Self, BayesError>
    where
        I: IntoIterator<Item = (&'a str, C)>,
        C: IntoIterator<Item = &'a str>,
    {
        let mut hypothesis = Hypothesis::empty(registry);
        for (parent, children) in edges {
            let parent = registry.require_var(parent)?;
            for child in children {
                let child = registry.require_var(child)?;
                hypothesis.parents[child.index()].push(parent);
            }
        }
        Ok(hypothesis)
    }

    /// Returns the parents of a variable.
    pub fn parents(&self, var: VarId) -> &[VarId] {
        &self.parents[var.index()]
    }

    /// Iterates over all `(parent, child)` dependency pairs.
    pub fn parent_pairs(&self) -> impl Iterator<Item = (VarId, VarId)> + '_ {
        self.parents.iter().enumerate().flat_map(|(child, parents)| {
            parents
                .iter()
                .map(move |&parent| (parent, VarId(child as u32)))
        })
    }

    /// Sets the parent set of a single variable, replacing any previous one.
    pub(crate) fn set_parents(&mut self, var: VarId, parents: ParentSet) {
        self.parents[var.index()] = parents;
    }

    /// Checks that the hypothesis is well-formed for the given registry:
    /// sized to it, free of self-parents, and acyclic.
    ///
    /// A cyclic structure would make the joint score ill-defined, so this is
    /// enforced eagerly at installation time rather than trusted as a caller
    /// precondition.
    pub fn validate(&self, registry: &DomainRegistry) -> Result<(), BayesError> {
        if self.parents.len() != registry.len() {
            return Err(BayesError::InvalidHypothesis(format!(
                "hypothesis covers {} variables, registry has {}",
                self.parents.len(),
                registry.len()
            )));
        }
        for var in registry.variables() {
            if self.parents[var.index()].contains(&var) {
                return Err(BayesError::InvalidHypothesis(format!(
                    "variable '{}' is its own parent",
                    registry.var_name(var)
                )));
            }
        }

        // Kahn's algorithm over parent → child edges; leftovers mean a cycle.
        let n = self.parents.len();
        let mut indegree: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();
        let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut visited = 0usize;
        while let Some(parent) = ready.pop() {
            visited += 1;
            for (child, parents) in self.parents.iter().enumerate() {
                if parents.contains(&VarId(parent as u32)) {
                    indegree[child] -= 1;
                    if indegree[child] == 0 {
                        ready.push(child);
                    }
                }
            }
        }
        if visited != n {
            let cyclic: Vec<&str> = (0..n)
                .filter(|&i| indegree[i] > 0)
                .map(|i| registry.var_name(VarId(i as u32)))
                .collect();
            return Err(BayesError::InvalidHypothesis(format!(
                "dependency cycle involving: {}",
                cyclic.join(", ")
            )));
        }
        Ok(())
    }
}
