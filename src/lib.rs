//! # Fraudbayes - Count-Based Bayesian Network Classifier
//!
//! Fraudbayes estimates the probability that a categorical transaction record
//! is fraudulent, under a configurable dependency structure among a small
//! fixed set of variables, and learns such structures from data with the K2
//! algorithm.
//!
//! ## Architecture
//!
//! The system is organized into two modules:
//!
//! - **engine**: Domain registry, counting boundary with an LRU memo,
//!   dependency hypotheses, the classifier, and K2 structure learning
//! - **metrics**: Classification-quality measures for evaluating batches
//!
//! All inference reduces to counting queries of the form "how many records
//! match this conjunction of variable = code constraints" against a fixed
//! dataset snapshot, answered by anything implementing
//! [`CountSource`](engine::counts::CountSource).
//!
//! ## Usage
//!
//! ```rust
//! use fraudbayes::{Classifier, ClassifierConfig, DomainRegistry, MemoryCounts};
//!
//! let registry = DomainRegistry::from_mappings([
//!     ("gender", vec!["M", "F"]),
//!     ("fraud", vec!["no", "yes"]),
//! ]).expect("valid domains");
//!
//! let counts = MemoryCounts::from_rows(vec![
//!     vec![0, 0],
//!     vec![0, 1],
//!     vec![1, 0],
//! ]);
//!
//! let classifier = Classifier::new(registry, counts, ClassifierConfig::default())
//!     .expect("valid configuration");
//! let outcome = classifier.classify([("gender", "M")]).expect("known values");
//! assert!(outcome.score > 0.0);
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use engine::classifier::{Classification, Classifier, ClassifierConfig};
pub use engine::counts::{CachedCounts, CountSource, MemoryCounts};
pub use engine::domain::{DomainRegistry, VarId};
pub use engine::errors::BayesError;
pub use engine::hypothesis::Hypothesis;
pub use engine::structure::{
    k2_score, learn_structure, ExhaustiveSearch, GreedyForward, SearchStrategy,
};
pub use metrics::ConfusionMatrix;
