//! The inference engine for count-based Bayesian classification.
//!
//! This module provides:
//! - **errors**: Error types for configuration, evidence, and counting failures
//! - **domain**: Variable registry with dense value codes
//! - **counts**: Counting-source boundary, in-memory table, and LRU-cached decorator
//! - **hypothesis**: Immutable dependency structures with acyclicity validation
//! - **classifier**: Smoothed conditionals, joint scoring, and classification
//! - **structure**: K2 scoring and pluggable parent-set search

pub mod errors;
pub mod domain;
pub mod counts;
pub mod hypothesis;
pub mod classifier;
pub mod structure;
