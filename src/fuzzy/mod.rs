//! Fuzzy operator semantics for connectives and quantifiers.
//!
//! Truth values live in [0,1]. Each connective comes in several
//! interchangeable semantics (product, Gödel, Łukasiewicz families) and
//! quantifiers are generalized-mean aggregators, so the same axiom can be
//! evaluated under different fuzzy logics by swapping the strategy value.

mod aggregators;
mod connectives;

pub use aggregators::{Aggregator, STABILITY_EPS};
pub use connectives::{negate, Conjunction, Disjunction, Implication};
