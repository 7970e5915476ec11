//! Connective wrappers: fuzzy operators lifted to formulas.
//!
//! Binary connectives align both operands onto the union of their free
//! variables before applying the elementwise operator, so formulas over
//! disjoint variables combine into their full cross product.

use candle_core::Tensor;

use crate::error::Result;
use crate::fuzzy::{negate, Conjunction, Disjunction, Implication};
use crate::grounding::{align, Formula};

fn align2(a: &Formula, b: &Formula) -> Result<(Tensor, Tensor, Vec<String>)> {
    let aligned = align(&[a.as_term(), b.as_term()])?;
    let mut tensors = aligned.tensors.into_iter();
    let ta = tensors.next().expect("two aligned operands");
    let tb = tensors.next().expect("two aligned operands");
    Ok((ta, tb, aligned.free_vars))
}

/// Fuzzy negation wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct Not;

impl Not {
    pub fn new() -> Self {
        Self
    }

    pub fn call(&self, a: &Formula) -> Result<Formula> {
        Formula::from_truth(negate(a.value())?, a.free_vars().to_vec())
    }
}

/// Conjunction wrapper holding its t-norm strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct And {
    op: Conjunction,
}

impl And {
    pub fn new(op: Conjunction) -> Self {
        Self { op }
    }

    pub fn call(&self, a: &Formula, b: &Formula) -> Result<Formula> {
        let (ta, tb, free_vars) = align2(a, b)?;
        Formula::from_truth(self.op.eval(&ta, &tb)?, free_vars)
    }
}

/// Disjunction wrapper holding its t-conorm strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Or {
    op: Disjunction,
}

impl Or {
    pub fn new(op: Disjunction) -> Self {
        Self { op }
    }

    pub fn call(&self, a: &Formula, b: &Formula) -> Result<Formula> {
        let (ta, tb, free_vars) = align2(a, b)?;
        Formula::from_truth(self.op.eval(&ta, &tb)?, free_vars)
    }
}

/// Implication wrapper holding its strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Implies {
    op: Implication,
}

impl Implies {
    pub fn new(op: Implication) -> Self {
        Self { op }
    }

    pub fn call(&self, a: &Formula, b: &Formula) -> Result<Formula> {
        let (ta, tb, free_vars) = align2(a, b)?;
        Formula::from_truth(self.op.eval(&ta, &tb)?, free_vars)
    }
}

/// Biconditional: `(a -> b) and (b -> a)` under the chosen strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equiv {
    and: Conjunction,
    implies: Implication,
}

impl Equiv {
    pub fn new(and: Conjunction, implies: Implication) -> Self {
        Self { and, implies }
    }

    pub fn call(&self, a: &Formula, b: &Formula) -> Result<Formula> {
        let (ta, tb, free_vars) = align2(a, b)?;
        let forward = self.implies.eval(&ta, &tb)?;
        let backward = self.implies.eval(&tb, &ta)?;
        Formula::from_truth(self.and.eval(&forward, &backward)?, free_vars)
    }
}
