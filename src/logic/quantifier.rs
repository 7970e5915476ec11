//! Quantifier wrapper: aggregate a formula over some of its variables.

use candle_core::{DType, Tensor};
use rustc_hash::FxHashSet;

use crate::error::{LtnError, Result};
use crate::fuzzy::Aggregator;
use crate::grounding::{align, Formula, Variable};

/// Quantifies a formula over one or more variables.
///
/// The aggregation strategy is chosen once at construction; `forall` uses
/// the generalized mean error, `exists` the generalized mean. Quantified
/// variables are identified by their current free-variable label, so
/// diagonally aligned variables are aggregated as the single shared axis
/// they occupy.
pub struct Quantifier {
    agg: Aggregator,
}

impl Quantifier {
    /// Universal quantifier with aggregation exponent `p >= 1`.
    pub fn forall(p: f64) -> Result<Self> {
        Ok(Self {
            agg: Aggregator::pmean_error(p)?,
        })
    }

    /// Existential quantifier with aggregation exponent `p >= 1`.
    pub fn exists(p: f64) -> Result<Self> {
        Ok(Self {
            agg: Aggregator::pmean(p)?,
        })
    }

    /// Aggregate `wff` over the given variables.
    ///
    /// Every quantified variable must occur free in the formula; the
    /// result's free variables are the formula's minus the quantified
    /// ones.
    pub fn call(&self, vars: &[&Variable], wff: &Formula) -> Result<Formula> {
        let labels = quantified_labels(vars)?;

        let mut dims = Vec::with_capacity(labels.len());
        for label in &labels {
            dims.push(wff.as_term().axis_of(label)?);
        }

        let value = self.agg.eval(wff.value(), &dims)?;
        let remaining = remaining_vars(wff.free_vars(), &labels);
        Formula::from_truth(value, remaining)
    }

    /// Aggregate `wff` over the given variables, restricted to the
    /// assignments where `guard` holds.
    ///
    /// The guard is a formula over (a subset of) the same variables; it is
    /// binarized at 0.5 and assignments it drops are excluded from the
    /// aggregate entirely. Outer indices where nothing survives report the
    /// vacuous value: 1 for forall, 0 for exists.
    pub fn call_masked(&self, vars: &[&Variable], wff: &Formula, guard: &Formula) -> Result<Formula> {
        let labels = quantified_labels(vars)?;

        let aligned = align(&[wff.as_term(), guard.as_term()])?;
        let mut dims = Vec::with_capacity(labels.len());
        for label in &labels {
            let pos = aligned
                .free_vars
                .iter()
                .position(|v| v == label)
                .ok_or_else(|| LtnError::UndefinedVariable {
                    label: label.clone(),
                })?;
            dims.push(pos);
        }

        let truth = &aligned.tensors[0];
        let keep = binarize(&aligned.tensors[1])?;
        let value = self.agg.eval_masked(truth, &keep, &dims)?;
        let remaining = remaining_vars(&aligned.free_vars, &labels);
        Formula::from_truth(value, remaining)
    }
}

/// Current free-variable labels of the quantified variables, deduplicated
/// in order (diagonally aligned variables share one label).
fn quantified_labels(vars: &[&Variable]) -> Result<Vec<String>> {
    if vars.is_empty() {
        return Err(LtnError::Runtime(
            "quantifier needs at least one variable".to_string(),
        ));
    }
    let mut seen = FxHashSet::default();
    let mut labels = Vec::new();
    for var in vars {
        let label = &var.grounding().free_vars()[0];
        if seen.insert(label.clone()) {
            labels.push(label.clone());
        }
    }
    Ok(labels)
}

fn remaining_vars(free_vars: &[String], quantified: &[String]) -> Vec<String> {
    free_vars
        .iter()
        .filter(|v| !quantified.contains(v))
        .cloned()
        .collect()
}

fn binarize(guard: &Tensor) -> Result<Tensor> {
    let half = (guard.ones_like()? * 0.5)?;
    Ok(guard.gt(&half)?.to_dtype(DType::F32)?)
}
