//! Quantifier aggregators: generalized means over truth values.
//!
//! `forall` is the generalized mean error `1 - (mean((1-v)^p))^(1/p)` and
//! `exists` the generalized mean `(mean(v^p))^(1/p)`, both with exponent
//! p >= 1. As p grows they approach strict min/max quantification; p = 1
//! is a plain arithmetic mean. Guarded variants aggregate only the
//! assignments a boolean mask selects; assignments the mask drops do not
//! contribute at all, and an empty selection is vacuously true for
//! `forall` and vacuously false for `exists`.

use candle_core::Tensor;

use crate::error::{LtnError, Result};

/// Clamp distance from the [0,1] boundary before exponentiation.
///
/// `(1-v)^p` has a non-finite gradient at v = 1 for fractional exponents;
/// pulling values this far off the boundary keeps gradients finite while
/// shifting the reported truth value by less than the clamp itself.
pub const STABILITY_EPS: f64 = 1e-4;

/// Aggregation semantics for quantifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregator {
    /// Universal quantification: `1 - (mean((1-v)^p))^(1/p)`
    PMeanError { p: f64 },
    /// Existential quantification: `(mean(v^p))^(1/p)`
    PMean { p: f64 },
}

impl Aggregator {
    /// Generalized mean error (forall). Requires p >= 1.
    pub fn pmean_error(p: f64) -> Result<Self> {
        check_exponent(p)?;
        Ok(Aggregator::PMeanError { p })
    }

    /// Generalized mean (exists). Requires p >= 1.
    pub fn pmean(p: f64) -> Result<Self> {
        check_exponent(p)?;
        Ok(Aggregator::PMean { p })
    }

    /// The value reported when no assignment survives the guard.
    fn empty_value(&self) -> f64 {
        match self {
            Aggregator::PMeanError { .. } => 1.0,
            Aggregator::PMean { .. } => 0.0,
        }
    }

    /// Reduce `truth` over the given axes.
    pub fn eval(&self, truth: &Tensor, dims: &[usize]) -> Result<Tensor> {
        let count: usize = dims.iter().map(|&d| truth.dims()[d]).product();
        if count == 0 {
            return full_like_reduced(truth, dims, self.empty_value());
        }
        let clamped = truth.clamp(STABILITY_EPS, 1.0 - STABILITY_EPS)?;
        match self {
            Aggregator::PMeanError { p } => {
                let err = (clamped.neg()? + 1.0)?;
                let mean = reduce_mean(&err.powf(*p)?, dims)?;
                Ok((mean.powf(1.0 / p)?.neg()? + 1.0)?)
            }
            Aggregator::PMean { p } => {
                let mean = reduce_mean(&clamped.powf(*p)?, dims)?;
                Ok(mean.powf(1.0 / p)?)
            }
        }
    }

    /// Reduce `truth` over the given axes, counting only assignments where
    /// `guard` is 1. `guard` must be a 0/1 tensor of the same shape as
    /// `truth`; where it selects no elements the result falls back to the
    /// vacuous value (1 for forall, 0 for exists).
    pub fn eval_masked(&self, truth: &Tensor, guard: &Tensor, dims: &[usize]) -> Result<Tensor> {
        let clamped = truth.clamp(STABILITY_EPS, 1.0 - STABILITY_EPS)?;
        let powed = match self {
            Aggregator::PMeanError { p } => (clamped.neg()? + 1.0)?.powf(*p)?,
            Aggregator::PMean { p } => clamped.powf(*p)?,
        };

        let numer = reduce_sum(&powed.mul(guard)?, dims)?;
        let count = reduce_sum(guard, dims)?;
        // Avoid 0/0 on empty selections; those lanes are overwritten below.
        let mean = numer.div(&count.maximum(&count.ones_like()?)?)?;

        let p = match self {
            Aggregator::PMeanError { p } | Aggregator::PMean { p } => *p,
        };
        let agg = match self {
            Aggregator::PMeanError { .. } => (mean.powf(1.0 / p)?.neg()? + 1.0)?,
            Aggregator::PMean { .. } => mean.powf(1.0 / p)?,
        };

        let empty = count.le(&count.zeros_like()?)?;
        let fallback = Tensor::full(self.empty_value() as f32, agg.shape(), agg.device())?;
        Ok(empty.where_cond(&fallback, &agg)?)
    }
}

fn check_exponent(p: f64) -> Result<()> {
    if p < 1.0 {
        return Err(LtnError::InvalidRange(format!(
            "aggregation exponent must satisfy p >= 1, got {p}"
        )));
    }
    Ok(())
}

/// Sum over several axes, removing them. Axes are reduced right-to-left so
/// earlier indices stay valid.
fn reduce_sum(t: &Tensor, dims: &[usize]) -> Result<Tensor> {
    let mut sorted = dims.to_vec();
    sorted.sort_unstable();
    let mut out = t.clone();
    for &d in sorted.iter().rev() {
        out = out.sum(d)?;
    }
    Ok(out)
}

fn reduce_mean(t: &Tensor, dims: &[usize]) -> Result<Tensor> {
    let count: usize = dims.iter().map(|&d| t.dims()[d]).product();
    Ok((reduce_sum(t, dims)? / count as f64)?)
}

/// A tensor of `value` shaped like `t` with `dims` removed.
fn full_like_reduced(t: &Tensor, dims: &[usize], value: f64) -> Result<Tensor> {
    let shape: Vec<usize> = t
        .dims()
        .iter()
        .enumerate()
        .filter(|(i, _)| !dims.contains(i))
        .map(|(_, &s)| s)
        .collect();
    Ok(Tensor::full(value as f32, shape, t.device())?)
}
