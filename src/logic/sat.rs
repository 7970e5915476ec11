//! Aggregate satisfaction of a set of closed formulas.

use candle_core::Tensor;

use crate::error::{LtnError, Result};
use crate::fuzzy::Aggregator;
use crate::grounding::Formula;

/// Combines the truth values of several closed formulas (the axioms of a
/// knowledge base) into one differentiable satisfaction scalar.
///
/// Uses the generalized mean error, so raising `p` focuses the training
/// signal on the least satisfied axiom. Typical use minimizes
/// [`loss`](SatAgg::loss) `= 1 - sat` with respect to the trainable
/// groundings and model weights feeding the formulas.
pub struct SatAgg {
    agg: Aggregator,
}

impl SatAgg {
    /// Satisfaction aggregator with exponent `p >= 1`.
    pub fn new(p: f64) -> Result<Self> {
        Ok(Self {
            agg: Aggregator::pmean_error(p)?,
        })
    }

    /// Aggregate satisfaction over the given closed formulas.
    pub fn call(&self, formulas: &[&Formula]) -> Result<Tensor> {
        if formulas.is_empty() {
            return Err(LtnError::Runtime(
                "satisfaction aggregation needs at least one formula".to_string(),
            ));
        }
        let mut truths = Vec::with_capacity(formulas.len());
        for wff in formulas {
            if !wff.is_closed() {
                return Err(LtnError::Runtime(format!(
                    "cannot aggregate an open formula (free over {:?})",
                    wff.free_vars()
                )));
            }
            truths.push(wff.value().clone());
        }
        let stacked = Tensor::stack(&truths, 0)?;
        self.agg.eval(&stacked, &[0])
    }

    /// `1 - sat`: the satisfaction deficit, as a training loss.
    pub fn loss(&self, formulas: &[&Formula]) -> Result<Tensor> {
        Ok((self.call(formulas)?.neg()? + 1.0)?)
    }
}

impl Default for SatAgg {
    fn default() -> Self {
        Self {
            agg: Aggregator::PMeanError { p: 2.0 },
        }
    }
}
