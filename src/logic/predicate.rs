//! Predicate wrapper: grounds a model as a fuzzy relation.
//!
//! A predicate maps every assignment of its arguments' free variables to
//! one truth value. The wrapped model is called once over the flattened
//! cross product of individuals and its output is reshaped back onto the
//! variable axes.

use candle_core::{DType, Tensor};

use crate::error::{LtnError, Result};
use crate::grounding::{Formula, GroundedTerm};
use crate::logic::{invoke, Model};

/// A fuzzy relation over grounded terms.
pub struct Predicate {
    model: Box<dyn Model>,
    squash: bool,
}

impl Predicate {
    /// Wrap a model whose output is already a truth value per assignment.
    ///
    /// Keeping the output inside [0,1] is the model's contract; it is not
    /// checked at runtime. Prefer [`from_logits`] when wrapping a network
    /// with an unbounded head.
    ///
    /// [`from_logits`]: Predicate::from_logits
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
            squash: false,
        }
    }

    /// Wrap a model producing raw logits; a sigmoid maps them into [0,1].
    pub fn from_logits(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
            squash: true,
        }
    }

    /// Ground a precomputed logits table.
    ///
    /// `table` has one axis per predicate argument; arguments must be
    /// integer-valued groundings indexing into it. Lookups go through the
    /// flattened table so gradients reach the table entries, and a sigmoid
    /// maps the gathered logits into [0,1].
    pub fn from_table(table: Tensor) -> Self {
        Self {
            model: Box::new(TableLookup { table }),
            squash: true,
        }
    }

    /// Evaluate the predicate on the given terms, producing a Formula over
    /// the union of their free variables.
    pub fn call(&self, args: &[&GroundedTerm]) -> Result<Formula> {
        let inv = invoke(self.model.as_ref(), args)?;
        let output = if self.squash {
            candle_nn::ops::sigmoid(&inv.output)?
        } else {
            inv.output
        };

        if output.elem_count() != inv.batch_len {
            return Err(LtnError::DimensionMismatch {
                expected: format!("one truth value per assignment ({})", inv.batch_len),
                got: format!("{} elements", output.elem_count()),
            });
        }

        let value = output.contiguous()?.reshape(inv.batch_shape)?;
        Formula::from_truth(value, inv.free_vars)
    }
}

/// Gather from a logits table by the linear index of integer arguments.
struct TableLookup {
    table: Tensor,
}

impl Model for TableLookup {
    fn forward(&self, args: &[Tensor]) -> candle_core::Result<Tensor> {
        let dims = self.table.dims().to_vec();
        if args.len() != dims.len() {
            return Err(candle_core::Error::Msg(format!(
                "table predicate expects {} index arguments, got {}",
                dims.len(),
                args.len()
            )));
        }

        // Linear index computed in f32 (indices are small), then converted
        // for the gather. F32 -> U32 goes through I64, as candle requires.
        let mut linear: Option<Tensor> = None;
        let mut stride = 1usize;
        for (axis, arg) in args.iter().enumerate().rev() {
            if arg.rank() != 1 {
                return Err(candle_core::Error::Msg(
                    "table predicate arguments must be scalar indices".to_string(),
                ));
            }
            let scaled = (arg.to_dtype(DType::F32)? * stride as f64)?;
            linear = Some(match linear {
                Some(acc) => (acc + scaled)?,
                None => scaled,
            });
            stride *= dims[axis];
        }

        let linear = linear.expect("table has at least one axis");
        let idx = linear.to_dtype(DType::I64)?.to_dtype(DType::U32)?;
        self.table.flatten_all()?.index_select(&idx, 0)
    }
}
