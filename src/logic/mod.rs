//! Logical symbols: predicates, functions, connectives, quantifiers.
//!
//! These wrappers compose the fuzzy operator library with the alignment
//! engine: operands are re-expressed on the union of their free variables,
//! the operator runs once over the whole batch, and the result is a new
//! grounding over that union. Formula construction is pure; the only
//! mutable state anywhere is the trainable storage behind constants,
//! propositions and model weights.

mod connective;
mod function;
mod predicate;
mod quantifier;
mod sat;

pub use connective::{And, Equiv, Implies, Not, Or};
pub use function::Function;
pub use predicate::Predicate;
pub use quantifier::Quantifier;
pub use sat::SatAgg;

use candle_core::Tensor;

use crate::error::{LtnError, Result};
use crate::grounding::{align, GroundedTerm};

/// A vectorized differentiable model over batched tensor arguments.
///
/// Each argument arrives with one flattened leading batch axis (all free
/// variables combined) followed by that argument's feature axes; the model
/// is invoked once per call, never once per individual. Implemented for
/// any `Fn(&[Tensor]) -> candle_core::Result<Tensor>` closure.
pub trait Model: Send + Sync {
    fn forward(&self, args: &[Tensor]) -> candle_core::Result<Tensor>;
}

impl<F> Model for F
where
    F: Fn(&[Tensor]) -> candle_core::Result<Tensor> + Send + Sync,
{
    fn forward(&self, args: &[Tensor]) -> candle_core::Result<Tensor> {
        self(args)
    }
}

/// Result of invoking a model on aligned, batch-flattened arguments.
pub(crate) struct Invocation {
    /// Raw model output; leading axis is the flattened batch.
    pub output: Tensor,
    /// Union free variables of the arguments.
    pub free_vars: Vec<String>,
    /// Individual counts per union variable.
    pub batch_shape: Vec<usize>,
    /// Product of `batch_shape` (at least 1).
    pub batch_len: usize,
}

/// Align arguments, flatten the common batch to one axis, run the model.
pub(crate) fn invoke(model: &dyn Model, args: &[&GroundedTerm]) -> Result<Invocation> {
    if args.is_empty() {
        return Err(LtnError::Runtime(
            "symbol application needs at least one argument".to_string(),
        ));
    }

    let aligned = align(args)?;
    let batch_len: usize = aligned.batch_shape.iter().product();

    let mut flat = Vec::with_capacity(aligned.tensors.len());
    for tensor in &aligned.tensors {
        let mut shape = vec![batch_len];
        shape.extend_from_slice(&tensor.dims()[aligned.batch_shape.len()..]);
        flat.push(tensor.contiguous()?.reshape(shape)?);
    }

    let output = model.forward(&flat)?;
    Ok(Invocation {
        output,
        free_vars: aligned.free_vars,
        batch_shape: aligned.batch_shape,
        batch_len,
    })
}
