//! Function wrapper: grounds a model as a term-valued symbol.

use crate::error::{LtnError, Result};
use crate::grounding::GroundedTerm;
use crate::logic::{invoke, Model};

/// A term-valued symbol: maps every assignment of its arguments' free
/// variables to an individual (a vector of feature values).
///
/// Unlike a [`Predicate`](crate::Predicate) the output is unconstrained;
/// the model's trailing output axes become the result's feature axes.
pub struct Function {
    model: Box<dyn Model>,
}

impl Function {
    /// Wrap a vectorized model.
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Apply the function to the given terms, producing a term over the
    /// union of their free variables.
    pub fn call(&self, args: &[&GroundedTerm]) -> Result<GroundedTerm> {
        let inv = invoke(self.model.as_ref(), args)?;

        let out_dims = inv.output.dims().to_vec();
        if out_dims.first() != Some(&inv.batch_len) {
            return Err(LtnError::DimensionMismatch {
                expected: format!("leading batch axis of {}", inv.batch_len),
                got: format!("{out_dims:?}"),
            });
        }

        let mut shape = inv.batch_shape;
        shape.extend_from_slice(&out_dims[1..]);
        GroundedTerm::new(inv.output.contiguous()?.reshape(shape)?, inv.free_vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::{Constant, Variable};
    use candle_core::{Device, Tensor};

    #[test]
    fn test_function_keeps_feature_dims() {
        let device = Device::Cpu;
        // Two individuals in R^2 for x, one shared offset constant.
        let x = Variable::new(
            "x",
            Tensor::new(&[[0.0f32, 1.0], [2.0, 3.0]], &device).unwrap(),
        )
        .unwrap();
        let c = Constant::new(Tensor::new(&[10.0f32, 20.0], &device).unwrap());

        let translate = Function::new(|args: &[Tensor]| args[0].broadcast_add(&args[1]));
        let out = translate.call(&[x.grounding(), c.grounding()]).unwrap();

        assert_eq!(out.free_vars(), &["x".to_string()]);
        assert_eq!(out.value().dims(), &[2, 2]);
        let vals: Vec<Vec<f32>> = out.value().to_vec2().unwrap();
        assert_eq!(vals, vec![vec![10.0, 21.0], vec![12.0, 23.0]]);
    }

    #[test]
    fn test_function_over_two_variables() {
        let device = Device::Cpu;
        let x = Variable::new("x", Tensor::new(&[1.0f32, 2.0, 3.0], &device).unwrap()).unwrap();
        let y = Variable::new("y", Tensor::new(&[10.0f32, 20.0], &device).unwrap()).unwrap();

        let add = Function::new(|args: &[Tensor]| args[0].add(&args[1]));
        let out = add.call(&[x.grounding(), y.grounding()]).unwrap();

        assert_eq!(out.free_vars().len(), 2);
        assert_eq!(out.value().dims(), &[3, 2]);
        let vals: Vec<Vec<f32>> = out.value().to_vec2().unwrap();
        assert_eq!(vals[0], vec![11.0, 21.0]);
        assert_eq!(vals[2], vec![13.0, 23.0]);
    }

    #[test]
    fn test_missing_batch_axis_rejected() {
        let device = Device::Cpu;
        let x = Variable::new("x", Tensor::new(&[1.0f32, 2.0, 3.0], &device).unwrap()).unwrap();

        let collapse = Function::new(|args: &[Tensor]| args[0].sum_all());
        let err = collapse.call(&[x.grounding()]).unwrap_err();
        assert!(matches!(err, LtnError::DimensionMismatch { .. }));
    }
}
