//! Alignment of groundings onto a shared free-variable axis order.
//!
//! Operators receive operands that may depend on different, possibly
//! overlapping sets of free variables. Alignment computes the union of
//! those sets in first-seen order and re-expresses every operand on it:
//! existing batch axes are permuted into union order, size-1 axes are
//! inserted for variables an operand does not depend on, and everything
//! is expanded to the common batch shape. After alignment the operands
//! broadcast elementwise and the result ranges over the union.

use candle_core::Tensor;
use rustc_hash::FxHashMap;

use crate::error::{LtnError, Result};
use crate::grounding::{GroundedTerm, Variable};

/// Operand tensors re-expressed on the union of their free variables.
#[derive(Debug)]
pub(crate) struct Aligned {
    /// One tensor per operand, expanded to `batch_shape` + its own
    /// feature dimensions.
    pub tensors: Vec<Tensor>,
    /// Union of the operands' free variables, first-seen order.
    pub free_vars: Vec<String>,
    /// Individual counts per union variable.
    pub batch_shape: Vec<usize>,
}

/// Align a list of groundings onto the union of their free variables.
///
/// A variable occurring in several operands must have the same individual
/// count everywhere; otherwise the axioms disagree about its domain and
/// alignment fails with `DimensionMismatch`.
pub(crate) fn align(terms: &[&GroundedTerm]) -> Result<Aligned> {
    let mut free_vars: Vec<String> = Vec::new();
    let mut batch_shape: Vec<usize> = Vec::new();
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();

    for term in terms {
        for (axis, label) in term.free_vars().iter().enumerate() {
            let size = term.value().dims()[axis];
            match positions.get(label) {
                Some(&pos) => {
                    if batch_shape[pos] != size {
                        return Err(LtnError::DimensionMismatch {
                            expected: format!("{} individuals for variable {label}", batch_shape[pos]),
                            got: format!("{size}"),
                        });
                    }
                }
                None => {
                    positions.insert(label.clone(), free_vars.len());
                    free_vars.push(label.clone());
                    batch_shape.push(size);
                }
            }
        }
    }

    let mut tensors = Vec::with_capacity(terms.len());
    for term in terms {
        tensors.push(align_one(term, &free_vars, &batch_shape, &positions)?);
    }

    Ok(Aligned {
        tensors,
        free_vars,
        batch_shape,
    })
}

fn align_one(
    term: &GroundedTerm,
    union: &[String],
    batch_shape: &[usize],
    positions: &FxHashMap<String, usize>,
) -> Result<Tensor> {
    let own = term.free_vars();
    let k = own.len();
    let rank = term.value().rank();

    // Permute the batch axes into union-relative order.
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by_key(|&axis| positions[&own[axis]]);
    let mut tensor = if order.iter().enumerate().any(|(i, &axis)| i != axis) {
        let mut perm = order;
        perm.extend(k..rank);
        term.value().permute(perm)?.contiguous()?
    } else {
        term.value().clone()
    };

    // Insert a size-1 axis for every union variable the term lacks.
    for (pos, label) in union.iter().enumerate() {
        if !own.iter().any(|v| v == label) {
            tensor = tensor.unsqueeze(pos)?;
        }
    }

    // Expand to the common batch shape, keeping feature dimensions.
    let mut target: Vec<usize> = batch_shape.to_vec();
    target.extend_from_slice(term.feature_shape());
    Ok(tensor.broadcast_as(target)?)
}

/// Diagonal (zipped) alignment of variables.
///
/// Returns new Variables that share a single synthetic free-variable
/// label, so downstream operators index them together: the i-th
/// individual of each input is paired with the i-th individual of every
/// other, instead of the full cross product. All inputs must have the
/// same individual count.
pub fn diag(vars: &[&Variable]) -> Result<Vec<Variable>> {
    if vars.len() < 2 {
        return Err(LtnError::Runtime(
            "diagonal alignment needs at least two variables".to_string(),
        ));
    }
    let count = vars[0].len();
    for var in &vars[1..] {
        if var.len() != count {
            return Err(LtnError::DimensionMismatch {
                expected: format!("{count} individuals (from variable {})", vars[0].label()),
                got: format!("{} (variable {})", var.len(), var.label()),
            });
        }
    }

    let labels: Vec<&str> = vars.iter().map(|v| v.label()).collect();
    let shared = format!("diag_{}", labels.join("_"));
    Ok(vars
        .iter()
        .map(|v| v.with_free_label(shared.clone()))
        .collect())
}

/// Undo diagonal alignment, restoring each variable's own label.
pub fn undiag(vars: &[&Variable]) -> Vec<Variable> {
    vars.iter()
        .map(|v| v.with_free_label(v.label().to_string()))
        .collect()
}
