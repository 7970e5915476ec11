//! Grounded terms: tensors tagged with the free variables they range over.
//!
//! A `GroundedTerm` pairs a tensor with an ordered list of free-variable
//! labels, one per leading axis. Constants have no free variables, a
//! Variable has exactly one (its own label), and derived terms carry the
//! union of their operands' labels. Formulas are groundings whose value is
//! a truth value per assignment, with no feature dimensions.

use candle_core::{Device, Tensor, Var};
use rustc_hash::FxHashSet;

use crate::error::{LtnError, Result};

/// A tensor together with the free logical variables it depends on.
///
/// Invariants, checked at construction:
/// - `free_vars` contains no duplicate labels
/// - `value` has at least one axis per free variable; the i-th leading
///   axis ranges over the individuals of `free_vars[i]`
#[derive(Debug, Clone)]
pub struct GroundedTerm {
    value: Tensor,
    free_vars: Vec<String>,
}

impl GroundedTerm {
    /// Wrap a tensor, declaring which free variables its leading axes range over.
    pub fn new(value: Tensor, free_vars: Vec<String>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for label in &free_vars {
            if !seen.insert(label.as_str()) {
                return Err(LtnError::Runtime(format!(
                    "duplicate free variable label: {label}"
                )));
            }
        }
        if value.rank() < free_vars.len() {
            return Err(LtnError::DimensionMismatch {
                expected: format!("rank >= {} (one axis per free variable)", free_vars.len()),
                got: format!("rank {}", value.rank()),
            });
        }
        Ok(Self { value, free_vars })
    }

    /// The underlying tensor.
    pub fn value(&self) -> &Tensor {
        &self.value
    }

    /// Ordered free-variable labels, one per leading axis.
    pub fn free_vars(&self) -> &[String] {
        &self.free_vars
    }

    /// True if the term depends on no free variable.
    pub fn is_closed(&self) -> bool {
        self.free_vars.is_empty()
    }

    /// Sizes of the batch axes (one per free variable).
    pub fn batch_shape(&self) -> &[usize] {
        &self.value.dims()[..self.free_vars.len()]
    }

    /// Sizes of the trailing feature axes.
    pub fn feature_shape(&self) -> &[usize] {
        &self.value.dims()[self.free_vars.len()..]
    }

    /// Position of the axis owned by `label`.
    pub fn axis_of(&self, label: &str) -> Result<usize> {
        self.free_vars
            .iter()
            .position(|v| v == label)
            .ok_or_else(|| LtnError::UndefinedVariable {
                label: label.to_string(),
            })
    }

    /// Project onto the `index`-th individual of variable `label`.
    ///
    /// Slices the axis owned by `label` at `index` and removes the label
    /// from the free variables.
    pub fn take(&self, label: &str, index: usize) -> Result<Self> {
        let axis = self.axis_of(label)?;
        let value = self.value.narrow(axis, index, 1)?.squeeze(axis)?;
        let mut free_vars = self.free_vars.clone();
        free_vars.remove(axis);
        Ok(Self { value, free_vars })
    }

    pub(crate) fn from_parts(value: Tensor, free_vars: Vec<String>) -> Self {
        Self { value, free_vars }
    }

    pub(crate) fn with_free_vars(&self, free_vars: Vec<String>) -> Self {
        Self {
            value: self.value.clone(),
            free_vars,
        }
    }
}

/// A grounding for a single individual. No free variables.
///
/// Trainable constants are backed by a [`candle_core::Var`], so gradient
/// descent on a satisfaction loss moves the individual's embedding. The
/// storage is shared: reading the grounding after an optimizer step sees
/// the updated value.
#[derive(Debug, Clone)]
pub struct Constant {
    grounding: GroundedTerm,
    var: Option<Var>,
}

impl Constant {
    /// A fixed (non-trainable) individual.
    pub fn new(value: Tensor) -> Self {
        Self {
            grounding: GroundedTerm::from_parts(value, Vec::new()),
            var: None,
        }
    }

    /// A trainable individual whose storage participates in gradient updates.
    pub fn trainable(value: Tensor) -> Result<Self> {
        let var = Var::from_tensor(&value)?;
        let grounding = GroundedTerm::from_parts(var.as_tensor().clone(), Vec::new());
        Ok(Self {
            grounding,
            var: Some(var),
        })
    }

    /// The constant's grounding.
    pub fn grounding(&self) -> &GroundedTerm {
        &self.grounding
    }

    /// The backing variable, if trainable.
    pub fn var(&self) -> Option<&Var> {
        self.var.as_ref()
    }

    /// Whether the underlying storage is updated by gradient descent.
    pub fn is_trainable(&self) -> bool {
        self.var.is_some()
    }
}

/// A labelled sequence of individuals.
///
/// The grounding's first axis enumerates the individuals; duplicates are
/// permitted and meaningful. The free-variable label starts out as the
/// variable's own label and is substituted by [`diag`](crate::diag) for
/// zipped quantification.
#[derive(Debug, Clone)]
pub struct Variable {
    label: String,
    grounding: GroundedTerm,
}

impl Variable {
    /// Create a variable ranging over the individuals stacked along the
    /// first axis of `individuals`.
    pub fn new(label: &str, individuals: Tensor) -> Result<Self> {
        if individuals.rank() < 1 {
            return Err(LtnError::DimensionMismatch {
                expected: "rank >= 1 (first axis enumerates individuals)".to_string(),
                got: "rank 0".to_string(),
            });
        }
        let grounding = GroundedTerm::new(individuals, vec![label.to_string()])?;
        Ok(Self {
            label: label.to_string(),
            grounding,
        })
    }

    /// The variable's own label (unchanged by diagonal alignment).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The variable's grounding. Its single free variable is the label
    /// currently used for broadcasting, which differs from [`label`]
    /// after diagonal alignment.
    ///
    /// [`label`]: Variable::label
    pub fn grounding(&self) -> &GroundedTerm {
        &self.grounding
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.grounding.value().dims()[0]
    }

    /// True if the variable ranges over no individuals.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn with_free_label(&self, free_label: String) -> Self {
        Self {
            label: self.label.clone(),
            grounding: self.grounding.with_free_vars(vec![free_label]),
        }
    }
}

/// A trainable zero-dimensional truth value.
///
/// The raw storage is unconstrained so gradients stay well-defined; the
/// grounding projects it into [0,1] with a clamp at read time.
#[derive(Debug, Clone)]
pub struct Proposition {
    var: Var,
}

impl Proposition {
    /// Create a proposition with an initial truth value in [0,1].
    pub fn new(truth: f64, device: &Device) -> Result<Self> {
        if !(0.0..=1.0).contains(&truth) {
            return Err(LtnError::InvalidRange(format!(
                "proposition truth must be in [0,1], got {truth}"
            )));
        }
        let init = Tensor::new(truth as f32, device)?;
        let var = Var::from_tensor(&init)?;
        Ok(Self { var })
    }

    /// The proposition's grounding: a closed formula in [0,1].
    pub fn grounding(&self) -> Result<Formula> {
        let value = self.var.as_tensor().clamp(0.0, 1.0)?;
        Ok(Formula {
            term: GroundedTerm::from_parts(value, Vec::new()),
        })
    }

    /// The backing variable, for registration with an optimizer.
    pub fn var(&self) -> &Var {
        &self.var
    }
}

/// A grounded formula: one truth value per assignment of its free variables.
///
/// The tensor has exactly one axis per free variable and no feature axes.
/// Elementwise membership in [0,1] is the producer's contract; connectives
/// and quantifiers preserve it but do not re-check it.
#[derive(Debug, Clone)]
pub struct Formula {
    term: GroundedTerm,
}

impl Formula {
    /// Wrap a tensor of truth values.
    pub fn from_truth(value: Tensor, free_vars: Vec<String>) -> Result<Self> {
        if value.rank() != free_vars.len() {
            return Err(LtnError::DimensionMismatch {
                expected: format!("rank {} (truth value per assignment)", free_vars.len()),
                got: format!("rank {}", value.rank()),
            });
        }
        Ok(Self {
            term: GroundedTerm::new(value, free_vars)?,
        })
    }

    /// The truth-value tensor.
    pub fn value(&self) -> &Tensor {
        self.term.value()
    }

    /// Ordered free-variable labels.
    pub fn free_vars(&self) -> &[String] {
        self.term.free_vars()
    }

    /// True if the formula has no free variables (a single truth value).
    pub fn is_closed(&self) -> bool {
        self.term.is_closed()
    }

    /// The scalar truth value of a closed formula.
    pub fn truth(&self) -> Result<f32> {
        if !self.is_closed() {
            return Err(LtnError::Runtime(format!(
                "formula is open over {:?}",
                self.free_vars()
            )));
        }
        Ok(self.term.value().to_scalar::<f32>()?)
    }

    /// Project onto the `index`-th individual of variable `label`.
    pub fn take(&self, label: &str, index: usize) -> Result<Self> {
        Ok(Self {
            term: self.term.take(label, index)?,
        })
    }

    /// View the formula as a grounded term (for alignment).
    pub fn as_term(&self) -> &GroundedTerm {
        &self.term
    }
}
