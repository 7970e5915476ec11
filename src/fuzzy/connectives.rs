//! Elementwise fuzzy connectives over tensors of truth values.
//!
//! Conjunctions are t-norms, disjunctions their dual t-conorms:
//!
//! | Family        | and(a,b)        | or(a,b)       | implies(a,b)        |
//! |---------------|-----------------|---------------|---------------------|
//! | product       | `a*b`           | `a+b-a*b`     | `1-a+a*b`           |
//! | Gödel         | `min(a,b)`      | `max(a,b)`    | `1 if a<=b else b`  |
//! | Łukasiewicz   | `max(0,a+b-1)`  | `min(1,a+b)`  | `min(1,1-a+b)`      |
//!
//! All operators map [0,1] inputs to [0,1] outputs elementwise. Operands
//! must already share a shape; alignment happens upstream.

use candle_core::Tensor;

use crate::error::Result;

/// Fuzzy negation: `1 - a`.
pub fn negate(a: &Tensor) -> Result<Tensor> {
    Ok((a.neg()? + 1.0)?)
}

/// Conjunction semantics (t-norms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    /// Product t-norm: `a*b`
    #[default]
    Product,
    /// Gödel t-norm: `min(a,b)`
    Minimum,
    /// Łukasiewicz t-norm: `max(0, a+b-1)`
    Lukasiewicz,
}

impl Conjunction {
    pub fn eval(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            Conjunction::Product => Ok(a.mul(b)?),
            Conjunction::Minimum => Ok(a.minimum(b)?),
            Conjunction::Lukasiewicz => Ok(((a + b)? - 1.0)?.relu()?),
        }
    }
}

/// Disjunction semantics (t-conorms, dual to [`Conjunction`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disjunction {
    /// Probabilistic sum: `a + b - a*b`
    #[default]
    ProbSum,
    /// Gödel t-conorm: `max(a,b)`
    Maximum,
    /// Łukasiewicz t-conorm: `min(1, a+b)`
    Lukasiewicz,
}

impl Disjunction {
    pub fn eval(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            Disjunction::ProbSum => Ok(((a + b)? - a.mul(b)?)?),
            Disjunction::Maximum => Ok(a.maximum(b)?),
            Disjunction::Lukasiewicz => Ok((a + b)?.clamp(0.0, 1.0)?),
        }
    }
}

/// Implication semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Implication {
    /// Reichenbach: `1 - a + a*b`
    #[default]
    Reichenbach,
    /// Gödel: `1 if a<=b else b`
    Godel,
    /// Łukasiewicz: `min(1, 1-a+b)`
    Lukasiewicz,
}

impl Implication {
    pub fn eval(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            Implication::Reichenbach => Ok(((a.mul(b)? - a)? + 1.0)?),
            Implication::Godel => {
                let holds = a.le(b)?;
                Ok(holds.where_cond(&b.ones_like()?, b)?)
            }
            Implication::Lukasiewicz => Ok(((b - a)? + 1.0)?.clamp(0.0, 1.0)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    const LEVELS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

    /// All (a,b) pairs over the truth-level grid, as two flat tensors.
    fn grid(device: &Device) -> (Tensor, Tensor) {
        let mut a = Vec::new();
        let mut b = Vec::new();
        for &x in &LEVELS {
            for &y in &LEVELS {
                a.push(x);
                b.push(y);
            }
        }
        (
            Tensor::new(a, device).unwrap(),
            Tensor::new(b, device).unwrap(),
        )
    }

    fn assert_in_unit_range(t: &Tensor) {
        for v in t.to_vec1::<f32>().unwrap() {
            assert!((-1e-6..=1.0 + 1e-6).contains(&v), "value {v} outside [0,1]");
        }
    }

    fn assert_close(lhs: &Tensor, rhs: &Tensor, tol: f32) {
        let l = lhs.to_vec1::<f32>().unwrap();
        let r = rhs.to_vec1::<f32>().unwrap();
        assert_eq!(l.len(), r.len());
        for (x, y) in l.iter().zip(r.iter()) {
            assert!((x - y).abs() < tol, "{x} != {y}");
        }
    }

    #[test]
    fn test_all_variants_stay_in_unit_range() {
        let device = Device::Cpu;
        let (a, b) = grid(&device);

        assert_in_unit_range(&negate(&a).unwrap());
        for op in [
            Conjunction::Product,
            Conjunction::Minimum,
            Conjunction::Lukasiewicz,
        ] {
            assert_in_unit_range(&op.eval(&a, &b).unwrap());
        }
        for op in [
            Disjunction::ProbSum,
            Disjunction::Maximum,
            Disjunction::Lukasiewicz,
        ] {
            assert_in_unit_range(&op.eval(&a, &b).unwrap());
        }
        for op in [
            Implication::Reichenbach,
            Implication::Godel,
            Implication::Lukasiewicz,
        ] {
            assert_in_unit_range(&op.eval(&a, &b).unwrap());
        }
    }

    #[test]
    fn test_and_or_commutative() {
        let device = Device::Cpu;
        let (a, b) = grid(&device);

        for op in [
            Conjunction::Product,
            Conjunction::Minimum,
            Conjunction::Lukasiewicz,
        ] {
            assert_close(&op.eval(&a, &b).unwrap(), &op.eval(&b, &a).unwrap(), 1e-6);
        }
        for op in [
            Disjunction::ProbSum,
            Disjunction::Maximum,
            Disjunction::Lukasiewicz,
        ] {
            assert_close(&op.eval(&a, &b).unwrap(), &op.eval(&b, &a).unwrap(), 1e-6);
        }
    }

    #[test]
    fn test_double_negation() {
        let device = Device::Cpu;
        let (a, _) = grid(&device);
        let back = negate(&negate(&a).unwrap()).unwrap();
        assert_close(&back, &a, 1e-6);
    }

    #[test]
    fn test_de_morgan_product_family() {
        let device = Device::Cpu;
        let (a, b) = grid(&device);

        // not(a and b) == (not a) or (not b), product / probabilistic sum
        let lhs = negate(&Conjunction::Product.eval(&a, &b).unwrap()).unwrap();
        let rhs = Disjunction::ProbSum
            .eval(&negate(&a).unwrap(), &negate(&b).unwrap())
            .unwrap();
        assert_close(&lhs, &rhs, 1e-5);

        // Gödel family
        let lhs = negate(&Conjunction::Minimum.eval(&a, &b).unwrap()).unwrap();
        let rhs = Disjunction::Maximum
            .eval(&negate(&a).unwrap(), &negate(&b).unwrap())
            .unwrap();
        assert_close(&lhs, &rhs, 1e-6);
    }

    #[test]
    fn test_godel_implication_is_piecewise() {
        let device = Device::Cpu;
        let a = Tensor::new(&[0.3f32, 0.8, 0.5], &device).unwrap();
        let b = Tensor::new(&[0.7f32, 0.2, 0.5], &device).unwrap();

        let out: Vec<f32> = Implication::Godel
            .eval(&a, &b)
            .unwrap()
            .to_vec1()
            .unwrap();
        // a<=b -> 1, else b
        assert_eq!(out, vec![1.0, 0.2, 1.0]);
    }

    #[test]
    fn test_classical_corners() {
        let device = Device::Cpu;
        let a = Tensor::new(&[0.0f32, 0.0, 1.0, 1.0], &device).unwrap();
        let b = Tensor::new(&[0.0f32, 1.0, 0.0, 1.0], &device).unwrap();

        for op in [
            Conjunction::Product,
            Conjunction::Minimum,
            Conjunction::Lukasiewicz,
        ] {
            let out: Vec<f32> = op.eval(&a, &b).unwrap().to_vec1().unwrap();
            assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0]);
        }
        for op in [
            Disjunction::ProbSum,
            Disjunction::Maximum,
            Disjunction::Lukasiewicz,
        ] {
            let out: Vec<f32> = op.eval(&a, &b).unwrap().to_vec1().unwrap();
            assert_eq!(out, vec![0.0, 1.0, 1.0, 1.0]);
        }
        for op in [
            Implication::Reichenbach,
            Implication::Godel,
            Implication::Lukasiewicz,
        ] {
            let out: Vec<f32> = op.eval(&a, &b).unwrap().to_vec1().unwrap();
            assert_eq!(out, vec![1.0, 1.0, 0.0, 1.0]);
        }
    }
}
