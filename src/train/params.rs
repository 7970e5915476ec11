//! Named registry of trainable variables.

use candle_core::backprop::GradStore;
use candle_core::{Tensor, Var};
use candle_nn::optim::{AdamW, ParamsAdamW};
use candle_nn::Optimizer;
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::error::{LtnError, Result};

/// Insertion-ordered registry of the trainable storage behind a theory:
/// trainable constants, propositions, and predicate/function weights.
///
/// The registry holds shared handles (`Var` clones), not copies; applying
/// a gradient step updates the storage every grounding reads from.
#[derive(Default)]
pub struct Parameters {
    params: IndexMap<String, Var>,
}

impl Parameters {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            params: IndexMap::new(),
        }
    }

    /// Register a variable under a name. Re-registering a name replaces
    /// the previous handle.
    pub fn register(&mut self, name: &str, var: &Var) {
        self.params.insert(name.to_string(), var.clone());
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&Var> {
        self.params.get(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&String> {
        self.params.keys().collect()
    }

    /// All variables, for handing to an optimizer.
    pub fn all(&self) -> Vec<Var> {
        self.params.values().cloned().collect()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Apply one SGD step: `param = param - lr * grad` for every
    /// registered variable the gradient store covers.
    pub fn sgd_step(&self, grads: &GradStore, lr: f64) -> Result<()> {
        for var in self.params.values() {
            if let Some(grad) = grads.get(var.as_tensor()) {
                let update = (var.as_tensor() - (grad * lr)?)?;
                var.set(&update)?;
            }
        }
        Ok(())
    }

    /// Create an AdamW optimizer over the registered variables.
    pub fn adamw(&self, lr: f64, weight_decay: f64) -> Result<AdamW> {
        let params = ParamsAdamW {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay,
        };
        Ok(AdamW::new(self.all(), params)?)
    }

    /// Save all registered variables to a safetensors file.
    pub fn save(&self, path: &str) -> Result<()> {
        if self.params.is_empty() {
            return Err(LtnError::Runtime("no parameters to save".to_string()));
        }
        let tensors: HashMap<String, Tensor> = self
            .params
            .iter()
            .map(|(name, var)| (name.clone(), var.as_tensor().clone()))
            .collect();
        candle_core::safetensors::save(&tensors, path)?;
        Ok(())
    }

    /// Load variables from a safetensors file, updating registered names
    /// in place. Returns how many variables were restored; names in the
    /// file but not in the registry are ignored.
    pub fn load(&self, path: &str) -> Result<usize> {
        let device = match self.params.values().next() {
            Some(var) => var.device().clone(),
            None => return Err(LtnError::Runtime("no parameters registered".to_string())),
        };

        let loaded = candle_core::safetensors::load(path, &device)?;
        let mut count = 0;
        for (name, tensor) in loaded {
            if let Some(var) = self.params.get(&name) {
                var.set(&tensor)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::Constant;
    use crate::logic::{Predicate, SatAgg};
    use candle_core::{Device, Tensor};

    #[test]
    fn test_registry_keeps_order() {
        let device = Device::Cpu;
        let a = Var::from_tensor(&Tensor::new(&[1.0f32], &device).unwrap()).unwrap();
        let b = Var::from_tensor(&Tensor::new(&[2.0f32], &device).unwrap()).unwrap();

        let mut params = Parameters::new();
        params.register("b", &b);
        params.register("a", &a);
        assert_eq!(params.len(), 2);
        assert_eq!(params.names(), vec!["b", "a"]);
        assert!(params.get("a").is_some());
    }

    #[test]
    fn test_sgd_step_increases_satisfaction() {
        let device = Device::Cpu;
        // Trainable embedding, axiom P(c) with P = sigmoid of the sum.
        let c = Constant::trainable(Tensor::new(&[0.0f32, 0.0], &device).unwrap()).unwrap();
        let p = Predicate::from_logits(|args: &[Tensor]| args[0].sum(1));

        let mut params = Parameters::new();
        params.register("c", c.var().unwrap());

        let sat_agg = SatAgg::new(2.0).unwrap();
        let before = p.call(&[c.grounding()]).unwrap();
        let loss = sat_agg.loss(&[&before]).unwrap();
        assert!((before.truth().unwrap() - 0.5).abs() < 1e-4);

        let grads = loss.backward().unwrap();
        params.sgd_step(&grads, 1.0).unwrap();

        let after = p.call(&[c.grounding()]).unwrap();
        assert!(
            after.truth().unwrap() > before.truth().unwrap(),
            "satisfaction should rise after a step toward the axiom"
        );
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let device = Device::Cpu;
        let var = Var::from_tensor(&Tensor::new(&[1.0f32, 2.0], &device).unwrap()).unwrap();

        let mut params = Parameters::new();
        params.register("w", &var);

        let path = std::env::temp_dir().join("ltn_params_round_trip.safetensors");
        let path = path.to_str().unwrap().to_string();
        params.save(&path).unwrap();

        // Clobber, then restore.
        var.set(&Tensor::new(&[0.0f32, 0.0], &device).unwrap()).unwrap();
        let restored = params.load(&path).unwrap();
        assert_eq!(restored, 1);
        let vals: Vec<f32> = var.as_tensor().to_vec1().unwrap();
        assert_eq!(vals, vec![1.0, 2.0]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_empty_registry_rejected() {
        let params = Parameters::new();
        assert!(matches!(
            params.save("unused.safetensors").unwrap_err(),
            LtnError::Runtime(_)
        ));
    }
}
