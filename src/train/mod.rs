//! Training support: registry of trainable storage and optimizer glue.
//!
//! Evaluation itself never mutates anything; the registry only hands the
//! caller's training loop the variables a satisfaction loss should update.

mod params;

pub use params::Parameters;
