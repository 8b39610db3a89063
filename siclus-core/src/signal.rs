//! Cell signal modelling.
//!
//! Converts a raw cell activation into the weight used for thresholding
//! and centroiding. The default model passes the activation through; a
//! calibration model can be injected into the pipeline instead.

use crate::description::ModuleConditions;

/// Maps a cell activation to a weight, given the owning module's conditions.
pub trait SignalModel: Send + Sync {
    /// Returns the weight of a cell.
    fn weight(&self, activation: f64, conditions: &ModuleConditions) -> f64;
}

/// Identity model: the weight is the activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySignal;

impl SignalModel for IdentitySignal {
    #[inline]
    fn weight(&self, activation: f64, _conditions: &ModuleConditions) -> f64 {
        activation
    }
}

impl<F> SignalModel for F
where
    F: Fn(f64, &ModuleConditions) -> f64 + Send + Sync,
{
    #[inline]
    fn weight(&self, activation: f64, conditions: &ModuleConditions) -> f64 {
        self(activation, conditions)
    }
}
