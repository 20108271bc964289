use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise transfer function applied by every neuron of a network.
///
/// The variant is stored alongside the weights when a network is saved, so a
/// reloaded network activates exactly like the one that was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    #[default]
    Sigmoid,
    Tanh,
    Identity,
}

impl ActivationFunction {
    /// Applies the activation to a neuron's weighted input sum.
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Identity => x,
        }
    }

    /// Derivative with respect to the raw (pre-activation) input `x`.
    ///
    /// The backpropagator does not call this: it always uses the sigmoid
    /// gradient `y * (1 - y)` written in terms of the neuron's output.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.activate(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::Identity => 1.0,
        }
    }
}
