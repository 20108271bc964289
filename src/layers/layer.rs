use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::layers::neuron::Neuron;

/// A fixed set of neurons that all read the same input vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    input_count: usize,
    activation: ActivationFunction,
    neurons: Vec<Neuron>,
    #[serde(skip)]
    last_outputs: Option<Vec<f64>>,
}

impl Layer {
    pub fn new(neuron_count: usize, input_count: usize, activation: ActivationFunction) -> Layer {
        Layer::with_rng(neuron_count, input_count, activation, &mut rand::thread_rng())
    }

    /// Builds `neuron_count` neurons, each initialized in index order from `rng`.
    pub fn with_rng<R: Rng>(
        neuron_count: usize,
        input_count: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let neurons = (0..neuron_count)
            .map(|_| Neuron::with_rng(input_count, activation, &mut *rng))
            .collect();

        Layer {
            input_count,
            activation,
            neurons,
            last_outputs: None,
        }
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron(&self, id: usize) -> Result<&Neuron> {
        let limit = self.neurons.len();
        self.neurons.get(id).ok_or(NetError::IndexOutOfRange {
            context: "Layer::neuron",
            index: id,
            limit,
        })
    }

    pub fn neuron_mut(&mut self, id: usize) -> Result<&mut Neuron> {
        let limit = self.neurons.len();
        self.neurons.get_mut(id).ok_or(NetError::IndexOutOfRange {
            context: "Layer::neuron_mut",
            index: id,
            limit,
        })
    }

    /// Outputs of the most recent `fire`, in neuron order.
    pub fn last_outputs(&self) -> Option<&[f64]> {
        self.last_outputs.as_deref()
    }

    /// Fires every neuron in index order with the same `inputs`.
    pub fn fire(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.input_count {
            return Err(NetError::DimensionMismatch {
                context: "Layer::fire",
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        let outputs = self.neurons.iter_mut()
            .map(|neuron| neuron.fire(inputs))
            .collect::<Result<Vec<f64>>>()?;
        self.last_outputs = Some(outputs.clone());
        Ok(outputs)
    }

    /// Shape check used after deserialization.
    pub(crate) fn validate(&self) -> Result<()> {
        for neuron in &self.neurons {
            if neuron.activation() != self.activation {
                return Err(NetError::ActivationMismatch {
                    context: "Layer neuron",
                    expected: self.activation,
                    found: neuron.activation(),
                });
            }
            if neuron.input_count() != self.input_count {
                return Err(NetError::DimensionMismatch {
                    context: "Layer neuron input count",
                    expected: self.input_count,
                    actual: neuron.input_count(),
                });
            }
            neuron.validate()?;
        }
        Ok(())
    }
}
