use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};

/// Constant input paired with every neuron's bias weight.
pub const BIAS_INPUT: f64 = -1.0;

/// A single unit: `input_count` input weights followed by one bias weight.
///
/// The last input/output seen by `fire` are cached on the neuron so callers
/// can inspect them; they are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    input_count: usize,
    weights: Vec<f64>,
    activation: ActivationFunction,
    #[serde(skip)]
    last_input: Option<Vec<f64>>,
    #[serde(skip)]
    last_output: Option<f64>,
}

impl Neuron {
    /// Creates a neuron with weights drawn uniformly from [0, 1).
    pub fn new(input_count: usize, activation: ActivationFunction) -> Neuron {
        Neuron::with_rng(input_count, activation, &mut rand::thread_rng())
    }

    /// Same as `new`, drawing the initial weights from `rng`.
    pub fn with_rng<R: Rng>(
        input_count: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Neuron {
        let weights = (0..=input_count).map(|_| rng.gen::<f64>()).collect();
        Neuron {
            input_count,
            weights,
            activation,
            last_input: None,
            last_output: None,
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    /// All weights; the bias weight sits at index `input_count`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Valid ids are `0..=input_count` (the bias weight is the last slot).
    pub fn weight(&self, id: usize) -> Result<f64> {
        self.check_weight_id(id, "Neuron::weight")?;
        Ok(self.weights[id])
    }

    pub fn set_weight(&mut self, id: usize, value: f64) -> Result<()> {
        self.check_weight_id(id, "Neuron::set_weight")?;
        self.weights[id] = value;
        Ok(())
    }

    /// Input `id` from the most recent `fire`.
    pub fn input(&self, id: usize) -> Result<f64> {
        if id >= self.input_count {
            return Err(NetError::IndexOutOfRange {
                context: "Neuron::input",
                index: id,
                limit: self.input_count,
            });
        }
        match &self.last_input {
            Some(input) => Ok(input[id]),
            None => Err(NetError::IllegalState(
                "Neuron::input called before fire".to_string(),
            )),
        }
    }

    /// Output of the most recent `fire`.
    pub fn last_output(&self) -> Result<f64> {
        self.last_output.ok_or_else(|| {
            NetError::IllegalState("Neuron::last_output called before fire".to_string())
        })
    }

    /// Weighted sum of `inputs` plus the bias term, passed through the activation.
    /// Caches the input and the output.
    pub fn fire(&mut self, inputs: &[f64]) -> Result<f64> {
        if inputs.len() != self.input_count {
            return Err(NetError::DimensionMismatch {
                context: "Neuron::fire",
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        let output = self.activation.activate(self.weighted_sum(inputs));
        self.last_input = Some(inputs.to_vec());
        self.last_output = Some(output);
        Ok(output)
    }

    /// Delta-rule update: `w[i] += step * inputs[i]`, then `bias += step * BIAS_INPUT`,
    /// where `step` is the learning rate already multiplied by the neuron's delta.
    pub fn apply_update(&mut self, inputs: &[f64], step: f64) -> Result<()> {
        if inputs.len() != self.input_count {
            return Err(NetError::DimensionMismatch {
                context: "Neuron::apply_update",
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        for (weight, input) in self.weights.iter_mut().zip(inputs) {
            *weight += step * input;
        }
        self.weights[self.input_count] += step * BIAS_INPUT;
        Ok(())
    }

    /// Shape check used after deserialization.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.weights.len() != self.input_count + 1 {
            return Err(NetError::DimensionMismatch {
                context: "Neuron weights",
                expected: self.input_count + 1,
                actual: self.weights.len(),
            });
        }
        Ok(())
    }

    fn weighted_sum(&self, inputs: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (input, weight) in inputs.iter().zip(&self.weights) {
            sum += input * weight;
        }
        sum + BIAS_INPUT * self.weights[self.input_count]
    }

    fn check_weight_id(&self, id: usize, context: &'static str) -> Result<()> {
        if id > self.input_count {
            return Err(NetError::IndexOutOfRange {
                context,
                index: id,
                limit: self.input_count + 1,
            });
        }
        Ok(())
    }
}
