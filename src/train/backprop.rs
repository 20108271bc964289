use tracing::trace;

use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::network::record::ActivationRecord;

/// Online backpropagation over a borrowed network.
///
/// Samples are kept in insertion order and every `run_and_update` call walks
/// them once, updating the weights after each sample. Dropping the trainer
/// leaves the learned weights in the network.
pub struct BackPropagator<'a> {
    network: &'a mut Network,
    learning_rate: f64,
    inputs: Vec<Vec<f64>>,
    expected_outputs: Vec<Vec<f64>>,
    average_errors: Vec<f64>,
}

impl<'a> BackPropagator<'a> {
    pub fn new(network: &'a mut Network, learning_rate: f64) -> BackPropagator<'a> {
        BackPropagator {
            network,
            learning_rate,
            inputs: Vec::new(),
            expected_outputs: Vec::new(),
            average_errors: Vec::new(),
        }
    }

    pub fn network(&self) -> &Network {
        &*self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut *self.network
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    /// Number of (input, expected output) pairs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Mean output error of each sample from the last epoch, in sample order.
    pub fn average_errors(&self) -> &[f64] {
        &self.average_errors
    }

    /// Appends a training pair after checking both lengths against the network.
    pub fn add_input_output(&mut self, inputs: Vec<f64>, expected_outputs: Vec<f64>) -> Result<()> {
        if inputs.len() != self.network.input_count() {
            return Err(NetError::DimensionMismatch {
                context: "BackPropagator::add_input_output inputs",
                expected: self.network.input_count(),
                actual: inputs.len(),
            });
        }
        if expected_outputs.len() != self.network.output_count() {
            return Err(NetError::DimensionMismatch {
                context: "BackPropagator::add_input_output expected outputs",
                expected: self.network.output_count(),
                actual: expected_outputs.len(),
            });
        }

        self.inputs.push(inputs);
        self.expected_outputs.push(expected_outputs);
        Ok(())
    }

    /// Runs one epoch and returns the mean of the per-sample mean errors.
    ///
    /// For each sample: forward pass, output error, hidden deltas computed
    /// against the output weights as they were before this sample, hidden
    /// update, then output update. Errors are signed, not absolute.
    pub fn run_and_update(&mut self) -> Result<f64> {
        if self.inputs.is_empty() {
            return Err(NetError::EmptyDataset);
        }
        if self.network.output_count() == 0 {
            return Err(NetError::NoOutputUnits);
        }

        self.average_errors.clear();

        for (input, expected) in self.inputs.iter().zip(&self.expected_outputs) {
            let record = self.network.trace(input)?;
            let errors = output_errors(&record.output, expected);
            self.average_errors.push(mean(&errors));

            backpropagate(&mut *self.network, &record, &errors, self.learning_rate)?;
        }

        let epoch_error = mean(&self.average_errors);
        trace!(samples = self.inputs.len(), epoch_error, "epoch complete");
        Ok(epoch_error)
    }
}

/// `y * (1 - y) * (expected - y)` per output unit.
fn output_errors(outputs: &[f64], expected: &[f64]) -> Vec<f64> {
    outputs.iter().zip(expected)
        .map(|(&y, &e)| y * (1.0 - y) * (e - y))
        .collect()
}

fn backpropagate(
    network: &mut Network,
    record: &ActivationRecord,
    errors: &[f64],
    learning_rate: f64,
) -> Result<()> {
    let (hidden, output) = network.layers_mut();

    for h in 0..hidden.neuron_count() {
        let mut sum = 0.0;
        for (neuron, error) in output.neurons().iter().zip(errors) {
            sum += neuron.weight(h)? * error;
        }
        let y = record.hidden[h];
        let delta = y * (1.0 - y) * sum;
        hidden.neuron_mut(h)?.apply_update(record.hidden_input(), learning_rate * delta)?;
    }

    for (j, error) in errors.iter().enumerate() {
        output.neuron_mut(j)?.apply_update(record.output_input(), learning_rate * error)?;
    }

    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v) / values.len() as f64
}
