use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::layers::layer::Layer;
use crate::network::record::ActivationRecord;
use crate::network::spec::NetworkSpec;

/// Version tag written into every saved network.
pub const FORMAT_VERSION: u32 = 1;

/// A feed-forward network with exactly one hidden layer.
///
/// `hidden` maps `input_count → hidden_count` and `output` maps
/// `hidden_count → output_count`. The shape never changes after construction;
/// only the weights are trained in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    input_count: usize,
    output_count: usize,
    hidden_count: usize,
    activation: ActivationFunction,
    hidden: Layer,
    output: Layer,
    #[serde(skip)]
    last_outputs: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct SavedNetworkRef<'a> {
    format_version: u32,
    network: &'a Network,
}

#[derive(Deserialize)]
struct SavedNetwork {
    format_version: u32,
    network: serde_json::Value,
}

impl Network {
    /// Sigmoid network with randomly initialized weights.
    pub fn new(input_count: usize, output_count: usize, hidden_count: usize) -> Network {
        Network::with_activation(input_count, output_count, hidden_count, ActivationFunction::Sigmoid)
    }

    pub fn with_activation(
        input_count: usize,
        output_count: usize,
        hidden_count: usize,
        activation: ActivationFunction,
    ) -> Network {
        Network::with_rng(input_count, output_count, hidden_count, activation, &mut rand::thread_rng())
    }

    /// Builds the hidden layer, then the output layer, drawing weights from `rng`.
    pub fn with_rng<R: Rng>(
        input_count: usize,
        output_count: usize,
        hidden_count: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Network {
        let hidden = Layer::with_rng(hidden_count, input_count, activation, &mut *rng);
        let output = Layer::with_rng(output_count, hidden_count, activation, rng);
        debug!(input_count, hidden_count, output_count, ?activation, "built network");

        Network {
            input_count,
            output_count,
            hidden_count,
            activation,
            hidden,
            output,
            last_outputs: None,
        }
    }

    pub fn from_spec(spec: &NetworkSpec) -> Network {
        Network::from_spec_with_rng(spec, &mut rand::thread_rng())
    }

    pub fn from_spec_with_rng<R: Rng>(spec: &NetworkSpec, rng: &mut R) -> Network {
        Network::with_rng(spec.input_count, spec.output_count, spec.hidden_count, spec.activation, rng)
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn hidden_layer(&self) -> &Layer {
        &self.hidden
    }

    pub fn hidden_layer_mut(&mut self) -> &mut Layer {
        &mut self.hidden
    }

    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    pub fn output_layer_mut(&mut self) -> &mut Layer {
        &mut self.output
    }

    /// Both layers at once, for callers that read one while updating the other.
    pub fn layers_mut(&mut self) -> (&mut Layer, &mut Layer) {
        (&mut self.hidden, &mut self.output)
    }

    /// Outputs of the most recent forward pass.
    pub fn last_outputs(&self) -> Option<&[f64]> {
        self.last_outputs.as_deref()
    }

    /// Forward inference: input → hidden → output.
    pub fn fire(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        Ok(self.trace(inputs)?.output)
    }

    /// Forward pass that also returns every intermediate vector.
    pub fn trace(&mut self, inputs: &[f64]) -> Result<ActivationRecord> {
        if inputs.len() != self.input_count {
            return Err(NetError::DimensionMismatch {
                context: "Network::fire",
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        let hidden = self.hidden.fire(inputs)?;
        let output = self.output.fire(&hidden)?;
        self.last_outputs = Some(output.clone());

        Ok(ActivationRecord {
            input: inputs.to_vec(),
            hidden,
            output,
        })
    }

    /// Encodes shape, activation and every weight as a versioned JSON document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let saved = SavedNetworkRef {
            format_version: FORMAT_VERSION,
            network: self,
        };
        Ok(serde_json::to_vec(&saved)?)
    }

    /// Inverse of `to_bytes`. Shape invariants are re-checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Network> {
        let saved: SavedNetwork = serde_json::from_slice(bytes)?;
        if saved.format_version != FORMAT_VERSION {
            warn!(found = saved.format_version, supported = FORMAT_VERSION, "rejecting network file");
            return Err(NetError::UnsupportedFormat {
                found: saved.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let network: Network = serde_json::from_value(saved.network)?;
        network.validate()?;
        debug!(
            input_count = network.input_count,
            hidden_count = network.hidden_count,
            output_count = network.output_count,
            "loaded network"
        );
        Ok(network)
    }

    /// Writes `to_bytes` output to `path`.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        debug!(path = %path.display(), "saved network");
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let bytes = std::fs::read(path)?;
        Network::from_bytes(&bytes)
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            ("hidden layer input count", self.input_count, self.hidden.input_count()),
            ("hidden layer neuron count", self.hidden_count, self.hidden.neuron_count()),
            ("output layer input count", self.hidden_count, self.output.input_count()),
            ("output layer neuron count", self.output_count, self.output.neuron_count()),
        ];
        for (context, expected, actual) in checks {
            if expected != actual {
                return Err(NetError::DimensionMismatch { context, expected, actual });
            }
        }
        for (context, layer) in [("hidden layer", &self.hidden), ("output layer", &self.output)] {
            if layer.activation() != self.activation {
                return Err(NetError::ActivationMismatch {
                    context,
                    expected: self.activation,
                    found: layer.activation(),
                });
            }
        }
        self.hidden.validate()?;
        self.output.validate()
    }
}
