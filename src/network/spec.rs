use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::ocr::{ALPHABET_SIZE, GRID_SIZE};

/// Shape and hyperparameters of a network, independent of its weights.
///
/// Missing fields fall back to the letter-recognition defaults when loaded
/// from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    pub input_count: usize,
    pub output_count: usize,
    pub hidden_count: usize,
    pub activation: ActivationFunction,
    pub learning_rate: f64,
    pub epochs: usize,
}

impl Default for NetworkSpec {
    /// 8×8 grid in, one unit per letter out.
    fn default() -> Self {
        NetworkSpec {
            input_count: GRID_SIZE * GRID_SIZE,
            output_count: ALPHABET_SIZE,
            hidden_count: 25,
            activation: ActivationFunction::Sigmoid,
            learning_rate: 0.7,
            epochs: 10_000,
        }
    }
}

impl NetworkSpec {
    pub fn new(input_count: usize, output_count: usize, hidden_count: usize) -> Self {
        NetworkSpec {
            input_count,
            output_count,
            hidden_count,
            ..NetworkSpec::default()
        }
    }

    pub fn with_activation(mut self, activation: ActivationFunction) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
