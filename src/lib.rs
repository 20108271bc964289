pub mod error;
pub mod activation;
pub mod layers;
pub mod network;
pub mod train;
pub mod ocr;

// Convenience re-exports
pub use error::{NetError, Result};
pub use activation::activation::ActivationFunction;
pub use layers::{Layer, Neuron, BIAS_INPUT};
pub use network::{ActivationRecord, Network, NetworkSpec};
pub use train::{train_loop, BackPropagator, EpochStats, TrainConfig, TrainOutcome};
pub use ocr::{Grid, TrainingSample, TrainingSet};
