pub mod neuron;
pub mod layer;

pub use neuron::{Neuron, BIAS_INPUT};
pub use layer::Layer;
