use thiserror::Error;

use crate::activation::activation::ActivationFunction;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Everything that can go wrong while building, running, training or
/// persisting a network.
#[derive(Error, Debug)]
pub enum NetError {
    /// A vector handed to an operation has the wrong length.
    #[error("{context}: expected size {expected}, got size {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A neuron, weight, input or sample index is outside its valid range.
    #[error("{context}: index {index} is outside 0..{limit}")]
    IndexOutOfRange {
        context: &'static str,
        index: usize,
        limit: usize,
    },

    /// Cached state was queried before it was ever written.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// `run_and_update` was called with no training samples.
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    /// Training a network whose output layer has no neurons.
    #[error("cannot train a network with no output units")]
    NoOutputUnits,

    /// A training label outside the recognised alphabet.
    #[error("label {0:?} is not an uppercase ASCII letter")]
    InvalidLabel(char),

    /// A saved layer or neuron disagrees with its network's activation.
    #[error("{context}: activation {found:?} does not match network activation {expected:?}")]
    ActivationMismatch {
        context: &'static str,
        expected: ActivationFunction,
        found: ActivationFunction,
    },

    #[error("unsupported network format version {found} (supported: {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    #[error("malformed grid: {0}")]
    MalformedGrid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
