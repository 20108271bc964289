//! Letter recognition on a square binary grid.
//!
//! Grids are flattened into network inputs, letters into one-hot target
//! vectors, and network outputs back into letters.

pub mod grid;
pub mod codec;
pub mod training_set;

pub use grid::Grid;
pub use codec::{classify, decode_output, encode_grid, encode_label};
pub use training_set::{TrainingSample, TrainingSet};

/// Side length of the drawing grid.
pub const GRID_SIZE: usize = 8;

/// Number of output units: one per letter `A..=Z`.
pub const ALPHABET_SIZE: usize = 26;

/// An output unit must exceed this to count as a recognised letter.
pub const CONFIDENCE: f64 = 0.8;
