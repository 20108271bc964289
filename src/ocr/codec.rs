use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::ocr::grid::Grid;
use crate::ocr::{ALPHABET_SIZE, CONFIDENCE};

const SET: f64 = 1.0;
const CLEAR: f64 = 0.0;

/// Row-major network input: 1.0 for set cells, 0.0 for clear ones.
pub fn encode_grid(grid: &Grid) -> Vec<f64> {
    grid.cells().iter().map(|&c| if c { SET } else { CLEAR }).collect()
}

/// One-hot target for `label`; `None` (a blank grid) is all zeros.
pub fn encode_label(label: Option<char>) -> Result<Vec<f64>> {
    let mut expected = vec![CLEAR; ALPHABET_SIZE];
    if let Some(ch) = label {
        if !ch.is_ascii_uppercase() {
            return Err(NetError::InvalidLabel(ch));
        }
        expected[(ch as u8 - b'A') as usize] = SET;
    }
    Ok(expected)
}

/// First letter whose unit is above `CONFIDENCE`, if any.
pub fn decode_output(output: &[f64]) -> Option<char> {
    output.iter()
        .take(ALPHABET_SIZE)
        .position(|&y| y > CONFIDENCE)
        .map(|i| (b'A' + i as u8) as char)
}

/// Runs `grid` through `network` and decodes the answer.
pub fn classify(network: &mut Network, grid: &Grid) -> Result<Option<char>> {
    let output = network.fire(&encode_grid(grid))?;
    Ok(decode_output(&output))
}
