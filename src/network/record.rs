/// Everything one forward pass produced, handed from the forward step to
/// the backward step of training.
///
/// Hidden neurons all read `input`; output neurons all read `hidden`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRecord {
    pub input: Vec<f64>,
    pub hidden: Vec<f64>,
    pub output: Vec<f64>,
}

impl ActivationRecord {
    /// Input vector seen by the hidden layer.
    pub fn hidden_input(&self) -> &[f64] {
        &self.input
    }

    /// Input vector seen by the output layer.
    pub fn output_input(&self) -> &[f64] {
        &self.hidden
    }
}
