use serde::{Serialize, Deserialize};

/// Statistics for one completed epoch, sent by `train_loop` when a
/// `progress_tx` channel is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Value returned by `BackPropagator::run_and_update` for this epoch.
    pub average_error: f64,
    /// `100 * epoch / total_epochs`, rounded down.
    pub progress_percent: u8,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
