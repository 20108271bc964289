use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::train::backprop::BackPropagator;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Summary of a `train_loop` run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOutcome {
    pub epochs_run: usize,
    /// Error of the last completed epoch, `None` if no epoch ran.
    pub last_average_error: Option<f64>,
    /// True when the stop flag or a dropped receiver ended the run early.
    pub cancelled: bool,
}

/// Calls `trainer.run_and_update()` up to `config.epochs` times.
///
/// Cancellation is only observed between epochs, so an interrupted run
/// never leaves a half-applied sample update behind. The first training
/// error aborts the run and is returned as is.
pub fn train_loop(trainer: &mut BackPropagator<'_>, config: &TrainConfig) -> Result<TrainOutcome> {
    info!(epochs = config.epochs, samples = trainer.len(), learning_rate = trainer.learning_rate(), "training started");

    let mut outcome = TrainOutcome {
        epochs_run: 0,
        last_average_error: None,
        cancelled: false,
    };

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            outcome.cancelled = true;
            break;
        }

        let t_start = Instant::now();
        let average_error = trainer.run_and_update().map_err(|e| {
            warn!(epoch, error = %e, "training aborted");
            e
        })?;
        outcome.epochs_run = epoch;
        outcome.last_average_error = Some(average_error);

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                average_error,
                progress_percent: (100 * epoch / config.epochs) as u8,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                outcome.cancelled = epoch < config.epochs;
                break;
            }
        }
    }

    if outcome.cancelled {
        info!(epochs_run = outcome.epochs_run, "training cancelled");
    } else {
        info!(epochs_run = outcome.epochs_run, last_average_error = ?outcome.last_average_error, "training finished");
    }
    Ok(outcome)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
}
