use serde::{Serialize, Deserialize};

/// Summary returned by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    /// Number of single-sample updates performed.
    pub iterations: usize,
    /// Mean per-sample loss over the whole run.
    pub mean_loss: f64,
    /// Loss of the final update.
    pub last_loss: f64,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}
