use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `iterations`   — number of single-sample updates; each one picks a
///                    sample uniformly at random
/// - `log_interval` — a progress line is logged every this many updates
///                    (`0` disables progress logging)
/// - `seed`         — fixes the sample order when set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub iterations: usize,
    pub log_interval: usize,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            iterations: 10_000,
            log_interval: 1_000,
            seed: None,
        }
    }
}

impl TrainConfig {
    pub fn new(iterations: usize) -> Self {
        TrainConfig {
            iterations,
            ..TrainConfig::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be at least 1".into()));
        }
        Ok(())
    }

    /// Parses a config from JSON text; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<TrainConfig> {
        let config: TrainConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
