use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{Error, Result};
use crate::network::network::NeuralNetwork;
use crate::train::sample::Sample;
use crate::train::train_config::TrainConfig;
use crate::train::train_stats::TrainStats;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Runs `config.iterations` stochastic updates on `network`, each one on a
/// sample drawn uniformly at random from `samples`.
///
/// # Errors
/// - `InvalidConfig` if `samples` is empty or the config does not validate
/// - any error `NeuralNetwork::train` reports (uncompiled network, shapes)
pub fn train_loop(
    network: &mut NeuralNetwork,
    samples: &[Sample],
    config: &TrainConfig,
) -> Result<TrainStats> {
    config.validate()?;
    if samples.is_empty() {
        return Err(Error::InvalidConfig("no training samples".into()));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let t_start = Instant::now();
    let mut total_loss = 0.0;
    let mut window_loss = 0.0;
    let mut last_loss = 0.0;

    for iteration in 1..=config.iterations {
        let sample = &samples[rng.gen_range(0..samples.len())];
        last_loss = network.train(&sample.input, &sample.target)?;
        total_loss += last_loss;
        window_loss += last_loss;

        if config.log_interval > 0 && iteration % config.log_interval == 0 {
            info!(
                "Iteration {}/{}: loss = {:.6}",
                iteration,
                config.iterations,
                window_loss / config.log_interval as f64
            );
            window_loss = 0.0;
        }
    }

    Ok(TrainStats {
        iterations: config.iterations,
        mean_loss: total_loss / config.iterations as f64,
        last_loss,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    })
}
