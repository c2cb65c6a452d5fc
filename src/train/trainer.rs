use crate::{
    error::{Error, Result},
    network::network::NeuralNetwork,
    train::sample::Sample,
};

/// One ordered pass over `samples`, updating after every sample.
///
/// Returns the mean pre-update loss of the pass.
pub fn train_epoch(network: &mut NeuralNetwork, samples: &[Sample]) -> Result<f64> {
    if samples.is_empty() {
        return Err(Error::InvalidConfig("no training samples".into()));
    }

    let mut total_loss = 0.0;
    for sample in samples {
        total_loss += network.train(&sample.input, &sample.target)?;
    }

    Ok(total_loss / samples.len() as f64)
}
