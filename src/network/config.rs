use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// A serializable description of a network topology.
///
/// `NetworkConfig` can be kept in a JSON file next to the trained weights and
/// turned into a compiled network with `NeuralNetwork::from_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub output_size: usize,
    pub learning_rate: f64,
    /// Neuron count of each hidden layer, in order from input to output.
    #[serde(default)]
    pub hidden_layers: Vec<usize>,
    /// Fixes weight initialization when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn new(input_size: usize, output_size: usize, learning_rate: f64) -> Self {
        NetworkConfig {
            input_size,
            output_size,
            learning_rate,
            hidden_layers: Vec::new(),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.output_size == 0 {
            return Err(Error::InvalidConfig(format!(
                "input and output sizes must be positive, got {} and {}",
                self.input_size, self.output_size
            )));
        }
        if let Some(index) = self.hidden_layers.iter().position(|&n| n == 0) {
            return Err(Error::InvalidConfig(format!("hidden layer {index} has no neurons")));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }

    /// Reads and validates a config from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: NetworkConfig = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidConfig(format!("{path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
