use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::NeuralNetwork;

/// Leading bytes of every binary snapshot.
pub const MAGIC: [u8; 4] = *b"DNN1";
/// Bumped whenever the snapshot layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Shape plus row-major values of one matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRecord {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl From<&Matrix> for MatrixRecord {
    fn from(matrix: &Matrix) -> Self {
        MatrixRecord {
            rows: matrix.rows(),
            cols: matrix.cols(),
            values: matrix.values(),
        }
    }
}

impl MatrixRecord {
    fn into_matrix(self, what: &str, index: usize) -> Result<Matrix> {
        if self.rows == 0 || self.cols == 0 || self.rows.checked_mul(self.cols) != Some(self.values.len()) {
            return Err(Error::Deserialization(format!(
                "{what} {index}: {} values do not fill a {}x{} matrix",
                self.values.len(),
                self.rows,
                self.cols
            )));
        }
        Ok(Matrix::from_values(self.rows, self.cols, &self.values))
    }
}

/// The complete persisted state of a [`NeuralNetwork`].
///
/// Written as-is by `bincode` (binary files) or `serde_json` (JSON files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub magic: [u8; 4],
    pub version: u32,
    pub input_size: usize,
    pub output_size: usize,
    pub learning_rate: f64,
    pub compiled: bool,
    pub weights: Vec<MatrixRecord>,
    pub layers: Vec<MatrixRecord>,
}

impl From<&NeuralNetwork> for NetworkSnapshot {
    fn from(network: &NeuralNetwork) -> Self {
        NetworkSnapshot {
            magic: MAGIC,
            version: FORMAT_VERSION,
            input_size: network.input_size,
            output_size: network.output_size,
            learning_rate: network.learning_rate,
            compiled: network.compiled,
            weights: network.weights.iter().map(MatrixRecord::from).collect(),
            layers: network.layers.iter().map(MatrixRecord::from).collect(),
        }
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Deserialization(message.into())
}

impl NetworkSnapshot {
    /// Checks the snapshot against every structural invariant of a network
    /// and rebuilds it.
    pub fn into_network(self) -> Result<NeuralNetwork> {
        if self.magic != MAGIC {
            return Err(invalid(format!("unknown file tag {:?}", self.magic)));
        }
        if self.version != FORMAT_VERSION {
            return Err(invalid(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        if self.input_size == 0 || self.output_size == 0 {
            return Err(invalid("input and output sizes must be positive"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(invalid(format!("bad learning rate {}", self.learning_rate)));
        }
        if self.weights.len() != self.layers.len() {
            return Err(invalid(format!(
                "{} weight matrices but {} layers",
                self.weights.len(),
                self.layers.len()
            )));
        }

        let weights = self.weights.into_iter().enumerate()
            .map(|(i, record)| record.into_matrix("weight matrix", i))
            .collect::<Result<Vec<_>>>()?;
        let layers = self.layers.into_iter().enumerate()
            .map(|(i, record)| record.into_matrix("layer", i))
            .collect::<Result<Vec<_>>>()?;

        let mut fan_in = self.input_size;
        for (i, (w, layer)) in weights.iter().zip(layers.iter()).enumerate() {
            if w.cols() != fan_in {
                return Err(invalid(format!(
                    "weight matrix {i} is {}x{} but its input has {fan_in} neurons",
                    w.rows(),
                    w.cols()
                )));
            }
            if layer.shape() != (w.rows(), 1) {
                return Err(invalid(format!(
                    "layer {i} is {:?}, expected ({}, 1)",
                    layer.shape(),
                    w.rows()
                )));
            }
            fan_in = w.rows();
        }

        if self.compiled && weights.last().map(Matrix::rows) != Some(self.output_size) {
            return Err(invalid("compiled network does not end in its output layer"));
        }

        Ok(NeuralNetwork::from_parts(
            self.input_size,
            self.output_size,
            self.learning_rate,
            weights,
            layers,
            self.compiled,
        ))
    }
}

/// Writes `bytes` to a sibling temporary file, then renames it over `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp: PathBuf = path.with_file_name(tmp_name);

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

impl NeuralNetwork {
    /// Saves the full network state to a binary file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(&NetworkSnapshot::from(self))
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        write_atomically(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved network");
        Ok(())
    }

    /// Loads a network previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<NeuralNetwork> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let snapshot: NetworkSnapshot = bincode::deserialize(&bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        let network = snapshot.into_network()?;
        debug!(path = %path.display(), topology = ?network.topology(), "loaded network");
        Ok(network)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_vec_pretty(&NetworkSnapshot::from(self))
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        write_atomically(path.as_ref(), &json)
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NeuralNetwork> {
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        let snapshot: NetworkSnapshot = serde_json::from_reader(reader)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        snapshot.into_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn trained_network() -> NeuralNetwork {
        let mut network = NeuralNetwork::with_seed(2, 1, 0.1, 11);
        network.add_layer(3).unwrap();
        network.compile().unwrap();
        let input = Matrix::from_values(2, 1, &[1.0, 0.0]);
        let target = Matrix::from_values(1, 1, &[1.0]);
        network.train(&input, &target).unwrap();
        network
    }

    #[test]
    fn binary_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.bin");
        let network = trained_network();

        network.save(&path).unwrap();
        let loaded = NeuralNetwork::load(&path).unwrap();

        assert_eq!(NetworkSnapshot::from(&loaded), NetworkSnapshot::from(&network));
        let input = Matrix::from_values(2, 1, &[0.0, 1.0]);
        assert_eq!(loaded.run(&input).unwrap(), network.run(&input).unwrap());
        assert!(!dir.path().join("net.bin.tmp").exists());
    }

    #[test]
    fn json_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.json");
        let network = trained_network();

        network.save_json(&path).unwrap();
        let loaded = NeuralNetwork::load_json(&path).unwrap();
        assert_eq!(NetworkSnapshot::from(&loaded), NetworkSnapshot::from(&network));
    }

    #[test]
    fn uncompiled_network_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        let mut network = NeuralNetwork::new(4, 2, 0.3);
        network.add_layer(5).unwrap();

        network.save(&path).unwrap();
        let mut loaded = NeuralNetwork::load(&path).unwrap();
        assert!(!loaded.is_compiled());
        loaded.compile().unwrap();
        assert_eq!(loaded.topology(), vec![5, 2]);
    }

    #[test]
    fn garbage_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        fs::write(&path, b"not a network").unwrap();
        assert!(matches!(NeuralNetwork::load(&path), Err(Error::Deserialization(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(NeuralNetwork::load(dir.path().join("absent.bin")), Err(Error::Io(_))));
    }

    #[test]
    fn rejects_wrong_magic_and_version() {
        let snapshot = NetworkSnapshot::from(&trained_network());

        let mut bad_magic = snapshot.clone();
        bad_magic.magic = *b"XXXX";
        assert!(matches!(bad_magic.into_network(), Err(Error::Deserialization(_))));

        let mut bad_version = snapshot;
        bad_version.version = FORMAT_VERSION + 1;
        assert!(matches!(bad_version.into_network(), Err(Error::Deserialization(_))));
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let snapshot = NetworkSnapshot::from(&trained_network());

        let mut short_values = snapshot.clone();
        short_values.weights[0].values.pop();
        assert!(short_values.into_network().is_err());

        let mut broken_chain = snapshot.clone();
        broken_chain.weights[1] = MatrixRecord { rows: 1, cols: 4, values: vec![0.0; 4] };
        assert!(broken_chain.into_network().is_err());

        let mut wrong_output = snapshot.clone();
        wrong_output.output_size = 2;
        assert!(wrong_output.into_network().is_err());

        let mut missing_layer = snapshot;
        missing_layer.layers.pop();
        assert!(missing_layer.into_network().is_err());
    }
}
