pub mod config;
pub mod network;
pub mod persist;

pub use config::NetworkConfig;
pub use network::{ForwardPass, NeuralNetwork};
pub use persist::{MatrixRecord, NetworkSnapshot};
