pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod network;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::sigmoid::{sigmoid, Sigmoid};
pub use loss::mse::MseLoss;
pub use network::network::{ForwardPass, NeuralNetwork};
pub use network::config::NetworkConfig;
pub use train::{train_epoch, train_loop, Sample, TrainConfig, TrainStats};
