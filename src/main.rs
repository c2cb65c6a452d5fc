// Trains the XOR network and prints its predictions.
//
//   cargo run                       # default 2-8-10-1 topology
//   cargo run -- network.json       # topology from a NetworkConfig file
//
// Set RUST_LOG=debug to see construction and persistence events.
use dense_nn::{train_loop, Matrix, NetworkConfig, NeuralNetwork, Sample, TrainConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> dense_nn::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => NetworkConfig::load_json(&path)?,
        None => NetworkConfig {
            hidden_layers: vec![8, 10],
            ..NetworkConfig::new(2, 1, 0.1)
        },
    };
    info!(?config, "building network");

    let mut network = NeuralNetwork::from_config(&config)?;
    let samples = vec![
        Sample::from_slices(&[0.0, 0.0], &[0.0]),
        Sample::from_slices(&[1.0, 1.0], &[0.0]),
        Sample::from_slices(&[1.0, 0.0], &[1.0]),
        Sample::from_slices(&[0.0, 1.0], &[1.0]),
    ];

    let stats = train_loop(&mut network, &samples, &TrainConfig::default())?;
    info!(mean_loss = stats.mean_loss, elapsed_ms = stats.elapsed_ms, "training finished");

    for sample in &samples {
        let output = network.run(&sample.input)?;
        println!("{:?} -> {:.5}", sample.input.values(), output.get(0, 0)?);
    }
    network.run(&Matrix::from_values(2, 1, &[0.0, 1.0]))?.render();

    Ok(())
}
