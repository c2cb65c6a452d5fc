use dense_nn::{Matrix, NeuralNetwork};
use rand::Rng;

fn main() -> dense_nn::Result<()> {
    tracing_subscriber::fmt::init();

    let truth = Matrix::from_values(1, 1, &[1.0]);
    let falsity = Matrix::from_values(1, 1, &[0.0]);
    let inputs = [
        (Matrix::from_values(2, 1, &[0.0, 0.0]), &falsity),
        (Matrix::from_values(2, 1, &[1.0, 1.0]), &falsity),
        (Matrix::from_values(2, 1, &[1.0, 0.0]), &truth),
        (Matrix::from_values(2, 1, &[0.0, 1.0]), &truth),
    ];

    // 2 inputs, 1 output, two (oversized) hidden layers of 8 and 10 neurons.
    let mut network = NeuralNetwork::new(2, 1, 0.1);
    network.add_layer(8)?;
    network.add_layer(10)?;
    network.compile()?;

    let mut rng = rand::thread_rng();
    for iteration in 0..10_000 {
        let (input, target) = &inputs[rng.gen_range(0..inputs.len())];
        let loss = network.train(input, target)?;
        if iteration % 1000 == 0 {
            println!("Iteration {iteration}: loss = {loss:.6}");
        }
    }

    for (input, _) in &inputs {
        println!("{:?} -> {:.5}", input.values(), network.run(input)?.get(0, 0)?);
    }

    let path = std::env::temp_dir().join("xor.dnn");
    network.save(&path)?;
    let restored = NeuralNetwork::load(&path)?;
    println!("restored (0,1):");
    restored.run(&inputs[3].0)?.render();

    Ok(())
}
