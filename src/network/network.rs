use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::activation::sigmoid::Sigmoid;
use crate::error::{Error, Result};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::config::NetworkConfig;

/// Initial weights are drawn uniformly from this range.
const WEIGHT_RANGE: (f64, f64) = (-1.0, 1.0);

/// Everything one forward evaluation produced: the input as a column vector
/// and the sigmoid activation of every layer, output layer last.
///
/// Returned by [`NeuralNetwork::forward`] and consumed by
/// [`NeuralNetwork::backpropagate`].
///
/// Only `forward` builds a pass, so it always holds at least the output layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub(crate) input: Matrix,
    pub(crate) activations: Vec<Matrix>,
}

impl ForwardPass {
    /// The input as the column vector that was fed to the first layer.
    pub fn input(&self) -> &Matrix {
        &self.input
    }

    /// Activation of every layer, output layer last.
    pub fn activations(&self) -> &[Matrix] {
        &self.activations
    }

    /// Activation of the output layer.
    pub fn output(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }

    pub fn into_output(mut self) -> Matrix {
        self.activations.swap_remove(self.activations.len() - 1)
    }
}

/// A fully-connected feedforward network with sigmoid activations and no biases.
///
/// Built in two phases: hidden layers are appended with [`add_layer`], then
/// [`compile`] appends the output layer and freezes the topology. Only a
/// compiled network can [`run`] or [`train`].
///
/// [`add_layer`]: NeuralNetwork::add_layer
/// [`compile`]: NeuralNetwork::compile
/// [`run`]: NeuralNetwork::run
/// [`train`]: NeuralNetwork::train
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    pub(crate) input_size: usize,
    pub(crate) output_size: usize,
    pub(crate) learning_rate: f64,
    /// Activations of the most recent training step, one `neurons x 1` column per layer.
    pub(crate) layers: Vec<Matrix>,
    /// `weights[i]` maps the previous layer (or the input) onto `layers[i]`.
    pub(crate) weights: Vec<Matrix>,
    pub(crate) compiled: bool,
    rng: StdRng,
}

impl NeuralNetwork {
    /// New, uncompiled network whose weights will come from an entropy-seeded RNG.
    pub fn new(input_size: usize, output_size: usize, learning_rate: f64) -> NeuralNetwork {
        NeuralNetwork::with_rng(input_size, output_size, learning_rate, StdRng::from_entropy())
    }

    /// Like [`NeuralNetwork::new`] but every weight draw is reproducible from `seed`.
    pub fn with_seed(input_size: usize, output_size: usize, learning_rate: f64, seed: u64) -> NeuralNetwork {
        NeuralNetwork::with_rng(input_size, output_size, learning_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(input_size: usize, output_size: usize, learning_rate: f64, rng: StdRng) -> NeuralNetwork {
        debug!(input_size, output_size, learning_rate, "creating network");
        NeuralNetwork {
            input_size,
            output_size,
            learning_rate,
            layers: Vec::new(),
            weights: Vec::new(),
            compiled: false,
            rng,
        }
    }

    /// Builds and compiles the topology described by `config`.
    pub fn from_config(config: &NetworkConfig) -> Result<NeuralNetwork> {
        config.validate()?;

        let mut network = match config.seed {
            Some(seed) => NeuralNetwork::with_seed(config.input_size, config.output_size, config.learning_rate, seed),
            None => NeuralNetwork::new(config.input_size, config.output_size, config.learning_rate),
        };
        for &neurons in &config.hidden_layers {
            network.add_layer(neurons)?;
        }
        network.compile()?;

        Ok(network)
    }

    /// Reassembles a network from already validated parts (used by snapshot loading).
    pub(crate) fn from_parts(
        input_size: usize,
        output_size: usize,
        learning_rate: f64,
        weights: Vec<Matrix>,
        layers: Vec<Matrix>,
        compiled: bool,
    ) -> NeuralNetwork {
        NeuralNetwork {
            input_size,
            output_size,
            learning_rate,
            layers,
            weights,
            compiled,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    pub fn layers(&self) -> &[Matrix] {
        &self.layers
    }

    /// Neuron count of every layer, output layer last.
    pub fn topology(&self) -> Vec<usize> {
        self.layers.iter().map(Matrix::rows).collect()
    }

    /// Width of the last layer added so far, or the input width if there is none.
    fn last_width(&self) -> usize {
        self.layers.last().map_or(self.input_size, Matrix::rows)
    }

    fn push_layer(&mut self, neurons: usize) {
        let (min, max) = WEIGHT_RANGE;
        let weights = Matrix::new(neurons, self.last_width()).randomize_with(min, max, &mut self.rng);
        self.weights.push(weights);
        self.layers.push(Matrix::new(neurons, 1));
    }

    /// Appends a hidden layer of `neurons` neurons.
    pub fn add_layer(&mut self, neurons: usize) -> Result<()> {
        if self.compiled {
            return Err(Error::AlreadyCompiled);
        }
        if neurons == 0 {
            return Err(Error::InvalidConfig("a layer needs at least one neuron".into()));
        }

        self.push_layer(neurons);
        debug!(neurons, depth = self.layers.len(), "added hidden layer");
        Ok(())
    }

    /// Appends the output layer and freezes the structure.
    ///
    /// A network without hidden layers is legal and behaves as a single
    /// perceptron layer.
    pub fn compile(&mut self) -> Result<()> {
        if self.compiled {
            return Err(Error::AlreadyCompiled);
        }
        if self.input_size == 0 || self.output_size == 0 {
            return Err(Error::InvalidConfig(format!(
                "input and output sizes must be positive, got {} and {}",
                self.input_size, self.output_size
            )));
        }

        self.push_layer(self.output_size);
        self.compiled = true;
        debug!(topology = ?self.topology(), "compiled network");
        Ok(())
    }

    fn ensure_compiled(&self) -> Result<()> {
        if !self.compiled {
            return Err(Error::NotCompiled);
        }
        Ok(())
    }

    /// Accepts `len x 1` as is and transposes `1 x len`.
    fn as_column(matrix: &Matrix, len: usize, op: &'static str) -> Result<Matrix> {
        match matrix.shape() {
            (rows, 1) if rows == len => Ok(matrix.clone()),
            (1, cols) if cols == len => Ok(matrix.transpose()),
            shape => Err(Error::mismatch(op, shape, (len, 1))),
        }
    }

    /// Feeds `input` through every layer and records all activations.
    ///
    /// `input` may be an `input_size x 1` column or a `1 x input_size` row.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardPass> {
        self.ensure_compiled()?;
        let input = NeuralNetwork::as_column(input, self.input_size, "run")?;

        let mut activations: Vec<Matrix> = Vec::with_capacity(self.weights.len());
        for weights in &self.weights {
            let previous = activations.last().unwrap_or(&input);
            let z = weights.multiply(previous)?;
            activations.push(Sigmoid::activate(&z));
        }

        Ok(ForwardPass { input, activations })
    }

    /// Output activation (`output_size x 1`) for `input`. Never touches the weights.
    pub fn run(&self, input: &Matrix) -> Result<Matrix> {
        Ok(self.forward(input)?.into_output())
    }

    /// One stochastic gradient step on a single sample.
    ///
    /// Returns the mean squared error of the prediction made before the update.
    pub fn train(&mut self, input: &Matrix, target: &Matrix) -> Result<f64> {
        self.ensure_compiled()?;
        let target = NeuralNetwork::as_column(target, self.output_size, "train")?;

        let pass = self.forward(input)?;
        let loss = MseLoss::loss(pass.output(), &target)?;
        self.backpropagate(&pass, &target)?;
        self.layers = pass.activations;

        Ok(loss)
    }

    /// Rejects a pass that was not produced by a network of this topology.
    fn check_pass(&self, pass: &ForwardPass) -> Result<()> {
        if pass.activations.len() != self.weights.len() {
            return Err(Error::mismatch(
                "backpropagate",
                (pass.activations.len(), 1),
                (self.weights.len(), 1),
            ));
        }
        if pass.input.shape() != (self.input_size, 1) {
            return Err(Error::mismatch("backpropagate", pass.input.shape(), (self.input_size, 1)));
        }
        for (activation, weights) in pass.activations.iter().zip(self.weights.iter()) {
            if activation.shape() != (weights.rows(), 1) {
                return Err(Error::mismatch("backpropagate", activation.shape(), (weights.rows(), 1)));
            }
        }
        Ok(())
    }

    /// Applies the weight update implied by `pass` and the desired `target`.
    ///
    /// Error signals are propagated through the weights as they were before
    /// this call; every delta is scaled by the learning rate. On error the
    /// weights are left untouched.
    pub fn backpropagate(&mut self, pass: &ForwardPass, target: &Matrix) -> Result<()> {
        self.ensure_compiled()?;
        self.check_pass(pass)?;

        // errors[i] belongs to layer i; filled from the output backwards.
        let mut errors = Vec::with_capacity(self.weights.len());
        errors.push(MseLoss::error(pass.output(), target)?);
        for i in (0..self.weights.len() - 1).rev() {
            let downstream = &errors[errors.len() - 1];
            let error = self.weights[i + 1].transpose().multiply(downstream)?;
            errors.push(error);
        }
        errors.reverse();

        let mut updated = Vec::with_capacity(self.weights.len());
        for (i, error) in errors.iter().enumerate() {
            let previous = if i == 0 { &pass.input } else { &pass.activations[i - 1] };
            let gradient = error.hadamard(&Sigmoid::gradient(&pass.activations[i]))?;
            let delta = gradient.multiply(&previous.transpose())?;
            updated.push(self.weights[i].add(&delta.scale(self.learning_rate))?);
        }
        self.weights = updated;

        Ok(())
    }
}
