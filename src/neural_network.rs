use crate::activations::{Activation, ActivationFunction};
use crate::error::{Error, Result};
use crate::layer::{DeltaRule, DenseLayer};
use crate::snapshot::{NetworkSnapshot, NeuronSnapshot};
use crate::trainer::Trainer;

use ndarray::{Array2, Axis};
use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use tracing::{debug, trace};

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// The fundamental neural network struct.
///
/// Layer 0 only holds the inputs, every later layer is a [`DenseLayer`] fed by the one before it.
///  The network exclusively owns all neuron state, `run` and `train` mutate it in place,
///  so calls from several threads must be serialized by the caller.
#[derive(Clone, Debug)]
pub struct NeuralNetwork<A = Activation> {
    // Outputs of the input layer.
    inputs: Vec<f64>,
    // Layers 1..L-1.
    layers: Vec<DenseLayer>,
    activation: A,
    learning_rate: f64,
    delta_rule: DeltaRule,
    // Halved sum of squared errors of the last `train` call.
    total_error: f64,
}

// Checks that given layer sizes describe a valid network.
pub(crate) fn check_topology(layer_sizes: &[usize]) -> Result<()> {
    // Checks network contains input and output layer
    if layer_sizes.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "requires at least an input and an output layer, got {} layer(s)",
            layer_sizes.len()
        )));
    }
    if let Some(index) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(Error::InvalidTopology(format!(
            "layer {} has no neurons, all layer sizes must be >0",
            index
        )));
    }
    Ok(())
}

impl<A: ActivationFunction> NeuralNetwork<A> {
    /// Constructs network of given layer sizes, weights and biases drawn uniformly from [0,1).
    ///
    /// ```
    /// use feedforward::{Activation, NeuralNetwork};
    ///
    /// // Net (2 -Sigmoid-> 3 -Sigmoid-> 1)
    /// let mut net = NeuralNetwork::new(&[2, 3, 1], Activation::Sigmoid, 0.1).unwrap();
    /// let output = net.run(&[1., 0.5]).unwrap();
    /// assert_eq!(output.len(), 1);
    /// ```
    pub fn new(layer_sizes: &[usize], activation: A, learning_rate: f64) -> Result<Self> {
        NeuralNetwork::with_rng(layer_sizes, activation, learning_rate, &mut thread_rng())
    }
    /// Constructs network with weights drawn from a generator seeded by `seed`.
    ///
    /// Networks built from the same seed and layer sizes are identical.
    pub fn new_seeded(
        layer_sizes: &[usize],
        activation: A,
        learning_rate: f64,
        seed: u64,
    ) -> Result<Self> {
        NeuralNetwork::with_rng(
            layer_sizes,
            activation,
            learning_rate,
            &mut StdRng::seed_from_u64(seed),
        )
    }
    /// Constructs network with weights drawn from a given generator.
    pub fn with_rng<R: Rng>(
        layer_sizes: &[usize],
        activation: A,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_topology(layer_sizes)?;
        let layers = layer_sizes
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], rng))
            .collect();
        debug!(?layer_sizes, learning_rate, "constructed network");
        Ok(NeuralNetwork::from_layers(
            layer_sizes[0],
            layers,
            activation,
            learning_rate,
        ))
    }
    /// Constructs network of given layer sizes with all weights and biases set to given value.
    pub fn new_constant(
        layer_sizes: &[usize],
        activation: A,
        learning_rate: f64,
        val: f64,
    ) -> Result<Self> {
        check_topology(layer_sizes)?;
        let layers = layer_sizes
            .windows(2)
            .map(|pair| DenseLayer::new_constant(pair[0], pair[1], val))
            .collect();
        Ok(NeuralNetwork::from_layers(
            layer_sizes[0],
            layers,
            activation,
            learning_rate,
        ))
    }
    /// Rebuilds a network from a snapshot, restoring exact weights and biases.
    pub fn from_snapshot(snapshot: NetworkSnapshot, activation: A) -> Result<Self> {
        snapshot.validate()?;
        let layers = snapshot
            .layers
            .into_iter()
            .zip(snapshot.layer_sizes.iter())
            .map(|(neurons, &from)| {
                let mut weights = Vec::with_capacity(from * neurons.len());
                let mut biases = Vec::with_capacity(neurons.len());
                for neuron in neurons {
                    weights.extend(neuron.weights);
                    biases.push(neuron.bias);
                }
                DenseLayer::from_parts(from, weights, biases)
            })
            .collect();
        let net = NeuralNetwork::from_layers(
            snapshot.layer_sizes[0],
            layers,
            activation,
            snapshot.learning_rate,
        );
        Ok(net.with_delta_rule(snapshot.delta_rule))
    }
    fn from_layers(
        inputs: usize,
        layers: Vec<DenseLayer>,
        activation: A,
        learning_rate: f64,
    ) -> Self {
        NeuralNetwork {
            inputs: vec![0f64; inputs],
            layers,
            activation,
            learning_rate,
            delta_rule: DeltaRule::default(),
            total_error: 0f64,
        }
    }
    /// Loads a network saved with [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P, activation: A) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let snapshot: NetworkSnapshot = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), layer_sizes = ?snapshot.layer_sizes, "loaded network");
        NeuralNetwork::from_snapshot(snapshot, activation)
    }

    /// Sets which rule backpropagates errors into hidden layers.
    pub fn with_delta_rule(mut self, delta_rule: DeltaRule) -> Self {
        self.delta_rule = delta_rule;
        self
    }
    pub fn set_delta_rule(&mut self, delta_rule: DeltaRule) {
        self.delta_rule = delta_rule;
    }
    pub fn delta_rule(&self) -> DeltaRule {
        self.delta_rule
    }
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }
    pub fn activation(&self) -> &A {
        &self.activation
    }
    /// Halved sum of squared errors computed by the last call to [`NeuralNetwork::train`].
    pub fn total_error(&self) -> f64 {
        self.total_error
    }
    /// Neurons per layer, input layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.inputs.len())
            .chain(self.layers.iter().map(DenseLayer::len))
            .collect()
    }
    /// Number of layers, input layer included.
    pub fn len(&self) -> usize {
        self.layers.len() + 1
    }
    pub fn input_size(&self) -> usize {
        self.inputs.len()
    }
    pub fn output_size(&self) -> usize {
        self.output_layer().len()
    }

    /// Runs an example through the network.
    ///
    /// Returns the outputs of the last layer.
    pub fn run(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.check_inputs(inputs)?;
        Ok(self.inner_run(inputs).to_vec())
    }
    // Forepropagates, `inputs` must already be checked.
    fn inner_run(&mut self, inputs: &[f64]) -> &[f64] {
        // Sets input layer
        self.inputs.copy_from_slice(inputs);

        let activation = &self.activation;
        let mut a: &[f64] = &self.inputs;
        for layer in self.layers.iter_mut() {
            layer.forepropagate(a, activation);
            a = &layer.outputs;
        }

        // Returns activation of last layer.
        return a;
    }
    /// Trains the network on a single example.
    ///
    /// Feeds forward, stores the error (see [`NeuralNetwork::total_error`]), then backpropagates
    ///  updating every weight and bias. Shapes are checked before anything is mutated.
    ///
    /// ```
    /// use feedforward::{Activation, NeuralNetwork};
    ///
    /// let mut net = NeuralNetwork::new_seeded(&[2, 2, 1], Activation::Sigmoid, 0.5, 1).unwrap();
    /// net.train(&[1., 1.], &[1.]).unwrap();
    /// let before = net.total_error();
    /// for _ in 0..100 {
    ///     net.train(&[1., 1.], &[1.]).unwrap();
    /// }
    /// assert!(net.total_error() < before);
    /// ```
    pub fn train(&mut self, inputs: &[f64], targets: &[f64]) -> Result<()> {
        self.check_inputs(inputs)?;
        self.check_targets(targets)?;

        // Feeds forward
        // --------------
        let outputs = self.inner_run(inputs);
        let total_error = halved_squared_error(outputs, targets);

        // Backpropagates
        // --------------

        // ∂E/∂a = -(t-a)
        let mut partial_error: Vec<f64> = outputs
            .iter()
            .zip(targets)
            .map(|(output, target)| -(target - output))
            .collect();
        self.total_error = total_error;

        let (activation, learning_rate, rule) =
            (&self.activation, self.learning_rate, self.delta_rule);
        for l in (0..self.layers.len()).rev() {
            let (previous, rest) = self.layers.split_at_mut(l);
            let a: &[f64] = match previous.last() {
                Some(previous) => &previous.outputs,
                None => &self.inputs,
            };
            partial_error =
                rest[0].backpropagate(&partial_error, a, activation, learning_rate, rule);
        }

        trace!(total_error = self.total_error, "trained example");
        Ok(())
    }

    /// Mean error (halved sum of squared errors) across a dataset, one example per row.
    ///
    /// Only feeds forward, weights are left untouched.
    pub fn evaluate(&mut self, data: &Array2<f64>, targets: &Array2<f64>) -> Result<f64> {
        self.check_dataset(data, targets)?;
        let mut sum = 0f64;
        for (input, target) in data.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
            let target = target.to_vec();
            let outputs = self.inner_run(&input.to_vec());
            sum += halved_squared_error(outputs, &target);
        }
        Ok(sum / data.nrows() as f64)
    }
    /// Begins setting hyperparameters for training over a dataset.
    ///
    /// Returns `Trainer` struct used to specify hyperparameters
    ///
    /// Training a network to learn an XOR gate:
    /// ```
    /// use ndarray::array;
    /// use feedforward::{Activation, HaltCondition, NeuralNetwork};
    ///
    /// let mut net = NeuralNetwork::new_seeded(&[2, 3, 1], Activation::Sigmoid, 0.5, 3).unwrap();
    /// let data = array![[0., 0.], [1., 0.], [0., 1.], [1., 1.]];
    /// let targets = array![[0.], [1.], [1.], [0.]];
    ///
    /// let report = net
    ///     .fit(&data, &targets)
    ///     .unwrap()
    ///     .halt_condition(HaltCondition::Iteration(10))
    ///     .go()
    ///     .unwrap();
    /// assert_eq!(report.epochs, 10);
    /// ```
    pub fn fit<'a>(
        &'a mut self,
        data: &'a Array2<f64>,
        targets: &'a Array2<f64>,
    ) -> Result<Trainer<'a, A>> {
        self.check_dataset(data, targets)?;
        Ok(Trainer::new(self, data, targets))
    }

    /// Weight of the connection from neuron `input` of layer `layer-1`
    ///  to neuron `neuron` of `layer`.
    pub fn weight(&self, layer: usize, neuron: usize, input: usize) -> Result<f64> {
        let dense = self.dense(layer)?;
        Error::check_index("neuron", neuron, dense.len())?;
        Error::check_index("weight", input, dense.from)?;
        Ok(dense.weights[neuron * dense.from + input])
    }
    pub fn set_weight(
        &mut self,
        layer: usize,
        neuron: usize,
        input: usize,
        value: f64,
    ) -> Result<()> {
        let dense = self.dense_mut(layer)?;
        Error::check_index("neuron", neuron, dense.len())?;
        Error::check_index("weight", input, dense.from)?;
        dense.weights[neuron * dense.from + input] = value;
        Ok(())
    }
    pub fn bias(&self, layer: usize, neuron: usize) -> Result<f64> {
        let dense = self.dense(layer)?;
        Error::check_index("neuron", neuron, dense.len())?;
        Ok(dense.biases[neuron])
    }
    pub fn set_bias(&mut self, layer: usize, neuron: usize, value: f64) -> Result<()> {
        let dense = self.dense_mut(layer)?;
        Error::check_index("neuron", neuron, dense.len())?;
        dense.biases[neuron] = value;
        Ok(())
    }
    /// Output of a neuron from the last forward pass. For layer 0 this is the input value.
    pub fn output(&self, layer: usize, neuron: usize) -> Result<f64> {
        Error::check_index("layer", layer, self.len())?;
        let outputs = match layer {
            0 => &self.inputs,
            _ => &self.layers[layer - 1].outputs,
        };
        Error::check_index("neuron", neuron, outputs.len())?;
        Ok(outputs[neuron])
    }
    /// Delta of a neuron from the last training step. Input neurons never carry one and read 0.
    pub fn delta(&self, layer: usize, neuron: usize) -> Result<f64> {
        Error::check_index("layer", layer, self.len())?;
        if layer == 0 {
            Error::check_index("neuron", neuron, self.inputs.len())?;
            return Ok(0f64);
        }
        let dense = &self.layers[layer - 1];
        Error::check_index("neuron", neuron, dense.len())?;
        Ok(dense.deltas[neuron])
    }
    /// Layer `layer` (>0), exposing its weights, biases, outputs and deltas.
    pub fn layer(&self, layer: usize) -> Result<&DenseLayer> {
        self.dense(layer)
    }

    /// Captures topology and parameters.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            layer_sizes: self.layer_sizes(),
            learning_rate: self.learning_rate,
            delta_rule: self.delta_rule,
            layers: self
                .layers
                .iter()
                .map(|layer| {
                    (0..layer.len())
                        .map(|n| NeuronSnapshot {
                            weights: layer.neuron_weights(n).to_vec(),
                            bias: layer.biases[n],
                        })
                        .collect()
                })
                .collect(),
        }
    }
    /// Saves network to `path` as JSON.
    ///
    /// Fails with [`Error::InvalidSnapshot`] without touching `path` if any weight, bias or
    ///  the learning rate is NaN or infinite.
    /// ```
    /// use feedforward::{Activation, NeuralNetwork};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("my_neural_network.json");
    ///
    /// let net = NeuralNetwork::new(&[2, 3, 1], Activation::Sigmoid, 0.1).unwrap();
    /// net.save(&path).unwrap();
    ///
    /// let loaded = NeuralNetwork::load(&path, Activation::Sigmoid).unwrap();
    /// assert_eq!(loaded.snapshot(), net.snapshot());
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        // Non-finite values would be written as `null` and fail to load.
        snapshot.validate()?;
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        debug!(path = %path.display(), "saved network");
        Ok(())
    }

    fn output_layer(&self) -> &DenseLayer {
        // Topology checks guarantee at least one non-input layer.
        &self.layers[self.layers.len() - 1]
    }
    fn dense(&self, layer: usize) -> Result<&DenseLayer> {
        if layer == 0 {
            return Err(Error::NoWeightsForInputLayer);
        }
        Error::check_index("layer", layer, self.len())?;
        Ok(&self.layers[layer - 1])
    }
    fn dense_mut(&mut self, layer: usize) -> Result<&mut DenseLayer> {
        if layer == 0 {
            return Err(Error::NoWeightsForInputLayer);
        }
        Error::check_index("layer", layer, self.len())?;
        Ok(&mut self.layers[layer - 1])
    }
    fn check_inputs(&self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.inputs.len() {
            return Err(Error::InputSizeMismatch {
                expected: self.inputs.len(),
                actual: inputs.len(),
            });
        }
        Ok(())
    }
    fn check_targets(&self, targets: &[f64]) -> Result<()> {
        let expected = self.output_size();
        if targets.len() != expected {
            return Err(Error::TargetSizeMismatch {
                expected,
                actual: targets.len(),
            });
        }
        Ok(())
    }
    /// Checks a dataset has an equal number of examples and targets and fits the network.
    ///
    /// This is called whenever you give a dataset to the library,
    ///  you do not need to call this yourself.
    pub fn check_dataset(&self, data: &Array2<f64>, targets: &Array2<f64>) -> Result<()> {
        if data.nrows() == 0 {
            return Err(Error::InvalidDataset("dataset has no examples".to_string()));
        }
        if data.nrows() != targets.nrows() {
            return Err(Error::InvalidDataset(format!(
                "number of examples ({}) does not match number of targets ({})",
                data.nrows(),
                targets.nrows()
            )));
        }
        if data.ncols() != self.input_size() {
            return Err(Error::InputSizeMismatch {
                expected: self.input_size(),
                actual: data.ncols(),
            });
        }
        if targets.ncols() != self.output_size() {
            return Err(Error::TargetSizeMismatch {
                expected: self.output_size(),
                actual: targets.ncols(),
            });
        }
        Ok(())
    }
}

// E = Σ ½(t-a)²
fn halved_squared_error(outputs: &[f64], targets: &[f64]) -> f64 {
    outputs
        .iter()
        .zip(targets)
        .map(|(output, target)| 0.5 * (target - output) * (target - output))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::FnActivation;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn sigmoid(x: f64) -> f64 {
        1. / (1. + (-x).exp())
    }

    #[test]
    fn topology_validation() {
        assert!(matches!(
            NeuralNetwork::new(&[3], Activation::Sigmoid, 0.1),
            Err(Error::InvalidTopology(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[], Activation::Sigmoid, 0.1),
            Err(Error::InvalidTopology(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[3, 0, 2], Activation::Sigmoid, 0.1),
            Err(Error::InvalidTopology(_))
        ));
        assert!(matches!(
            NeuralNetwork::new_constant(&[3, 2, 0], Activation::Sigmoid, 0.1, 0.),
            Err(Error::InvalidTopology(_))
        ));
    }
    #[test]
    fn layer_sizes() {
        let net = NeuralNetwork::new(&[4, 3, 2], Activation::Tanh, 0.1).unwrap();
        assert_eq!(net.layer_sizes(), vec![4, 3, 2]);
        assert_eq!(net.len(), 3);
        assert_eq!((net.input_size(), net.output_size()), (4, 2));
        assert_eq!(net.layer(1).unwrap().neuron_weights(2).len(), 4);
    }
    #[test]
    fn seeded_networks_match() {
        let a = NeuralNetwork::new_seeded(&[2, 3, 1], Activation::Sigmoid, 0.1, 11).unwrap();
        let b = NeuralNetwork::new_seeded(&[2, 3, 1], Activation::Sigmoid, 0.1, 11).unwrap();
        let c = NeuralNetwork::new_seeded(&[2, 3, 1], Activation::Sigmoid, 0.1, 12).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
        assert_ne!(a.snapshot(), c.snapshot());
    }
    #[test]
    fn input_layer_holds_raw_inputs() {
        let mut net = NeuralNetwork::new_seeded(&[2, 1], Activation::Sigmoid, 0.1, 0).unwrap();
        net.run(&[-3., 7.]).unwrap();
        assert_eq!(net.output(0, 0).unwrap(), -3.);
        assert_eq!(net.output(0, 1).unwrap(), 7.);
    }
    #[test]
    fn forward_single_layer() {
        let mut net = NeuralNetwork::new_constant(&[2, 1], Activation::Sigmoid, 0.1, 0.).unwrap();
        net.set_weight(1, 0, 0, 0.5).unwrap();
        net.set_weight(1, 0, 1, -0.25).unwrap();
        net.set_bias(1, 0, 0.1).unwrap();
        let out = net.run(&[2., 4.]).unwrap();
        // 0.5*2 - 0.25*4 + 0.1 = 0.1
        assert_abs_diff_eq!(out[0], sigmoid(0.1), epsilon = 1e-12);
    }
    #[test]
    fn shape_mismatches_leave_state_untouched() {
        let mut net = NeuralNetwork::new_seeded(&[2, 2, 1], Activation::Sigmoid, 0.5, 4).unwrap();
        let before = net.snapshot();
        assert!(matches!(
            net.run(&[1., 2., 3.]),
            Err(Error::InputSizeMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            net.train(&[1., 2.], &[1., 0.]),
            Err(Error::TargetSizeMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(matches!(
            net.train(&[1.], &[1.]),
            Err(Error::InputSizeMismatch { .. })
        ));
        assert_eq!(net.snapshot(), before);
        assert_eq!(net.output(0, 0).unwrap(), 0.);
    }
    #[test]
    fn accessor_errors() {
        let mut net = NeuralNetwork::new(&[2, 3, 1], Activation::Sigmoid, 0.1).unwrap();
        assert!(matches!(net.weight(0, 0, 0), Err(Error::NoWeightsForInputLayer)));
        assert!(matches!(net.bias(0, 0), Err(Error::NoWeightsForInputLayer)));
        assert!(matches!(
            net.set_weight(0, 0, 0, 1.),
            Err(Error::NoWeightsForInputLayer)
        ));
        assert!(matches!(
            net.weight(3, 0, 0),
            Err(Error::IndexOutOfRange { what: "layer", .. })
        ));
        assert!(matches!(
            net.weight(1, 3, 0),
            Err(Error::IndexOutOfRange { what: "neuron", .. })
        ));
        assert!(matches!(
            net.weight(2, 0, 3),
            Err(Error::IndexOutOfRange { what: "weight", .. })
        ));
        assert!(matches!(
            net.output(0, 2),
            Err(Error::IndexOutOfRange { what: "neuron", .. })
        ));
        assert!(matches!(
            net.output(3, 0),
            Err(Error::IndexOutOfRange { what: "layer", .. })
        ));
        assert!(matches!(
            net.delta(2, 1),
            Err(Error::IndexOutOfRange { what: "neuron", .. })
        ));
        assert!(matches!(
            net.set_bias(1, 3, 0.),
            Err(Error::IndexOutOfRange { what: "neuron", .. })
        ));
        assert_eq!(net.delta(0, 1).unwrap(), 0.);
    }
    #[test]
    fn output_delta_single_layer() {
        // 1 -> 1 linear: a = w*x + b, δ = -(t-a)
        let mut net = NeuralNetwork::new_constant(&[1, 1], Activation::Linear, 0.25, 1.).unwrap();
        net.train(&[2.], &[1.]).unwrap();
        // a = 3, δ = 2, E = ½(1-3)² = 2
        assert_eq!(net.total_error(), 2.);
        assert_eq!(net.delta(1, 0).unwrap(), 2.);
        assert_eq!(net.weight(1, 0, 0).unwrap(), 1. - 0.25 * 2. * 2.);
        assert_eq!(net.bias(1, 0).unwrap(), 1. - 0.25 * 2.);
    }
    #[test]
    fn hidden_deltas_sum_downstream() {
        // 1 -> 1 -> 2, linear, all weights 1 and biases 0.
        let mut net = NeuralNetwork::new_constant(&[1, 1, 2], Activation::Linear, 0.1, 1.).unwrap();
        for n in 0..2 {
            net.set_bias(2, n, 0.).unwrap();
        }
        net.set_bias(1, 0, 0.).unwrap();
        net.set_weight(2, 1, 0, 2.).unwrap();
        net.train(&[1.], &[0., 0.]).unwrap();
        // outputs: hidden 1, out [1, 2]; output deltas [1, 2]
        assert_eq!(net.delta(2, 0).unwrap(), 1.);
        assert_eq!(net.delta(2, 1).unwrap(), 2.);
        // hidden δ = 1*1 + 2*2 with pre-update weights
        assert_eq!(net.delta(1, 0).unwrap(), 5.);
    }
    #[test]
    fn hidden_deltas_reference_rule() {
        let mut net = NeuralNetwork::new_constant(&[1, 1, 2], Activation::Linear, 0.1, 1.)
            .unwrap()
            .with_delta_rule(DeltaRule::Reference);
        for n in 0..2 {
            net.set_bias(2, n, 0.).unwrap();
        }
        net.set_bias(1, 0, 0.).unwrap();
        net.set_weight(2, 1, 0, 2.).unwrap();
        net.train(&[1.], &[0., 0.]).unwrap();
        // δ = -A'(a) * δ_last = -2
        assert_eq!(net.delta(1, 0).unwrap(), -2.);
    }
    #[test]
    fn custom_activation() {
        let mut net = NeuralNetwork::new_constant(
            &[1, 1],
            FnActivation::new(|x: f64| 3. * x, |_: f64| 3.),
            0.1,
            1.,
        )
        .unwrap();
        assert_eq!(net.run(&[1.]).unwrap(), vec![6.]);
    }
    #[test]
    fn evaluate_dataset() {
        let mut net = NeuralNetwork::new_constant(&[1, 1], Activation::Linear, 0.1, 1.).unwrap();
        let before = net.snapshot();
        // outputs 1 and 2, errors ½ and 2
        let error = net.evaluate(&array![[0.], [1.]], &array![[0.], [0.]]).unwrap();
        assert_eq!(error, 1.25);
        assert_eq!(net.snapshot(), before);
    }
    #[test]
    fn dataset_checks() {
        let net = NeuralNetwork::new(&[2, 1], Activation::Sigmoid, 0.1).unwrap();
        assert!(matches!(
            net.check_dataset(&array![[0., 0.]], &array![[0.], [1.]]),
            Err(Error::InvalidDataset(_))
        ));
        assert!(matches!(
            net.check_dataset(&array![[0.]], &array![[0.]]),
            Err(Error::InputSizeMismatch { .. })
        ));
        assert!(matches!(
            net.check_dataset(&array![[0., 0.]], &array![[0., 1.]]),
            Err(Error::TargetSizeMismatch { .. })
        ));
        assert!(matches!(
            net.check_dataset(&Array2::zeros((0, 2)), &Array2::zeros((0, 1))),
            Err(Error::InvalidDataset(_))
        ));
    }
    #[test]
    fn snapshot_round_trip() {
        let mut net = NeuralNetwork::new_seeded(&[3, 4, 2], Activation::Tanh, 0.3, 9)
            .unwrap()
            .with_delta_rule(DeltaRule::Reference);
        net.train(&[0.1, 0.2, 0.3], &[0.5, -0.5]).unwrap();
        let mut rebuilt = NeuralNetwork::from_snapshot(net.snapshot(), Activation::Tanh).unwrap();
        assert_eq!(rebuilt.delta_rule(), DeltaRule::Reference);
        assert_eq!(rebuilt.learning_rate(), 0.3);
        assert_eq!(
            net.run(&[0.7, -0.1, 0.4]).unwrap(),
            rebuilt.run(&[0.7, -0.1, 0.4]).unwrap()
        );
    }    #[test]
    fn save_rejects_non_finite_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let mut net = NeuralNetwork::new_constant(&[2, 2, 1], Activation::Sigmoid, 0.1, 0.5)
            .unwrap();

        let path = dir.path().join("nan.json");
        net.set_weight(2, 0, 1, f64::NAN).unwrap();
        assert!(matches!(net.save(&path), Err(Error::InvalidSnapshot(_))));
        assert!(!path.exists());

        let path = dir.path().join("inf.json");
        net.set_weight(2, 0, 1, 0.5).unwrap();
        net.set_bias(1, 1, f64::INFINITY).unwrap();
        assert!(matches!(net.save(&path), Err(Error::InvalidSnapshot(_))));
        assert!(!path.exists());

        net.set_bias(1, 1, 0.5).unwrap();
        net.save(&path).unwrap();
        let loaded = NeuralNetwork::load(&path, Activation::Sigmoid).unwrap();
        assert_eq!(loaded.snapshot(), net.snapshot());
    }
}
