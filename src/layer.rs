use crate::activations::ActivationFunction;

use itertools::izip;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a hidden neuron's error signal is gathered from the layer above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaRule {
    /// Backpropagation proper.
    ///
    /// $ \delta_j = A'(a_j) \sum_k w_{kj} \delta_k $
    Standard,
    /// Reproduces the legacy behaviour where only the last downstream neuron counts,
    ///  with its sign flipped and no weighting.
    ///
    /// $ \delta_j = -A'(a_j) \delta_{last} $
    ///
    /// Only useful for comparing against networks trained by the legacy engine.
    Reference,
}
impl Default for DeltaRule {
    fn default() -> Self {
        DeltaRule::Standard
    }
}

/// A dense layer of scalar neurons.
///
/// Weights are stored row-major, one row of `from` weights per neuron,
///  so `weights[n * from + w]` connects neuron `w` of the previous layer to neuron `n`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub(crate) from: usize,
    pub(crate) weights: Vec<f64>,
    pub(crate) biases: Vec<f64>,
    pub(crate) outputs: Vec<f64>,
    pub(crate) deltas: Vec<f64>,
}
impl DenseLayer {
    // Constructs new `DenseLayer`, weights and biases uniform in [0,1).
    pub(crate) fn new<R: Rng>(from: usize, size: usize, rng: &mut R) -> DenseLayer {
        let weights = (0..size * from).map(|_| rng.gen::<f64>()).collect();
        let biases = (0..size).map(|_| rng.gen::<f64>()).collect();
        return DenseLayer::from_parts(from, weights, biases);
    }
    // Constructs new `DenseLayer` using a given value for all weights and biases.
    pub(crate) fn new_constant(from: usize, size: usize, val: f64) -> DenseLayer {
        return DenseLayer::from_parts(from, vec![val; size * from], vec![val; size]);
    }
    // Caller guarantees `weights.len() == biases.len() * from`.
    pub(crate) fn from_parts(from: usize, weights: Vec<f64>, biases: Vec<f64>) -> DenseLayer {
        debug_assert_eq!(weights.len(), biases.len() * from);
        let size = biases.len();
        return DenseLayer {
            from,
            weights,
            biases,
            outputs: vec![0f64; size],
            deltas: vec![0f64; size],
        };
    }
    /// Number of neurons.
    pub fn len(&self) -> usize {
        self.biases.len()
    }
    /// Incoming weights of neuron `n`.
    pub fn neuron_weights(&self, n: usize) -> &[f64] {
        &self.weights[n * self.from..(n + 1) * self.from]
    }
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }
    // Forward propagates, `a` being the outputs of the previous layer.
    pub(crate) fn forepropagate<A: ActivationFunction>(&mut self, a: &[f64], activation: &A) {
        debug_assert_eq!(a.len(), self.from);
        for (row, bias, output) in izip!(
            self.weights.chunks_exact(self.from),
            self.biases.iter(),
            self.outputs.iter_mut()
        ) {
            // z
            let weighted_input: f64 = row.iter().zip(a).map(|(w, x)| w * x).sum::<f64>() + bias;
            // a
            *output = activation.activate(weighted_input);
        }
    }
    // Backpropagates.
    // (Updates weights and biases during this process).
    //
    // Returns the partial error (∂E/∂a) of the previous layer, computed from the weights as
    //  they were during the forward pass.
    pub(crate) fn backpropagate<A: ActivationFunction>(
        &mut self,
        partial_error: &[f64], // ∂E/∂a of this layer
        a: &[f64],             // l-1 (activation from previous layer)
        activation: &A,
        learning_rate: f64,
        rule: DeltaRule,
    ) -> Vec<f64> {
        debug_assert_eq!(partial_error.len(), self.len());

        // δ = ∂a/∂z * ∂E/∂a
        for (delta, output, error) in izip!(
            self.deltas.iter_mut(),
            self.outputs.iter(),
            partial_error.iter()
        ) {
            *delta = activation.derivative(*output) * error;
        }

        // ∂E/∂a^{l-1}
        let nxt_partial_error = match rule {
            // w^T matmul δ
            DeltaRule::Standard => {
                let mut nxt = vec![0f64; self.from];
                for (row, delta) in self.weights.chunks_exact(self.from).zip(self.deltas.iter()) {
                    for (e, w) in nxt.iter_mut().zip(row) {
                        *e += w * delta;
                    }
                }
                nxt
            }
            DeltaRule::Reference => {
                let last = self.deltas.last().copied().unwrap_or_default();
                vec![-last; self.from]
            }
        };

        // w -= η δ a^{l-1}, b -= η δ
        for (row, bias, delta) in izip!(
            self.weights.chunks_exact_mut(self.from),
            self.biases.iter_mut(),
            self.deltas.iter()
        ) {
            for (w, x) in row.iter_mut().zip(a) {
                *w -= learning_rate * delta * x;
            }
            *bias -= learning_rate * delta;
        }

        return nxt_partial_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_init_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = DenseLayer::new(4, 3, &mut rng);
        assert_eq!(layer.weights.len(), 12);
        assert_eq!(layer.len(), 3);
        assert!(layer
            .weights
            .iter()
            .chain(layer.biases.iter())
            .all(|v| (0f64..1f64).contains(v)));
    }
    #[test]
    fn forepropagate_linear() {
        let mut layer = DenseLayer::from_parts(2, vec![1., 2., 3., 4.], vec![0.5, -1.]);
        layer.forepropagate(&[1., 1.], &Activation::Linear);
        assert_eq!(layer.outputs(), &[3.5, 6.]);
        assert_eq!(layer.neuron_weights(1), &[3., 4.]);
    }
    #[test]
    fn backpropagate_standard() {
        // 2 -> 2, linear, so ∂a/∂z = 1 and δ = partial error.
        let mut layer = DenseLayer::from_parts(2, vec![1., 2., 3., 4.], vec![0., 0.]);
        let a = [1., 2.];
        layer.forepropagate(&a, &Activation::Linear);
        let nxt =
            layer.backpropagate(&[0.5, -1.], &a, &Activation::Linear, 0.1, DeltaRule::Standard);

        assert_eq!(layer.deltas(), &[0.5, -1.]);
        // Uses pre-update weights: [1*0.5 + 3*-1, 2*0.5 + 4*-1]
        assert_abs_diff_eq!(nxt[0], -2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(nxt[1], -3.0, epsilon = 1e-12);
        // w -= 0.1 * δ * a
        assert_abs_diff_eq!(layer.weights[0], 1. - 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.weights[1], 2. - 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.weights[2], 3. + 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.weights[3], 4. + 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases[0], -0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases[1], 0.1, epsilon = 1e-12);
    }
    #[test]
    fn backpropagate_reference() {
        let mut layer = DenseLayer::from_parts(3, vec![1.; 6], vec![0., 0.]);
        let a = [0., 0., 0.];
        layer.forepropagate(&a, &Activation::Linear);
        let nxt =
            layer.backpropagate(&[0.5, 2.], &a, &Activation::Linear, 0.1, DeltaRule::Reference);
        assert_eq!(nxt, vec![-2.; 3]);
    }
}
