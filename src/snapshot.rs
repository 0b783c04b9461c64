//! Persisted form of a network.
//!
//! A snapshot holds the topology and every weight and bias, enough to rebuild a network
//!  without re-running random initialization. Per-neuron outputs and deltas are transient
//!  and not stored.

use crate::error::{Error, Result};
use crate::layer::DeltaRule;

use serde::{Deserialize, Serialize};

/// Weights and bias of one non-input neuron.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuronSnapshot {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Topology and parameters of a whole network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Neurons per layer, input layer first.
    pub layer_sizes: Vec<usize>,
    pub learning_rate: f64,
    #[serde(default)]
    pub delta_rule: DeltaRule,
    /// Neurons of layers `1..layer_sizes.len()`, the input layer has nothing to store.
    pub layers: Vec<Vec<NeuronSnapshot>>,
}
impl NetworkSnapshot {
    /// Checks the snapshot describes a network that can be built.
    ///
    /// JSON has no encoding for NaN or infinity, so non-finite parameters are rejected too.
    pub fn validate(&self) -> Result<()> {
        crate::neural_network::check_topology(&self.layer_sizes)?;
        if !self.learning_rate.is_finite() {
            return Err(Error::InvalidSnapshot(format!(
                "learning rate {} is not finite",
                self.learning_rate
            )));
        }
        if self.layers.len() != self.layer_sizes.len() - 1 {
            return Err(Error::InvalidSnapshot(format!(
                "{} layer sizes need {} weighted layers, found {}",
                self.layer_sizes.len(),
                self.layer_sizes.len() - 1,
                self.layers.len()
            )));
        }
        for (l, layer) in self.layers.iter().enumerate() {
            // `l` indexes from the first non-input layer.
            let (from, size) = (self.layer_sizes[l], self.layer_sizes[l + 1]);
            if layer.len() != size {
                return Err(Error::InvalidSnapshot(format!(
                    "layer {} should have {} neurons, found {}",
                    l + 1,
                    size,
                    layer.len()
                )));
            }
            for (n, neuron) in layer.iter().enumerate() {
                if neuron.weights.len() != from {
                    return Err(Error::InvalidSnapshot(format!(
                        "neuron {} of layer {} should have {} weights, found {}",
                        n,
                        l + 1,
                        from,
                        neuron.weights.len()
                    )));
                }
                if !neuron.bias.is_finite() || neuron.weights.iter().any(|w| !w.is_finite()) {
                    return Err(Error::InvalidSnapshot(format!(
                        "neuron {} of layer {} has a non-finite weight or bias",
                        n,
                        l + 1
                    )));
                }
            }
        }
        Ok(())
    }
}
