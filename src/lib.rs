//! A layered feedforward network of scalar neurons, trained by plain gradient descent.
//!
//! ```
//! use feedforward::{Activation, NeuralNetwork};
//!
//! let mut net = NeuralNetwork::new(&[2, 2, 1], Activation::Sigmoid, 0.5).unwrap();
//! net.train(&[1., 0.], &[1.]).unwrap();
//! let output = net.run(&[1., 0.]).unwrap();
//! assert!(output[0] > 0. && output[0] < 1.);
//! ```

pub mod activations;
pub mod error;
pub mod layer;
pub mod neural_network; // Container neural network structure and primary user facing functionality
pub mod setter_enums;
pub mod snapshot;
pub mod trainer;

pub use activations::{Activation, ActivationFunction, FnActivation};
pub use error::{Error, Result};
pub use layer::{DeltaRule, DenseLayer};
pub use neural_network::NeuralNetwork;
pub use setter_enums::{HaltCondition, MeasuredCondition};
pub use snapshot::{NetworkSnapshot, NeuronSnapshot};
pub use trainer::{Trainer, TrainingReport};
