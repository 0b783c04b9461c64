//! Error types for the network and its training driver.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by network construction, evaluation, training and persistence.
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer than two layers, or a layer with no neurons.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Input vector does not match the input layer.
    #[error("Input size mismatch: network has {expected} input neurons, got {actual} inputs")]
    InputSizeMismatch { expected: usize, actual: usize },

    /// Target vector does not match the output layer.
    #[error("Target size mismatch: network has {expected} output neurons, got {actual} targets")]
    TargetSizeMismatch { expected: usize, actual: usize },

    /// The input layer holds values only, it has no incoming weights or bias.
    #[error("There are no weights for the input layer")]
    NoWeightsForInputLayer,

    /// Layer, neuron or weight index past the end.
    #[error("{what} index {index} out of range (0 <= index < {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A snapshot whose shape does not describe a valid network.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Training data that cannot be fed to the network.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    // Checks `index < len`.
    pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
        if index >= len {
            return Err(Error::IndexOutOfRange { what, index, len });
        }
        Ok(())
    }
}
