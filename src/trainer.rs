use crate::activations::ActivationFunction;
use crate::error::Result;
use crate::neural_network::NeuralNetwork;
use crate::setter_enums::*;

use ndarray::Array2;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info};

use std::{
    fs::create_dir_all,
    path::PathBuf,
    time::{Duration, Instant},
};

/// Default number of epochs before halting.
pub const DEFAULT_EPOCHS: u32 = 1000;
/// Default amount to decay learning rate by.
///
/// `new learning rate = learning rate decay * old learning rate`
pub const DEFAULT_LEARNING_RATE_DECAY: f64 = 0.5;
/// Default folder checkpoints are written under.
pub const DEFAULT_CHECKPOINT_DIR: &str = "checkpoints";

/// Outcome of a training run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingReport {
    /// Epochs completed.
    pub epochs: u32,
    /// Mean error across the examples of the last epoch, measured before each example's update.
    ///
    /// When no epoch ran this is the mean error of the untrained network.
    pub error: f64,
    /// Learning rate after any decay.
    pub learning_rate: f64,
    pub duration: Duration,
}

/// To practically implement optional setting of training hyperparameters.
///
/// Training is online: every epoch feeds each example once through
///  [`NeuralNetwork::train`], updating weights after every example.
pub struct Trainer<'a, A> {
    pub(crate) data: &'a Array2<f64>,
    pub(crate) targets: &'a Array2<f64>,
    // Will halt after at a certain iteration, error or duration.
    pub(crate) halt_condition: HaltCondition,
    // Can log after a certain number of iterations, a certain duration, or not at all.
    pub(crate) log_interval: Option<MeasuredCondition>,
    pub(crate) learning_rate: f64,
    // Amount to decrease learning rate by (less than 1)(`learning_rate` *= learning_rate_decay`).
    pub(crate) learning_rate_decay: f64,
    // Epochs without improvement to wait until decreasing learning rate, 0 never decays.
    pub(crate) learning_rate_interval: Option<u32>,
    // Epochs without improvement to wait until stopping.
    pub(crate) early_stopping_condition: Option<u32>,
    pub(crate) shuffle: bool,
    pub(crate) seed: Option<u64>,
    // Duration/iterations between writing the network to file.
    pub(crate) checkpoint_interval: Option<MeasuredCondition>,
    pub(crate) checkpoint_dir: PathBuf,
    // Sub-folder of `checkpoint_dir`.
    // Used to differentiate between nets when checkpointing multiple.
    pub(crate) name: Option<&'a str>,
    pub(crate) neural_network: &'a mut NeuralNetwork<A>,
}
impl<'a, A: ActivationFunction> Trainer<'a, A> {
    // Dataset must already be checked against the network.
    pub(crate) fn new(
        neural_network: &'a mut NeuralNetwork<A>,
        data: &'a Array2<f64>,
        targets: &'a Array2<f64>,
    ) -> Trainer<'a, A> {
        return Trainer {
            data,
            targets,
            halt_condition: HaltCondition::Iteration(DEFAULT_EPOCHS),
            log_interval: None,
            learning_rate: neural_network.learning_rate(),
            learning_rate_decay: DEFAULT_LEARNING_RATE_DECAY,
            learning_rate_interval: None,
            early_stopping_condition: None,
            shuffle: true,
            seed: None,
            checkpoint_interval: None,
            checkpoint_dir: PathBuf::from(DEFAULT_CHECKPOINT_DIR),
            name: None,
            neural_network,
        };
    }
    /// Sets `halt_condition`.
    ///
    /// `halt_condition` sets after which Iteration/Duration or reached error to stop training.
    pub fn halt_condition(&mut self, halt_condition: HaltCondition) -> &mut Trainer<'a, A> {
        self.halt_condition = halt_condition;
        return self;
    }
    /// Sets `log_interval`.
    ///
    /// `log_interval` sets some amount of Iterations/Duration to log the error of the neural net.
    pub fn log_interval(&mut self, log_interval: MeasuredCondition) -> &mut Trainer<'a, A> {
        self.log_interval = Some(log_interval);
        return self;
    }
    /// Sets `learning_rate`, overriding the network's own.
    pub fn learning_rate(&mut self, learning_rate: f64) -> &mut Trainer<'a, A> {
        self.learning_rate = learning_rate;
        return self;
    }
    /// Sets `learning_rate_decay`.
    ///
    /// `learning_rate_decay` is the multiplier by which to decay the learning rate.
    pub fn learning_rate_decay(&mut self, learning_rate_decay: f64) -> &mut Trainer<'a, A> {
        self.learning_rate_decay = learning_rate_decay;
        return self;
    }
    /// Sets `learning_rate_interval`.
    ///
    /// Learning rate decays each time this many epochs pass without the error improving.
    /// An interval of 0 never decays.
    pub fn learning_rate_interval(&mut self, epochs: u32) -> &mut Trainer<'a, A> {
        self.learning_rate_interval = Some(epochs);
        return self;
    }
    /// Sets `early_stopping_condition`.
    ///
    /// Stops after this many epochs without the error improving.
    pub fn early_stopping_condition(&mut self, epochs: u32) -> &mut Trainer<'a, A> {
        self.early_stopping_condition = Some(epochs);
        return self;
    }
    /// Sets `shuffle`.
    ///
    /// `shuffle` determines whether examples are fed in a new random order each epoch.
    pub fn shuffle(&mut self, shuffle: bool) -> &mut Trainer<'a, A> {
        self.shuffle = shuffle;
        return self;
    }
    /// Sets `seed` for shuffling.
    pub fn seed(&mut self, seed: u64) -> &mut Trainer<'a, A> {
        self.seed = Some(seed);
        return self;
    }
    /// Sets `checkpoint_interval`.
    ///
    /// `checkpoint_interval` sets how often (if at all) to save the network,
    ///  as `<checkpoint_dir>/<name>/<epoch>.json`.
    pub fn checkpoint_interval(
        &mut self,
        checkpoint_interval: MeasuredCondition,
    ) -> &mut Trainer<'a, A> {
        self.checkpoint_interval = Some(checkpoint_interval);
        return self;
    }
    /// Sets `checkpoint_dir`.
    pub fn checkpoint_dir<P: Into<PathBuf>>(
        &mut self,
        checkpoint_dir: P,
    ) -> &mut Trainer<'a, A> {
        self.checkpoint_dir = checkpoint_dir.into();
        return self;
    }
    /// Sets `name`
    ///
    /// `name` sets the folder to put checkpoint files in.
    /// Used to differentiate between nets when checkpointing multiple.
    pub fn name(&mut self, name: &'a str) -> &mut Trainer<'a, A> {
        self.name = Some(name);
        return self;
    }
    /// Begins training.
    pub fn go(&mut self) -> Result<TrainingReport> {
        let start_instant = Instant::now();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let examples = self.data.nrows();
        let mut order: Vec<usize> = (0..examples).collect();

        let mut learning_rate = self.learning_rate;
        self.neural_network.set_learning_rate(learning_rate);

        let mut iterations_elapsed = 0u32;
        let mut error = f64::INFINITY;
        let mut best_error = f64::INFINITY;
        // Epochs since `best_error` last improved.
        let mut stale = 0u32;
        let mut last_logged = Instant::now();
        let mut last_checkpointed = Instant::now();

        debug!(
            examples,
            learning_rate,
            halt_condition = ?self.halt_condition,
            "training started"
        );

        while !self.halted(iterations_elapsed, start_instant, error) {
            if self.shuffle {
                order.shuffle(&mut rng);
            }

            let mut error_sum = 0f64;
            for &i in order.iter() {
                let input = self.data.row(i).to_vec();
                let target = self.targets.row(i).to_vec();
                self.neural_network.train(&input, &target)?;
                error_sum += self.neural_network.total_error();
            }
            error = error_sum / examples as f64;
            iterations_elapsed += 1;

            if error < best_error {
                best_error = error;
                stale = 0;
            } else {
                stale += 1;
            }

            if let Some(log_interval) = self.log_interval {
                if due(log_interval, iterations_elapsed, &mut last_logged) {
                    info!(
                        iteration = iterations_elapsed,
                        error,
                        learning_rate,
                        elapsed = ?start_instant.elapsed(),
                        "training"
                    );
                }
            }
            if let Some(checkpoint_interval) = self.checkpoint_interval {
                if due(checkpoint_interval, iterations_elapsed, &mut last_checkpointed) {
                    self.checkpoint(iterations_elapsed)?;
                }
            }
            if let Some(interval) = self.learning_rate_interval {
                if interval != 0 && stale != 0 && stale % interval == 0 {
                    learning_rate *= self.learning_rate_decay;
                    self.neural_network.set_learning_rate(learning_rate);
                    info!(iteration = iterations_elapsed, learning_rate, "learning rate decayed");
                }
            }
            if let Some(patience) = self.early_stopping_condition {
                if stale >= patience {
                    info!(iteration = iterations_elapsed, error, "early stopping");
                    break;
                }
            }
        }
        // No epoch ran, so report the untrained network's error.
        if iterations_elapsed == 0 {
            error = self.neural_network.evaluate(self.data, self.targets)?;
        }

        let report = TrainingReport {
            epochs: iterations_elapsed,
            error,
            learning_rate,
            duration: start_instant.elapsed(),
        };
        info!(
            iterations = report.epochs,
            error = report.error,
            duration = ?report.duration,
            "training finished"
        );
        return Ok(report);
    }
    fn halted(&self, iterations_elapsed: u32, start_instant: Instant, error: f64) -> bool {
        return match self.halt_condition {
            HaltCondition::Iteration(iterations) => iterations_elapsed >= iterations,
            HaltCondition::Duration(duration) => start_instant.elapsed() >= duration,
            HaltCondition::Error(threshold) => iterations_elapsed > 0 && error <= threshold,
        };
    }
    // Outputs a checkpoint file.
    fn checkpoint(&self, iterations_elapsed: u32) -> Result<()> {
        let mut folder = self.checkpoint_dir.clone();
        if let Some(name) = self.name {
            folder.push(name);
        }
        create_dir_all(&folder)?;
        self.neural_network
            .save(folder.join(format!("{}.json", iterations_elapsed)))
    }
}

// Whether a measured interval has come round, resets `last` when a duration fires.
fn due(condition: MeasuredCondition, iterations_elapsed: u32, last: &mut Instant) -> bool {
    return match condition {
        MeasuredCondition::Iteration(interval) => {
            interval != 0 && iterations_elapsed % interval == 0
        }
        MeasuredCondition::Duration(duration) => {
            if last.elapsed() >= duration {
                *last = Instant::now();
                true
            } else {
                false
            }
        }
    };
}
