use std::time::Duration;

/// For setting a hyperparameter with measured intervals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasuredCondition {
    /// Every given number of iterations (epochs).
    Iteration(u32),
    /// Whenever a given duration has elapsed since it last fired.
    Duration(Duration),
}
/// For setting `halt_condition`.
///
/// The training halt condition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HaltCondition {
    /// Halt after completing a given number of iterations (epochs)
    Iteration(u32),
    /// Halt after a given duration has elapsed.
    Duration(Duration),
    /// Halt once the mean error of an epoch falls to or below a given value.
    Error(f64),
}
