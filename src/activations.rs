use serde::{Deserialize, Serialize};

/// The capability a network consumes to turn a neuron's weighted sum into its output.
///
/// `derivative` is expressed in terms of the neuron's already computed output,
///  not its weighted sum. For sigmoid this is the familiar $ o(1-o) $.
pub trait ActivationFunction {
    /// Applies the activation to a weighted sum.
    fn activate(&self, x: f64) -> f64;
    /// Derivative of the activation given the output it produced.
    fn derivative(&self, output: f64) -> f64;
}

/// Defines activations of layers in neural network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Sigmoid activation functions.
    ///
    /// $ A(z)=\frac{1}{1+e^-z} $
    Sigmoid,
    /// Tanh activation functions.
    ///
    /// $ A(z)=\frac{2}{1+e^{-2z}}-1 $
    Tanh,
    /// ReLU activation function.
    ///
    /// $ A(z)=max(z,0) $
    ReLU,
    /// Identity, leaves the weighted sum untouched.
    ///
    /// $ A(z)=z $
    Linear,
}
impl ActivationFunction for Activation {
    fn activate(&self, x: f64) -> f64 {
        return match self {
            Self::Sigmoid => 1f64 / (1f64 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::ReLU => x.max(0f64),
            Self::Linear => x,
        };
    }
    // Derivative wrt layer input (∂a/∂z), given a.
    fn derivative(&self, output: f64) -> f64 {
        return match self {
            // s' = s(1-s)
            Self::Sigmoid => output * (1f64 - output),
            // t' = 1-t^2
            Self::Tanh => 1f64 - output * output,
            // ReLU(z)/dz = if >0 1 else 0, and ReLU(z)>0 iff z>0
            Self::ReLU => {
                if output > 0f64 {
                    1f64
                } else {
                    0f64
                }
            }
            Self::Linear => 1f64,
        };
    }
}
impl Default for Activation {
    fn default() -> Self {
        Activation::Sigmoid
    }
}

/// Activation built from a pair of closures.
///
/// ```
/// use feedforward::activations::{ActivationFunction, FnActivation};
///
/// // Softsign: x/(1+|x|), derivative (1-|o|)^2 in terms of output o.
/// let softsign = FnActivation::new(|x: f64| x / (1. + x.abs()), |o: f64| (1. - o.abs()).powi(2));
/// assert_eq!(softsign.activate(1.), 0.5);
/// assert_eq!(softsign.derivative(0.5), 0.25);
/// ```
#[derive(Clone, Copy)]
pub struct FnActivation<F, D> {
    activate: F,
    derivative: D,
}
impl<F, D> FnActivation<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    pub fn new(activate: F, derivative: D) -> Self {
        FnActivation {
            activate,
            derivative,
        }
    }
}
impl<F, D> ActivationFunction for FnActivation<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    fn activate(&self, x: f64) -> f64 {
        (self.activate)(x)
    }
    fn derivative(&self, output: f64) -> f64 {
        (self.derivative)(output)
    }
}

impl<T: ActivationFunction + ?Sized> ActivationFunction for &T {
    fn activate(&self, x: f64) -> f64 {
        (**self).activate(x)
    }
    fn derivative(&self, output: f64) -> f64 {
        (**self).derivative(output)
    }
}
impl<T: ActivationFunction + ?Sized> ActivationFunction for Box<T> {
    fn activate(&self, x: f64) -> f64 {
        (**self).activate(x)
    }
    fn derivative(&self, output: f64) -> f64 {
        (**self).derivative(output)
    }
}
