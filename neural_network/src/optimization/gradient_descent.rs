use super::{Moments, Optimizer};
use crate::{MlErr, Result, tensor::Tensor};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    ///
    /// # Returns
    /// A new `GradientDescent` instance or an error if `learning_rate` isn't a positive number.
    pub fn new(learning_rate: f32) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.) {
            return Err(MlErr::InvalidHyperparameter {
                what: "learning rate",
                value: learning_rate,
            });
        }

        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&self, grad: &Tensor, params: &mut Tensor, _moments: &mut Moments) {
        let lr = self.learning_rate;

        for (p, g) in params.as_mut_slice().iter_mut().zip(grad.as_slice()) {
            *p -= lr * g;
        }
    }
}
