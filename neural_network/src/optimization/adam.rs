use ndarray::{ArrayView1, ArrayViewMut1, Zip};

use super::{Moments, Optimizer};
use crate::{MlErr, Result, tensor::Tensor};

#[derive(Debug, Clone, Copy)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance or an error if a hyperparameter is out of range.
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Result<Self> {
        let checks = [
            ("learning rate", learning_rate, learning_rate > 0.),
            ("beta1", beta1, (0.0..1.0).contains(&beta1)),
            ("beta2", beta2, (0.0..1.0).contains(&beta2)),
            ("epsilon", epsilon, epsilon > 0.),
        ];

        for (what, value, valid) in checks {
            if !(value.is_finite() && valid) {
                return Err(MlErr::InvalidHyperparameter { what, value });
            }
        }

        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        })
    }

    /// Creates a new `Adam` optimizer with `beta1 = 0.9`, `beta2 = 0.999` and `epsilon = 1e-7`.
    pub fn with_learning_rate(learning_rate: f32) -> Result<Self> {
        Self::new(learning_rate, 0.9, 0.999, 1e-7)
    }
}

impl Optimizer for Adam {
    fn update_params(&self, grad: &Tensor, params: &mut Tensor, moments: &mut Moments) {
        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
        } = *self;

        moments.steps += 1;
        let t = moments.steps as i32;
        let bc1 = 1. - b1.powi(t);
        let bc2 = 1. - b2.powi(t);

        Zip::from(ArrayViewMut1::from(params.as_mut_slice()))
            .and(ArrayView1::from(grad.as_slice()))
            .and(ArrayViewMut1::from(moments.first.as_mut_slice()))
            .and(ArrayViewMut1::from(moments.second.as_mut_slice()))
            .par_for_each(|p, &g, m, v| {
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g * g;
                *p -= lr * (*m / bc1) / ((*v / bc2).sqrt() + eps);
            });
    }
}
