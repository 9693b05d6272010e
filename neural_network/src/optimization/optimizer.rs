use super::Moments;
use crate::tensor::Tensor;

/// Defines the strategy for updating model parameters based on accumulated gradients.
pub trait Optimizer: Send + Sync {
    /// Updates `params` using the accumulated gradient.
    ///
    /// # Arguments
    /// * `grad` - The gradient sum of the current batch, same shape as `params`.
    /// * `params` - The parameters to update.
    /// * `moments` - The persistent optimizer state of `params`.
    fn update_params(&self, grad: &Tensor, params: &mut Tensor, moments: &mut Moments);
}
