use super::{Adam, GradientDescent, Moments, Optimizer};
use crate::tensor::Tensor;

/// An optimizer picked at runtime, usually from a configuration file.
#[derive(Debug, Clone, Copy)]
pub enum OptimizerKind {
    Adam(Adam),
    GradientDescent(GradientDescent),
}

impl Optimizer for OptimizerKind {
    fn update_params(&self, grad: &Tensor, params: &mut Tensor, moments: &mut Moments) {
        match self {
            Self::Adam(o) => o.update_params(grad, params, moments),
            Self::GradientDescent(o) => o.update_params(grad, params, moments),
        }
    }
}
