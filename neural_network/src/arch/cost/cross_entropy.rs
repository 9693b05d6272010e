use super::CostFn;
use crate::tensor::Tensor;

const EPSILON: f32 = 1e-8;

/// Categorical cross entropy, meant to follow a softmax output.
#[derive(Default, Clone, Copy)]
pub struct CrossEntropy;

impl CostFn for CrossEntropy {
    fn evaluate(&self, pred: &Tensor, target: &Tensor) -> f32 {
        let sum: f32 = pred
            .as_slice()
            .iter()
            .zip(target.as_slice())
            .filter(|&(_, &t)| t != 0.)
            .map(|(p, t)| t * p.ln())
            .sum();

        -sum
    }

    fn gradient(&self, pred: &mut Tensor, target: &Tensor) {
        pred.as_mut_slice()
            .iter_mut()
            .zip(target.as_slice())
            .for_each(|(p, t)| *p = -t / (*p + EPSILON));
    }
}
