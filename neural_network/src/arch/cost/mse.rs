use super::CostFn;
use crate::tensor::Tensor;

/// Mean squared error cost function, halved so its gradient is `pred - target`.
#[derive(Default, Clone, Copy)]
pub struct Mse;

impl CostFn for Mse {
    fn evaluate(&self, pred: &Tensor, target: &Tensor) -> f32 {
        let size = pred.size();
        if size == 0 {
            return 0.;
        }

        let sum: f32 = pred
            .as_slice()
            .iter()
            .zip(target.as_slice())
            .map(|(p, t)| 0.5 * (p - t).powi(2))
            .sum();

        sum / size as f32
    }

    fn gradient(&self, pred: &mut Tensor, target: &Tensor) {
        pred.as_mut_slice()
            .iter_mut()
            .zip(target.as_slice())
            .for_each(|(p, t)| *p -= t);
    }
}
