use serde::{Deserialize, Serialize};

use super::{CrossEntropy, Mse};
use crate::{MlErr, Result, tensor::Tensor};

/// A cost function over a prediction and its expected output.
///
/// Implementors may assume both tensors have the same shape.
pub trait CostFn {
    /// Returns the scalar cost of `pred` with respect to `target`.
    fn evaluate(&self, pred: &Tensor, target: &Tensor) -> f32;

    /// Replaces `pred` with the gradient of the cost with respect to it.
    fn gradient(&self, pred: &mut Tensor, target: &Tensor);
}

/// The cost functions a network can be trained with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    /// Zero cost and an untouched gradient, for setups that seed the deltas themselves.
    #[default]
    Null,
    MeanSquaredError,
    CategoricalCrossEntropy,
}

impl Cost {
    /// Computes the cost of `pred` with respect to `target`.
    ///
    /// # Returns
    /// The scalar cost or an error if the shapes differ.
    pub fn evaluate(&self, pred: &Tensor, target: &Tensor) -> Result<f32> {
        check_shapes(pred, target)?;

        let cost = match self {
            Cost::Null => 0.,
            Cost::MeanSquaredError => Mse.evaluate(pred, target),
            Cost::CategoricalCrossEntropy => CrossEntropy.evaluate(pred, target),
        };

        Ok(cost)
    }

    /// Turns `pred` into the gradient of the cost with respect to it.
    ///
    /// # Returns
    /// An error if the shapes differ, in which case `pred` is left untouched.
    pub fn gradient(&self, pred: &mut Tensor, target: &Tensor) -> Result<()> {
        check_shapes(pred, target)?;

        match self {
            Cost::Null => {}
            Cost::MeanSquaredError => Mse.gradient(pred, target),
            Cost::CategoricalCrossEntropy => CrossEntropy.gradient(pred, target),
        }

        Ok(())
    }
}

fn check_shapes(pred: &Tensor, target: &Tensor) -> Result<()> {
    if pred.shape() != target.shape() {
        return Err(MlErr::ShapeMismatch {
            what: "cost function",
            got: pred.shape(),
            expected: target.shape(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Shape;

    fn vector(data: &[f32]) -> Tensor {
        Tensor::from_vec(Shape::d1(data.len()), data.to_vec()).unwrap()
    }

    #[test]
    fn mse_gradient_is_the_difference() {
        let mut pred = vector(&[0.5, -1., 2., 3.]);
        let target = vector(&[1., 1., 1., 1.]);
        let expected: Vec<f32> = pred
            .as_slice()
            .iter()
            .zip(target.as_slice())
            .map(|(p, t)| p - t)
            .collect();

        Cost::MeanSquaredError.gradient(&mut pred, &target).unwrap();
        assert_eq!(pred.as_slice(), expected.as_slice());
    }

    #[test]
    fn mse_is_half_the_mean_squared_error() {
        let pred = vector(&[1., 3.]);
        let target = vector(&[0., 0.]);

        let cost = Cost::MeanSquaredError.evaluate(&pred, &target).unwrap();
        assert!((cost - 2.5).abs() < 1e-6);
    }

    #[test]
    fn cross_entropy_of_confident_prediction() {
        let pred = vector(&[0.7, 0.3]);
        let target = vector(&[1., 0.]);

        let cost = Cost::CategoricalCrossEntropy.evaluate(&pred, &target).unwrap();
        assert!((cost - 0.357).abs() < 1e-3);
        assert!((cost + 0.7f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn cross_entropy_gradient_is_guarded() {
        let mut pred = vector(&[0., 0.5]);
        let target = vector(&[1., 1.]);

        Cost::CategoricalCrossEntropy
            .gradient(&mut pred, &target)
            .unwrap();

        assert!(pred.as_slice()[0].is_finite());
        assert!((pred.as_slice()[1] + 2.).abs() < 1e-5);
    }

    #[test]
    fn null_cost_does_nothing() {
        let mut pred = vector(&[0.2, 0.8]);
        let target = vector(&[1., 0.]);

        assert_eq!(Cost::Null.evaluate(&pred, &target).unwrap(), 0.);
        Cost::Null.gradient(&mut pred, &target).unwrap();
        assert_eq!(pred.as_slice(), &[0.2, 0.8]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let mut pred = vector(&[0.2, 0.8]);
        let target = vector(&[1., 0., 0.]);

        assert!(Cost::MeanSquaredError.evaluate(&pred, &target).is_err());
        assert!(Cost::MeanSquaredError.gradient(&mut pred, &target).is_err());
        assert_eq!(pred.as_slice(), &[0.2, 0.8]);
    }
}
