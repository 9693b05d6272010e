use super::Optimizer;
use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// The persistent optimizer state of a parameter tensor.
///
/// Holds the moving averages of the gradient and of its square together with the amount of
/// updates done so far. Never reset during the parameter's lifetime.
#[derive(Debug, Clone)]
pub struct Moments {
    pub(super) first: Tensor,
    pub(super) second: Tensor,
    pub(super) steps: u32,
}

impl Moments {
    pub fn new(shape: Shape) -> Self {
        Self {
            first: Tensor::new(shape),
            second: Tensor::new(shape),
            steps: 0,
        }
    }

    pub fn first(&self) -> &Tensor {
        &self.first
    }

    pub fn second(&self) -> &Tensor {
        &self.second
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// Accumulates the gradient of a trainable tensor over a batch.
#[derive(Debug, Clone)]
pub struct ParamChange {
    change: Tensor,
    moments: Moments,
}

impl ParamChange {
    /// Creates a new zeroed `ParamChange` for a parameter of shape `shape`.
    pub fn new(shape: Shape) -> Self {
        Self {
            change: Tensor::new(shape),
            moments: Moments::new(shape),
        }
    }

    /// The gradient accumulated since the last update.
    pub fn change(&self) -> &Tensor {
        &self.change
    }

    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    /// Adds `grad` to the accumulated gradient.
    pub fn accumulate(&mut self, grad: &Tensor) -> Result<()> {
        self.change.add_ip(grad)
    }

    /// Applies the accumulated gradient to `params` through `optimizer` and zeroes it.
    ///
    /// # Returns
    /// An error if `params` doesn't have the accumulator's shape, in which case nothing changes.
    pub fn apply<O>(&mut self, optimizer: &O, params: &mut Tensor) -> Result<()>
    where
        O: Optimizer + ?Sized,
    {
        if params.shape() != self.change.shape() {
            return Err(MlErr::ShapeMismatch {
                what: "parameter update",
                got: params.shape(),
                expected: self.change.shape(),
            });
        }

        optimizer.update_params(&self.change, params, &mut self.moments);
        self.change.fill(0.);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{Adam, GradientDescent};

    #[test]
    fn apply_zeroes_the_change_but_keeps_moments() {
        let optimizer = Adam::with_learning_rate(0.01).unwrap();
        let mut change = ParamChange::new(Shape::d1(2));
        let mut params = Tensor::new(Shape::d1(2));

        let grad = Tensor::from_vec(Shape::d1(2), vec![1., 2.]).unwrap();
        change.accumulate(&grad).unwrap();
        change.accumulate(&grad).unwrap();
        assert_eq!(change.change().as_slice(), &[2., 4.]);

        change.apply(&optimizer, &mut params).unwrap();

        assert!(change.change().as_slice().iter().all(|&g| g == 0.));
        assert_eq!(change.moments().steps(), 1);
        assert!(change.moments().first().as_slice().iter().all(|&m| m != 0.));
    }

    #[test]
    fn apply_rejects_foreign_parameters() {
        let optimizer = GradientDescent::new(0.1).unwrap();
        let mut change = ParamChange::new(Shape::d1(2));
        change.accumulate(&Tensor::filled(Shape::d1(2), 1.)).unwrap();
        let mut params = Tensor::new(Shape::d1(3));

        assert!(change.apply(&optimizer, &mut params).is_err());
        assert_eq!(change.change().as_slice(), &[1., 1.]);
        assert!(params.as_slice().iter().all(|&p| p == 0.));
    }
}
