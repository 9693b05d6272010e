use rand_distr::{Bernoulli, Distribution};

use super::ActivationCache;
use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// Zeroes a random subset of its input while training and rescales the survivors.
///
/// Without a cache, or outside training mode, the layer is the identity.
#[derive(Debug, Clone)]
pub struct Dropout {
    shape: Shape,
    rate: f32,
    keep: Bernoulli,
    training_mode: bool,
}

impl Dropout {
    /// Creates a new `Dropout` layer.
    ///
    /// # Arguments
    /// * `shape` - The input and output shape.
    /// * `rate` - The probability of dropping each activation, in `[0, 1)`.
    /// * `training_mode` - Whether the layer drops activations at all.
    ///
    /// # Returns
    /// A new `Dropout` or an error if `rate` is out of range.
    pub fn new(shape: Shape, rate: f32, training_mode: bool) -> Result<Self> {
        let invalid = MlErr::InvalidHyperparameter {
            what: "dropout rate",
            value: rate,
        };

        if !(0.0..1.0).contains(&rate) {
            return Err(invalid);
        }

        let keep = Bernoulli::new(1. - rate as f64).map_err(|_| invalid)?;

        Ok(Self {
            shape,
            rate,
            keep,
            training_mode,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn feedforward(&self, x: &mut Tensor, cache: Option<&mut ActivationCache>) -> Result<()> {
        if x.shape() != self.shape {
            return Err(MlErr::ShapeMismatch {
                what: "dropout feedforward",
                got: x.shape(),
                expected: self.shape,
            });
        }

        let Some(cache) = cache else {
            return Ok(());
        };

        if !self.training_mode {
            return Ok(());
        }

        let scale = 1. / (1. - self.rate);
        let rng = cache.rng();
        let mask: Vec<f32> = (0..self.shape.size())
            .map(|_| if self.keep.sample(rng) { scale } else { 0. })
            .collect();

        let mask = Tensor::from_vec(self.shape, mask)?;
        x.component_mul_ip(&mask)?;
        cache.push(mask);
        Ok(())
    }

    pub fn backprop(&self, delta: &mut Tensor, cache: &mut ActivationCache) -> Result<()> {
        let mask = cache.pop("dropout")?;
        delta.component_mul_ip(&mask)
    }
}
