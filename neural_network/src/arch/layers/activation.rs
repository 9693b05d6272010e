use super::ActivationCache;
use crate::{
    MlErr, Result,
    arch::activations::ActFn,
    tensor::{Shape, Tensor},
};

/// Applies an `ActFn` to its input, keeping the shape.
#[derive(Debug, Clone)]
pub struct Activation {
    shape: Shape,
    act_fn: ActFn,
    training_mode: bool,
}

impl Activation {
    pub fn new(shape: Shape, act_fn: ActFn, training_mode: bool) -> Self {
        Self {
            shape,
            act_fn,
            training_mode,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn act_fn(&self) -> ActFn {
        self.act_fn
    }

    /// Applies the activation function in place, caching the input while training.
    pub fn feedforward(&self, x: &mut Tensor, cache: Option<&mut ActivationCache>) -> Result<()> {
        if x.shape() != self.shape {
            return Err(MlErr::ShapeMismatch {
                what: "activation feedforward",
                got: x.shape(),
                expected: self.shape,
            });
        }

        if let Some(cache) = cache {
            if self.training_mode {
                cache.push(x.clone());
            }
        }

        self.act_fn.forward(x);
        Ok(())
    }

    pub fn backprop(&self, delta: &mut Tensor, cache: &mut ActivationCache) -> Result<()> {
        let input = cache.pop("activation")?;
        self.act_fn.backward(&input, delta)
    }
}
