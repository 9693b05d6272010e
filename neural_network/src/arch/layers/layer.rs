use rand::Rng;

use super::{Activation, ActivationCache, Dense, Dropout, Flatten, Input, LayerDesc};
use crate::{
    MlErr, Result,
    optimization::Optimizer,
    storage::TensorList,
    tensor::{Shape, Tensor},
};

/// A layer of a `Network`.
#[derive(Debug, Clone)]
pub enum Layer {
    Input(Input),
    Dense(Dense),
    Activation(Activation),
    Dropout(Dropout),
    Flatten(Flatten),
}

impl Layer {
    /// Creates a new layer from its description.
    ///
    /// # Arguments
    /// * `index` - The position of the layer in its network, used for error reporting.
    /// * `desc` - The description of the layer.
    /// * `prev` - The output shape of the previous layer, `None` for the first layer.
    /// * `training_mode` - Whether the layer will be trained.
    /// * `rng` - The generator used to initialize the parameters.
    ///
    /// # Returns
    /// The new layer or a construction error if `desc` doesn't fit after `prev`.
    pub fn create<R: Rng + ?Sized>(
        index: usize,
        desc: &LayerDesc,
        prev: Option<Shape>,
        training_mode: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let fail = |reason: String| Err(MlErr::construction(index, reason));

        let layer = match (*desc, prev) {
            (LayerDesc::Input { shape }, None) => {
                if shape.size() == 0 {
                    return fail(format!("the input shape {shape} holds no elements"));
                }

                Self::Input(Input::new(shape))
            }
            (LayerDesc::Input { .. }, Some(_)) => {
                return fail("only the first layer can be an input layer".into());
            }
            (_, None) => return fail("the first layer must be an input layer".into()),
            (LayerDesc::Dense { size }, Some(prev)) => {
                if size == 0 {
                    return fail("a dense layer needs at least one neuron".into());
                }

                if prev.height != 1 || prev.depth != 1 {
                    return fail(format!(
                        "a dense layer takes row vectors but the previous layer outputs {prev}"
                    ));
                }

                Self::Dense(Dense::new(prev.width, size, training_mode, rng))
            }
            (LayerDesc::Activation { act_fn }, Some(prev)) => {
                Self::Activation(Activation::new(prev, act_fn, training_mode))
            }
            (LayerDesc::Dropout { rate }, Some(prev)) => {
                match Dropout::new(prev, rate, training_mode) {
                    Ok(dropout) => Self::Dropout(dropout),
                    Err(e) => return fail(e.to_string()),
                }
            }
            (LayerDesc::Flatten, Some(prev)) => Self::Flatten(Flatten::new(prev)),
        };

        Ok(layer)
    }

    /// The description this layer can be rebuilt from.
    pub fn desc(&self) -> LayerDesc {
        match self {
            Self::Input(l) => LayerDesc::Input { shape: l.shape() },
            Self::Dense(l) => LayerDesc::Dense { size: l.size() },
            Self::Activation(l) => LayerDesc::Activation { act_fn: l.act_fn() },
            Self::Dropout(l) => LayerDesc::Dropout { rate: l.rate() },
            Self::Flatten(_) => LayerDesc::Flatten,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Dense(_) => "dense",
            Self::Activation(_) => "activation",
            Self::Dropout(_) => "dropout",
            Self::Flatten(_) => "flatten",
        }
    }

    pub fn input_shape(&self) -> Shape {
        match self {
            Self::Input(l) => l.shape(),
            Self::Dense(l) => l.input_shape(),
            Self::Activation(l) => l.shape(),
            Self::Dropout(l) => l.shape(),
            Self::Flatten(l) => l.input_shape(),
        }
    }

    pub fn output_shape(&self) -> Shape {
        match self {
            Self::Input(l) => l.shape(),
            Self::Dense(l) => l.output_shape(),
            Self::Activation(l) => l.shape(),
            Self::Dropout(l) => l.shape(),
            Self::Flatten(l) => l.output_shape(),
        }
    }

    /// The amount of trainable parameters.
    pub fn param_count(&self) -> usize {
        match self {
            Self::Dense(l) => l.param_count(),
            _ => 0,
        }
    }

    /// The shapes of the gradient buffers `backprop` expects, empty for stateless layers.
    pub fn grad_shapes(&self) -> Vec<Shape> {
        match self {
            Self::Dense(l) => l.grad_shapes().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Runs the layer on `x` in place.
    ///
    /// # Arguments
    /// * `x` - The layer input, replaced by the layer output.
    /// * `cache` - Where to store what `backprop` will need, `None` for inference.
    pub fn feedforward(&self, x: &mut Tensor, cache: Option<&mut ActivationCache>) -> Result<()> {
        match self {
            Self::Input(l) => l.feedforward(x),
            Self::Dense(l) => l.feedforward(x, cache),
            Self::Activation(l) => l.feedforward(x, cache),
            Self::Dropout(l) => l.feedforward(x, cache),
            Self::Flatten(l) => l.feedforward(x),
        }
    }

    /// Turns `delta` from the gradient with respect to the output into the gradient with
    /// respect to the input, adding the parameter gradients to `grads`.
    pub fn backprop(
        &self,
        delta: &mut Tensor,
        cache: &mut ActivationCache,
        grads: &mut [Tensor],
    ) -> Result<()> {
        match self {
            Self::Input(_) => Ok(()),
            Self::Dense(l) => l.backprop(delta, cache, grads),
            Self::Activation(l) => l.backprop(delta, cache),
            Self::Dropout(l) => l.backprop(delta, cache),
            Self::Flatten(l) => l.backprop(delta),
        }
    }

    /// Adds gradients computed by `backprop` to the layer's accumulators.
    pub fn accumulate(&mut self, grads: &[Tensor]) -> Result<()> {
        match self {
            Self::Dense(l) => l.accumulate(grads),
            _ => Ok(()),
        }
    }

    /// Updates the parameters with the accumulated gradients and zeroes them.
    pub fn apply_changes<O>(&mut self, optimizer: &O) -> Result<()>
    where
        O: Optimizer + ?Sized,
    {
        match self {
            Self::Dense(l) => l.apply_changes(optimizer),
            _ => Ok(()),
        }
    }

    pub fn save(&self, list: &mut TensorList, index: usize) {
        if let Self::Dense(l) = self {
            l.save(list, index);
        }
    }

    pub fn load(&mut self, list: &TensorList, index: usize) -> Result<()> {
        match self {
            Self::Dense(l) => l.load(list, index),
            _ => Ok(()),
        }
    }
}
