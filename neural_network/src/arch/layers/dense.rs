use rand::Rng;
use rand_distr::Distribution;

use super::ActivationCache;
use crate::{
    MlErr, Result,
    initialization::PolarNormal,
    optimization::{Optimizer, ParamChange},
    storage::TensorList,
    tensor::{Shape, Tensor},
};

/// The gradient accumulators of a dense layer, present only in training mode.
#[derive(Debug, Clone)]
struct DenseChanges {
    weight: ParamChange,
    bias: ParamChange,
}

/// A fully connected layer, `y = x · W + b` for a row vector `x`.
///
/// Keeps a transposed copy of `W` for the backward pass, refreshed on every parameter change.
#[derive(Debug, Clone)]
pub struct Dense {
    input_size: usize,
    size: usize,
    weight: Tensor,
    bias: Tensor,
    weight_t: Tensor,
    changes: Option<DenseChanges>,
}

impl Dense {
    /// Creates a new `Dense` layer with random weights and zeroed biases.
    ///
    /// # Arguments
    /// * `input_size` - The width of the incoming row vectors.
    /// * `size` - The amount of neurons, the width of the output.
    /// * `training_mode` - Whether to allocate the gradient accumulators.
    /// * `rng` - The generator the weights are drawn from.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        training_mode: bool,
        rng: &mut R,
    ) -> Self {
        let weight_shape = Shape::d2(size, input_size);
        let bias_shape = Shape::d1(size);

        let scale = 1. / (size as f32).sqrt();
        let mut weight = Tensor::new(weight_shape);
        for w in weight.as_mut_slice() {
            *w = PolarNormal.sample(rng) * scale;
        }

        let mut dense = Self {
            input_size,
            size,
            weight,
            bias: Tensor::new(bias_shape),
            weight_t: Tensor::new(weight_shape.transposed()),
            changes: training_mode.then(|| DenseChanges {
                weight: ParamChange::new(weight_shape),
                bias: ParamChange::new(bias_shape),
            }),
        };

        dense.refresh_transpose();
        dense
    }

    pub fn input_shape(&self) -> Shape {
        Shape::d1(self.input_size)
    }

    pub fn output_shape(&self) -> Shape {
        Shape::d1(self.size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// The amount of trainable parameters of this layer.
    pub fn param_count(&self) -> usize {
        self.weight.size() + self.bias.size()
    }

    /// The shapes of the gradients `backprop` writes to, weight first.
    pub fn grad_shapes(&self) -> [Shape; 2] {
        [self.weight.shape(), self.bias.shape()]
    }

    /// The accumulated gradients, if the layer was built for training.
    pub fn changes(&self) -> Option<[&ParamChange; 2]> {
        self.changes
            .as_ref()
            .map(|changes| [&changes.weight, &changes.bias])
    }

    pub fn feedforward(&self, x: &mut Tensor, cache: Option<&mut ActivationCache>) -> Result<()> {
        if x.shape() != self.input_shape() {
            return Err(MlErr::ShapeMismatch {
                what: "dense feedforward",
                got: x.shape(),
                expected: self.input_shape(),
            });
        }

        if let Some(cache) = cache {
            if self.changes.is_some() {
                cache.push(x.clone());
            }
        }

        x.dot_ip(&self.weight)?;
        x.add_ip(&self.bias)
    }

    /// Turns `delta` into the gradient with respect to this layer's input.
    ///
    /// # Arguments
    /// * `delta` - The gradient with respect to this layer's output.
    /// * `cache` - The cache the matching `feedforward` pushed the input to.
    /// * `grads` - The weight and bias gradients to add this sample's contribution to.
    pub fn backprop(
        &self,
        delta: &mut Tensor,
        cache: &mut ActivationCache,
        grads: &mut [Tensor],
    ) -> Result<()> {
        let len = grads.len();
        let [weight_grad, bias_grad] = grads else {
            return Err(MlErr::SizeMismatch {
                what: "dense gradients",
                got: len,
                expected: 2,
            });
        };

        if delta.shape() != self.output_shape() {
            return Err(MlErr::ShapeMismatch {
                what: "dense backprop",
                got: delta.shape(),
                expected: self.output_shape(),
            });
        }

        let mut input = cache.pop("dense")?;
        input.transpose();

        weight_grad.add_ip(&input.dot(delta)?)?;
        bias_grad.add_ip(delta)?;
        delta.dot_ip(&self.weight_t)
    }

    /// Adds a worker's gradients to the accumulators.
    pub fn accumulate(&mut self, grads: &[Tensor]) -> Result<()> {
        let len = grads.len();
        let [weight_grad, bias_grad] = grads else {
            return Err(MlErr::SizeMismatch {
                what: "dense gradients",
                got: len,
                expected: 2,
            });
        };

        if let Some(changes) = &mut self.changes {
            changes.weight.accumulate(weight_grad)?;
            changes.bias.accumulate(bias_grad)?;
        }

        Ok(())
    }

    pub fn apply_changes<O>(&mut self, optimizer: &O) -> Result<()>
    where
        O: Optimizer + ?Sized,
    {
        let Some(changes) = &mut self.changes else {
            return Ok(());
        };

        changes.weight.apply(optimizer, &mut self.weight)?;
        changes.bias.apply(optimizer, &mut self.bias)?;
        self.refresh_transpose();
        Ok(())
    }

    pub fn save(&self, list: &mut TensorList, index: usize) {
        list.insert(format!("weight_{index}"), self.weight.clone());
        list.insert(format!("bias_{index}"), self.bias.clone());
    }

    /// Replaces the parameters with `weight_<index>` and `bias_<index>` from `list`.
    ///
    /// # Returns
    /// An error if a tensor is missing or has the wrong shape, in which case nothing changes.
    pub fn load(&mut self, list: &TensorList, index: usize) -> Result<()> {
        let weight = list.get(&format!("weight_{index}"))?;
        let bias = list.get(&format!("bias_{index}"))?;

        for (what, got, expected) in [
            ("dense weight", weight.shape(), self.weight.shape()),
            ("dense bias", bias.shape(), self.bias.shape()),
        ] {
            if got != expected {
                return Err(MlErr::ShapeMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }

        self.weight = weight.clone();
        self.bias = bias.clone();
        self.refresh_transpose();
        Ok(())
    }

    fn refresh_transpose(&mut self) {
        self.weight_t = self.weight.clone();
        self.weight_t.transpose();
    }
}
