use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, tensor::Tensor};

const LEAKY_RELU_SLOPE: f32 = 0.01;

/// The nonlinearities an activation layer can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFn {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
    /// Normalizes the whole tensor into a probability distribution.
    Softmax,
}
use ActFn::*;

impl ActFn {
    /// Applies the function to every element of `x`.
    pub fn forward(&self, x: &mut Tensor) {
        match self {
            Linear => {}
            Sigmoid => x.map_ip(sigmoid),
            Tanh => x.map_ip(f32::tanh),
            Relu => x.map_ip(|z| z.max(0.)),
            LeakyRelu => x.map_ip(|z| if z > 0. { z } else { LEAKY_RELU_SLOPE * z }),
            Softmax => softmax(x),
        }
    }

    /// Multiplies `delta` by the derivative of the function evaluated at `input`.
    ///
    /// # Arguments
    /// * `input` - The tensor the function was applied to in the forward pass.
    /// * `delta` - The gradient with respect to the function's output.
    ///
    /// # Returns
    /// An error if the shapes of `input` and `delta` differ.
    pub fn backward(&self, input: &Tensor, delta: &mut Tensor) -> Result<()> {
        if input.shape() != delta.shape() {
            return Err(MlErr::ShapeMismatch {
                what: "activation backprop",
                got: delta.shape(),
                expected: input.shape(),
            });
        }

        if let Softmax = self {
            let mut s = input.clone();
            softmax(&mut s);

            let dot: f32 = delta
                .as_slice()
                .iter()
                .zip(s.as_slice())
                .map(|(d, s)| d * s)
                .sum();

            delta
                .as_mut_slice()
                .iter_mut()
                .zip(s.as_slice())
                .for_each(|(d, &s)| *d = s * (*d - dot));

            return Ok(());
        }

        let pairs = delta.as_mut_slice().iter_mut().zip(input.as_slice());

        match self {
            Linear | Softmax => {}
            Sigmoid => pairs.for_each(|(d, &z)| {
                let s = sigmoid(z);
                *d *= s * (1. - s);
            }),
            Tanh => pairs.for_each(|(d, &z)| *d *= 1. - z.tanh().powi(2)),
            Relu => pairs.for_each(|(d, &z)| {
                if z <= 0. {
                    *d = 0.;
                }
            }),
            LeakyRelu => pairs.for_each(|(d, &z)| {
                if z <= 0. {
                    *d *= LEAKY_RELU_SLOPE;
                }
            }),
        }

        Ok(())
    }
}

impl Display for ActFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Linear => "linear",
            Sigmoid => "sigmoid",
            Tanh => "tanh",
            Relu => "relu",
            LeakyRelu => "leaky_relu",
            Softmax => "softmax",
        };

        f.write_str(name)
    }
}

fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

fn softmax(x: &mut Tensor) {
    let max = x.as_slice().iter().copied().fold(f32::NEG_INFINITY, f32::max);
    x.map_ip(|z| (z - max).exp());

    let sum = x.sum();
    if sum > 0. {
        x.scale_ip(1. / sum);
    }
}
