use serde::{Deserialize, Serialize};

use crate::{arch::activations::ActFn, tensor::Shape};

/// The construction parameters of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerDesc {
    Input { shape: Shape },
    Dense { size: usize },
    Activation { act_fn: ActFn },
    Dropout { rate: f32 },
    Flatten,
}

impl LayerDesc {
    pub fn input(shape: Shape) -> Self {
        Self::Input { shape }
    }

    pub fn dense(size: usize) -> Self {
        Self::Dense { size }
    }

    pub fn activation(act_fn: ActFn) -> Self {
        Self::Activation { act_fn }
    }

    pub fn dropout(rate: f32) -> Self {
        Self::Dropout { rate }
    }
}
