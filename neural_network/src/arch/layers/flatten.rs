use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// Reshapes its input into a row vector without touching the data.
#[derive(Debug, Clone)]
pub struct Flatten {
    input_shape: Shape,
}

impl Flatten {
    pub fn new(input_shape: Shape) -> Self {
        Self { input_shape }
    }

    pub fn input_shape(&self) -> Shape {
        self.input_shape
    }

    pub fn output_shape(&self) -> Shape {
        Shape::d1(self.input_shape.size())
    }

    pub fn feedforward(&self, x: &mut Tensor) -> Result<()> {
        if x.shape() != self.input_shape {
            return Err(MlErr::ShapeMismatch {
                what: "flatten feedforward",
                got: x.shape(),
                expected: self.input_shape,
            });
        }

        x.reshape_ip(self.output_shape())
    }

    pub fn backprop(&self, delta: &mut Tensor) -> Result<()> {
        if delta.shape() != self.output_shape() {
            return Err(MlErr::ShapeMismatch {
                what: "flatten backprop",
                got: delta.shape(),
                expected: self.output_shape(),
            });
        }

        delta.reshape_ip(self.input_shape)
    }
}
