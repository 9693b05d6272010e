use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// The first layer of every network, it only declares the expected input shape.
#[derive(Debug, Clone)]
pub struct Input {
    shape: Shape,
}

impl Input {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn feedforward(&self, x: &mut Tensor) -> Result<()> {
        if x.shape() != self.shape {
            return Err(MlErr::ShapeMismatch {
                what: "input layer",
                got: x.shape(),
                expected: self.shape,
            });
        }

        Ok(())
    }
}
