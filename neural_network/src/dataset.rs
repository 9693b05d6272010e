use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// A set of training samples, stored as two tensors with one sample per depth channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Tensor,
    outputs: Tensor,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `inputs` - The sample inputs, the channel `i` being the input of the sample `i`.
    /// * `outputs` - The expected outputs, laid out as `inputs`.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the amount of inputs and outputs differ.
    pub fn new(inputs: Tensor, outputs: Tensor) -> Result<Self> {
        let (got, expected) = (outputs.shape().depth, inputs.shape().depth);
        if got != expected {
            return Err(MlErr::SizeMismatch {
                what: "dataset samples",
                got,
                expected,
            });
        }

        Ok(Self { inputs, outputs })
    }

    /// Creates a new `Dataset` of row vector samples from flat buffers.
    ///
    /// # Arguments
    /// * `input_size` - The amount of values of each input.
    /// * `inputs` - Every input, one after the other.
    /// * `output_size` - The amount of values of each expected output.
    /// * `outputs` - Every expected output, one after the other.
    pub fn from_flat(
        input_size: usize,
        inputs: Vec<f32>,
        output_size: usize,
        outputs: Vec<f32>,
    ) -> Result<Self> {
        let len = inputs.len() / input_size.max(1);
        let inputs = Tensor::from_vec(Shape::new(input_size, 1, len), inputs)?;
        let outputs = Tensor::from_vec(Shape::new(output_size, 1, len), outputs)?;
        Self::new(inputs, outputs)
    }

    pub fn len(&self) -> usize {
        self.inputs.shape().depth
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    pub fn outputs(&self) -> &Tensor {
        &self.outputs
    }

    /// The amount of values of a single input.
    pub fn input_size(&self) -> usize {
        let Shape { width, height, .. } = self.inputs.shape();
        width * height
    }

    /// The amount of values of a single expected output.
    pub fn output_size(&self) -> usize {
        let Shape { width, height, .. } = self.outputs.shape();
        width * height
    }

    /// Copies the sample `i` out of the dataset.
    ///
    /// # Returns
    /// The input and the expected output, or an error if `i` is out of bounds.
    pub fn sample(&self, i: usize) -> Result<(Tensor, Tensor)> {
        Ok((self.inputs.depth_slice(i)?, self.outputs.depth_slice(i)?))
    }
}
