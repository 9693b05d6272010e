use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use safetensors::{Dtype, SafeTensors, tensor::TensorView};

use crate::{
    MlErr, Result,
    tensor::{Shape, Tensor},
};

/// The free form string metadata stored in a tensor file's header.
pub type Metadata = HashMap<String, String>;

/// A named collection of tensors, stored on disk in the safetensors format.
///
/// Every tensor is written as `F32` with the dimensions `[depth, height, width]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorList {
    tensors: BTreeMap<String, Tensor>,
}

impl TensorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tensor` under `name`, replacing any previous tensor with that name.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.tensors.insert(name.into(), tensor);
    }

    /// Gets the tensor named `name`.
    ///
    /// # Returns
    /// The tensor or `MlErr::MissingTensor` if there's none with that name.
    pub fn get(&self, name: &str) -> Result<&Tensor> {
        self.tensors.get(name).ok_or_else(|| MlErr::MissingTensor {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.tensors.iter().map(|(name, tensor)| (name.as_str(), tensor))
    }

    /// Serializes the list and its `metadata`.
    ///
    /// # Returns
    /// The safetensors encoded bytes or an error if the encoding fails.
    pub fn to_bytes(&self, metadata: Option<Metadata>) -> Result<Vec<u8>> {
        let views = self
            .tensors
            .iter()
            .map(|(name, tensor)| {
                let Shape {
                    width,
                    height,
                    depth,
                } = tensor.shape();

                let bytes = bytemuck::cast_slice(tensor.as_slice());
                TensorView::new(Dtype::F32, vec![depth, height, width], bytes)
                    .map(|view| (name.as_str(), view))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(safetensors::serialize(views, &metadata)?)
    }

    /// Deserializes a list previously encoded with `to_bytes`.
    ///
    /// # Returns
    /// The list and the header metadata, or an error if the bytes are not a valid `F32` rank 3
    /// tensor file.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, Metadata)> {
        let (_, header) = SafeTensors::read_metadata(bytes)?;
        let metadata = header.metadata().clone().unwrap_or_default();
        let file = SafeTensors::deserialize(bytes)?;

        let mut list = Self::new();
        for (name, view) in file.tensors() {
            if view.dtype() != Dtype::F32 {
                return Err(MlErr::InvalidFile {
                    reason: format!("tensor {name:?} has dtype {:?}, expected F32", view.dtype()),
                });
            }

            let &[depth, height, width] = view.shape() else {
                return Err(MlErr::InvalidFile {
                    reason: format!("tensor {name:?} has rank {}, expected 3", view.shape().len()),
                });
            };

            let data = view
                .data()
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();

            let tensor = Tensor::from_vec(Shape::new(width, height, depth), data)?;
            list.insert(name, tensor);
        }

        Ok((list, metadata))
    }

    /// Writes the list and its `metadata` to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, metadata: Option<Metadata>) -> Result<()> {
        let bytes = self.to_bytes(metadata)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Reads a list and its metadata from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Metadata)> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
