use rand::rngs::StdRng;

use crate::{MlErr, Result, tensor::Tensor};

/// The values a training step carries from the forward pass to the backward pass.
///
/// Layers push during `feedforward` and pop in reverse order during `backprop`. A cache is
/// owned by a single worker together with the generator its dropout layers draw from.
pub struct ActivationCache {
    tensors: Vec<Tensor>,
    rng: StdRng,
}

impl ActivationCache {
    /// Creates a new empty `ActivationCache`.
    ///
    /// # Arguments
    /// * `rng` - The generator used by the layers that need randomness while training.
    pub fn new(rng: StdRng) -> Self {
        Self {
            tensors: Vec::new(),
            rng,
        }
    }

    pub fn push(&mut self, tensor: Tensor) {
        self.tensors.push(tensor);
    }

    /// Pops the last pushed tensor.
    ///
    /// # Arguments
    /// * `layer` - The name of the popping layer, used for error reporting.
    pub fn pop(&mut self, layer: &'static str) -> Result<Tensor> {
        self.tensors.pop().ok_or(MlErr::CacheUnderflow { layer })
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Drops every cached tensor, keeping the allocated capacity for the next step.
    pub fn clear(&mut self) {
        self.tensors.clear();
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{initialization::seeded_rng, tensor::Shape};

    #[test]
    fn pops_in_reverse_order() {
        let mut cache = ActivationCache::new(seeded_rng(Some(0)));
        cache.push(Tensor::filled(Shape::d1(1), 1.));
        cache.push(Tensor::filled(Shape::d1(1), 2.));

        assert_eq!(cache.pop("test").unwrap().as_slice(), &[2.]);
        assert_eq!(cache.pop("test").unwrap().as_slice(), &[1.]);
        assert!(matches!(
            cache.pop("test"),
            Err(MlErr::CacheUnderflow { layer: "test" })
        ));
    }
}
