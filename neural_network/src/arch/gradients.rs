use super::Network;
use crate::{MlErr, Result, tensor::Tensor};

/// The parameter gradients a worker accumulates over its share of a batch.
///
/// Holds one buffer per trainable tensor, grouped by layer in network order.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    layers: Vec<Vec<Tensor>>,
}

impl Gradients {
    /// Creates zeroed gradient buffers matching `network`.
    pub fn new(network: &Network) -> Self {
        let layers = network
            .layers()
            .iter()
            .map(|layer| layer.grad_shapes().into_iter().map(Tensor::new).collect())
            .collect();

        Self { layers }
    }

    pub fn layer(&self, index: usize) -> &[Tensor] {
        match self.layers.get(index) {
            Some(grads) => grads,
            None => &[],
        }
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut [Tensor] {
        match self.layers.get_mut(index) {
            Some(grads) => grads,
            None => &mut [],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Tensor]> {
        self.layers.iter().map(Vec::as_slice)
    }

    /// Adds `other` to these gradients element by element.
    ///
    /// # Returns
    /// An error if `other` doesn't have the same layout, in which case nothing changes.
    pub fn add(&mut self, other: &Gradients) -> Result<()> {
        if self.layers.len() != other.layers.len() {
            return Err(MlErr::SizeMismatch {
                what: "gradient layers",
                got: other.layers.len(),
                expected: self.layers.len(),
            });
        }

        for (dst, src) in self.layers.iter().zip(&other.layers) {
            if dst.len() != src.len() {
                return Err(MlErr::SizeMismatch {
                    what: "layer gradients",
                    got: src.len(),
                    expected: dst.len(),
                });
            }

            for (dst, src) in dst.iter().zip(src) {
                if dst.shape() != src.shape() {
                    return Err(MlErr::ShapeMismatch {
                        what: "gradient add",
                        got: src.shape(),
                        expected: dst.shape(),
                    });
                }
            }
        }

        for (dst, src) in self.layers.iter_mut().flatten().zip(other.layers.iter().flatten()) {
            dst.add_ip(src)?;
        }

        Ok(())
    }

    /// Sets every gradient to zero.
    pub fn zero(&mut self) {
        self.layers.iter_mut().flatten().for_each(|grad| grad.fill(0.));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arch::layers::LayerDesc,
        initialization::seeded_rng,
        tensor::Shape,
    };

    fn network(hidden: usize) -> Network {
        let descs = [
            LayerDesc::input(Shape::d1(3)),
            LayerDesc::dense(hidden),
            LayerDesc::dense(2),
        ];
        Network::new(&descs, true, &mut seeded_rng(Some(0))).unwrap()
    }

    #[test]
    fn add_sums_matching_buffers() {
        let net = network(4);
        let mut a = Gradients::new(&net);
        let mut b = Gradients::new(&net);
        b.layer_mut(2)[1].fill(1.5);

        a.add(&b).unwrap();
        a.add(&b).unwrap();

        assert!(a.layer(2)[1].as_slice().iter().all(|&g| g == 3.));
        assert!(a.layer(1)[0].as_slice().iter().all(|&g| g == 0.));
    }

    #[test]
    fn add_leaves_buffers_untouched_on_mismatch() {
        let mut a = Gradients::new(&network(4));
        let mut b = Gradients::new(&network(5));
        b.layer_mut(1)[0].fill(1.);
        b.layer_mut(1)[1].fill(1.);
        let before = a.clone();

        assert!(matches!(a.add(&b), Err(MlErr::ShapeMismatch { .. })));
        assert_eq!(a, before);
    }
}
