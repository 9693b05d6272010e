use std::{
    fmt::{self, Display},
    path::Path,
};

use log::debug;
use rand::Rng;

use super::{
    Gradients,
    layers::{ActivationCache, Layer, LayerDesc},
};
use crate::{
    MlErr, Result,
    initialization::seeded_rng,
    optimization::Optimizer,
    storage::{Metadata, TensorList},
    tensor::{Shape, Tensor},
};

/// The metadata key the layout of a saved network is stored under.
const LAYOUT_KEY: &str = "layout";

/// A feedforward neural network, an ordered sequence of layers starting with an input layer.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    training_mode: bool,
}

impl Network {
    /// Creates a new `Network`.
    ///
    /// # Arguments
    /// * `descs` - The description of every layer, the first one must be an input layer.
    /// * `training_mode` - Whether the network will be trained, which allocates the gradient
    ///   accumulators and makes the layers cache their activations.
    /// * `rng` - The generator used to initialize the parameters.
    ///
    /// # Returns
    /// The new network or a construction error naming the offending layer.
    pub fn new<R: Rng + ?Sized>(
        descs: &[LayerDesc],
        training_mode: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if descs.is_empty() {
            return Err(MlErr::construction(0, "a network needs at least one layer"));
        }

        let mut layers: Vec<Layer> = Vec::with_capacity(descs.len());
        for (i, desc) in descs.iter().enumerate() {
            let prev = layers.last().map(Layer::output_shape);
            let layer = Layer::create(i, desc, prev, training_mode, rng)?;
            debug!(
                layer = i,
                kind = layer.name();
                "created layer with output {}",
                layer.output_shape()
            );
            layers.push(layer);
        }

        Ok(Self {
            layers,
            training_mode,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn training_mode(&self) -> bool {
        self.training_mode
    }

    pub fn input_shape(&self) -> Shape {
        self.layers[0].input_shape()
    }

    pub fn output_shape(&self) -> Shape {
        self.layers[self.layers.len() - 1].output_shape()
    }

    /// The total amount of trainable parameters.
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Layer::param_count).sum()
    }

    /// The descriptions this network can be rebuilt from.
    pub fn layout(&self) -> Vec<LayerDesc> {
        self.layers.iter().map(Layer::desc).collect()
    }

    /// Runs the network on `input` without caching anything.
    ///
    /// # Arguments
    /// * `input` - A tensor with as many elements as the input layer, reshaped to its shape.
    ///
    /// # Returns
    /// The output of the last layer or an error if `input` has the wrong size.
    pub fn feedforward(&self, input: &Tensor) -> Result<Tensor> {
        let mut x = input.clone().reshape(self.input_shape())?;
        for layer in &self.layers {
            layer.feedforward(&mut x, None)?;
        }

        Ok(x)
    }

    /// Runs the network on `x` in place, caching what `backprop` needs.
    pub(crate) fn feedforward_cached(
        &self,
        x: &mut Tensor,
        cache: &mut ActivationCache,
    ) -> Result<()> {
        x.reshape_ip(self.input_shape())?;
        for layer in &self.layers {
            layer.feedforward(x, Some(cache))?;
        }

        Ok(())
    }

    /// Propagates `delta`, the cost gradient with respect to the output, through every layer in
    /// reverse, adding the parameter gradients to `grads`.
    pub(crate) fn backprop(
        &self,
        delta: &mut Tensor,
        cache: &mut ActivationCache,
        grads: &mut Gradients,
    ) -> Result<()> {
        for (i, layer) in self.layers.iter().enumerate().rev() {
            layer.backprop(delta, cache, grads.layer_mut(i))?;
        }

        Ok(())
    }

    /// Adds a worker's gradients to the layers' accumulators.
    pub fn accumulate(&mut self, grads: &Gradients) -> Result<()> {
        for (layer, grads) in self.layers.iter_mut().zip(grads.iter()) {
            layer.accumulate(grads)?;
        }

        Ok(())
    }

    /// Updates every layer with its accumulated gradients.
    pub fn apply_changes<O>(&mut self, optimizer: &O) -> Result<()>
    where
        O: Optimizer + ?Sized,
    {
        for layer in &mut self.layers {
            layer.apply_changes(optimizer)?;
        }

        Ok(())
    }

    /// Copies every trainable tensor into a new list, named after its layer index.
    pub fn save_params(&self) -> TensorList {
        let mut list = TensorList::new();
        for (i, layer) in self.layers.iter().enumerate() {
            layer.save(&mut list, i);
        }

        list
    }

    /// Replaces the parameters with the ones in `list`.
    ///
    /// # Returns
    /// An error if a tensor is missing or doesn't fit, in which case no layer changes.
    pub fn load_params(&mut self, list: &TensorList) -> Result<()> {
        let mut layers = self.layers.clone();
        for (i, layer) in layers.iter_mut().enumerate() {
            layer.load(list, i)?;
        }

        self.layers = layers;
        Ok(())
    }

    /// Writes the layout and parameters of this network to a safetensors file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let layout = serde_json::to_string(&self.layout())?;
        let metadata = Metadata::from([(LAYOUT_KEY.to_string(), layout)]);
        self.save_params().save(path, Some(metadata))
    }

    /// Rebuilds a network saved with `save`.
    ///
    /// # Arguments
    /// * `path` - The file to read.
    /// * `training_mode` - Whether the loaded network will be trained further.
    pub fn load<P: AsRef<Path>>(path: P, training_mode: bool) -> Result<Self> {
        let (list, metadata) = TensorList::load(path)?;
        let layout = metadata.get(LAYOUT_KEY).ok_or_else(|| MlErr::InvalidFile {
            reason: format!("the header has no {LAYOUT_KEY:?} entry"),
        })?;

        let descs: Vec<LayerDesc> = serde_json::from_str(layout)?;
        let mut network = Self::new(&descs, training_mode, &mut seeded_rng(Some(0)))?;
        network.load_params(&list)?;
        Ok(network)
    }

    /// A table with every layer, its output shape and its amount of parameters.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6}{:<12}{:<20}{:>10}", "#", "layer", "output shape", "params")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "{:<6}{:<12}{:<20}{:>10}",
                i,
                layer.name(),
                layer.output_shape().to_string(),
                layer.param_count()
            )?;
        }

        write!(f, "total params: {}", self.param_count())
    }
}
