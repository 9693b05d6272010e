use std::{fs, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    arch::{Network, layers::LayerDesc},
};

/// The specification for the layers of a `Network`.
///
/// ```json
/// { "layers": [ { "input": { "shape": { "width": 2 } } }, { "dense": { "size": 1 } } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LayoutSpec {
    pub layers: Vec<LayerDesc>,
}

impl LayoutSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON layout from the file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Builds the `Network` this layout describes.
    pub fn build<R: Rng + ?Sized>(&self, training_mode: bool, rng: &mut R) -> Result<Network> {
        Network::new(&self.layers, training_mode, rng)
    }
}
