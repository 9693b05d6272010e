mod layout;
mod training;

pub use layout::LayoutSpec;
pub use training::{OptimizerSpec, TrainConfig};
