mod cost;
mod cross_entropy;
mod mse;

pub use cost::{Cost, CostFn};
pub use cross_entropy::CrossEntropy;
pub use mse::Mse;
