pub mod activations;
pub mod cost;
mod gradients;
pub mod layers;
mod network;

pub use gradients::Gradients;
pub use network::Network;
