mod activation;
mod cache;
mod dense;
mod desc;
mod dropout;
mod flatten;
mod input;
mod layer;

pub use activation::Activation;
pub use cache::ActivationCache;
pub use dense::Dense;
pub use desc::LayerDesc;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use input::Input;
pub use layer::Layer;
