pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod initialization;
pub mod optimization;
pub mod storage;
pub mod tensor;
mod test;
pub mod training;

pub use error::{MlErr, Result};
