use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use safetensors::SafeTensorError;

use crate::tensor::Shape;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    ShapeMismatch {
        what: &'static str,
        got: Shape,
        expected: Shape,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
    CacheUnderflow {
        layer: &'static str,
    },
    MissingTensor {
        name: String,
    },
    InvalidHyperparameter {
        what: &'static str,
        value: f32,
    },
    Construction {
        layer: usize,
        reason: String,
    },
    InvalidFile {
        reason: String,
    },
    NotTrainable,
    MissingTestSet,
    ThreadPool(rayon::ThreadPoolBuildError),
    SafeTensors(SafeTensorError),
    Json(serde_json::Error),
    Io(io::Error),
}

impl MlErr {
    /// Builds a construction error for the layer at `layer`.
    pub fn construction(layer: usize, reason: impl Into<String>) -> Self {
        Self::Construction {
            layer,
            reason: reason.into(),
        }
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a shape mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::IndexOutOfBounds { what, index, len } => {
                write!(f, "Index {index} is out of bounds for {what} of length {len}")
            }
            MlErr::CacheUnderflow { layer } => write!(
                f,
                "The {layer} layer tried to pop from an empty activation cache"
            ),
            MlErr::MissingTensor { name } => {
                write!(f, "The tensor list has no tensor named {name:?}")
            }
            MlErr::InvalidHyperparameter { what, value } => {
                write!(f, "Invalid value {value} for {what}")
            }
            MlErr::Construction { layer, reason } => {
                write!(f, "Failed to construct layer {layer}: {reason}")
            }
            MlErr::InvalidFile { reason } => write!(f, "Invalid tensor file: {reason}"),
            MlErr::NotTrainable => {
                write!(f, "The network was not built in training mode")
            }
            MlErr::MissingTestSet => {
                write!(f, "Accuracy testing was requested without a test dataset")
            }
            MlErr::ThreadPool(e) => write!(f, "thread pool error: {e}"),
            MlErr::SafeTensors(e) => write!(f, "safetensors error: {e}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::ThreadPool(e) => Some(e),
            MlErr::SafeTensors(e) => Some(e),
            MlErr::Json(e) => Some(e),
            MlErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SafeTensorError> for MlErr {
    fn from(value: SafeTensorError) -> Self {
        Self::SafeTensors(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<rayon::ThreadPoolBuildError> for MlErr {
    fn from(value: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(value)
    }
}
