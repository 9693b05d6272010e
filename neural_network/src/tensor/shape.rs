use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

fn one() -> usize {
    1
}

/// The dimensions of a `Tensor`, `width` being the fastest-varying index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub width: usize,
    #[serde(default = "one")]
    pub height: usize,
    #[serde(default = "one")]
    pub depth: usize,
}

impl Shape {
    /// Creates a new `Shape`.
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A row vector of `width` elements.
    pub const fn d1(width: usize) -> Self {
        Self::new(width, 1, 1)
    }

    /// A single-channel matrix with `height` rows and `width` columns.
    pub const fn d2(width: usize, height: usize) -> Self {
        Self::new(width, height, 1)
    }

    /// Returns the amount of elements a tensor of this shape holds.
    pub const fn size(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// The same shape with `width` and `height` swapped.
    pub const fn transposed(&self) -> Self {
        Self::new(self.height, self.width, self.depth)
    }

    /// The `ndarray` dimension of a single channel, `(rows, cols)`.
    pub(crate) const fn matrix_dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.width, self.height, self.depth)
    }
}
