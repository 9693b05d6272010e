use ndarray::{ArrayView2, ArrayView3, ArrayViewMut2, linalg};

use super::Shape;
use crate::{MlErr, Result};

/// A dense 3-D buffer of `f32` values.
///
/// The data is stored channel after channel, each channel row after row, so `width` is the
/// fastest-varying index. The amount of elements is fixed when the tensor is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new zeroed `Tensor`.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor.
    ///
    /// # Returns
    /// A new `Tensor` instance.
    pub fn new(shape: Shape) -> Self {
        Self::filled(shape, 0.)
    }

    /// Creates a new `Tensor` with every element set to `value`.
    pub fn filled(shape: Shape, value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.size()],
        }
    }

    /// Creates a new `Tensor` that takes ownership of `data`.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor.
    /// * `data` - The elements in row-major order, one channel after the other.
    ///
    /// # Returns
    /// A new `Tensor` or an error if `data` doesn't hold exactly `shape.size()` elements.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self> {
        if data.len() != shape.size() {
            return Err(MlErr::SizeMismatch {
                what: "tensor data",
                got: data.len(),
                expected: shape.size(),
            });
        }

        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns the element at column `x`, row `y` and channel `z`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        let Shape {
            width,
            height,
            depth,
        } = self.shape;

        if x >= width || y >= height || z >= depth {
            return None;
        }

        Some(self.data[x + y * width + z * width * height])
    }

    /// Copies the contents and shape of `src` into this tensor.
    ///
    /// # Returns
    /// An error if both tensors don't hold the same amount of elements.
    pub fn copy_from(&mut self, src: &Tensor) -> Result<()> {
        if self.size() != src.size() {
            return Err(MlErr::SizeMismatch {
                what: "tensor copy",
                got: src.size(),
                expected: self.size(),
            });
        }

        self.shape = src.shape;
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Adds `other` to this tensor element by element.
    ///
    /// # Returns
    /// An error if the shapes differ, in which case this tensor is left untouched.
    pub fn add_ip(&mut self, other: &Tensor) -> Result<()> {
        self.zip_ip("tensor add", other, |a, b| *a += b)
    }

    /// Allocating version of `add_ip`.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        let mut out = self.clone();
        out.add_ip(other)?;
        Ok(out)
    }

    /// Subtracts `other` from this tensor element by element.
    pub fn sub_ip(&mut self, other: &Tensor) -> Result<()> {
        self.zip_ip("tensor sub", other, |a, b| *a -= b)
    }

    /// Multiplies this tensor by `other` element by element.
    pub fn component_mul_ip(&mut self, other: &Tensor) -> Result<()> {
        self.zip_ip("tensor component mul", other, |a, b| *a *= b)
    }

    pub fn scale_ip(&mut self, factor: f32) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    pub fn map_ip<F>(&mut self, f: F)
    where
        F: Fn(f32) -> f32,
    {
        self.data.iter_mut().for_each(|x| *x = f(*x));
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Returns the flat index of the greatest element, the first one on ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &x) in self.data.iter().enumerate() {
            if x > self.data[best] {
                best = i;
            }
        }

        best
    }

    /// Computes the matrix product of this tensor and `other`, channel by channel.
    ///
    /// Each channel is read as a matrix of `height` rows and `width` columns.
    ///
    /// # Returns
    /// A tensor of shape `(other.width, self.height, depth)` or an error if
    /// `self.width != other.height` or the depths differ.
    pub fn dot(&self, other: &Tensor) -> Result<Tensor> {
        let (a, b) = (self.shape, other.shape);
        if a.width != b.height || a.depth != b.depth {
            return Err(MlErr::ShapeMismatch {
                what: "tensor dot",
                got: b,
                expected: Shape::new(b.width, a.width, a.depth),
            });
        }

        let mut out = Tensor::new(Shape::new(b.width, a.height, a.depth));
        for z in 0..a.depth {
            let lhs = self.channel(z)?;
            let rhs = other.channel(z)?;
            let mut dst = out.channel_mut(z)?;
            linalg::general_mat_mul(1., &lhs, &rhs, 0., &mut dst);
        }

        Ok(out)
    }

    /// Replaces this tensor with `self · other`.
    pub fn dot_ip(&mut self, other: &Tensor) -> Result<()> {
        *self = self.dot(other)?;
        Ok(())
    }

    /// Swaps `width` and `height`, reordering every channel's data accordingly.
    pub fn transpose(&mut self) {
        let Shape {
            width,
            height,
            depth,
        } = self.shape;

        // Vectors keep their memory order.
        if width > 1 && height > 1 {
            if let Ok(view) = ArrayView3::from_shape((depth, height, width), &self.data) {
                self.data = view.permuted_axes([0, 2, 1]).iter().copied().collect();
            }
        }

        self.shape = self.shape.transposed();
    }

    /// Consumes this tensor and returns one with the same data and a new shape.
    pub fn reshape(mut self, shape: Shape) -> Result<Tensor> {
        self.reshape_ip(shape)?;
        Ok(self)
    }

    /// Changes the shape of this tensor without touching its data.
    pub fn reshape_ip(&mut self, shape: Shape) -> Result<()> {
        if shape.size() != self.size() {
            return Err(MlErr::SizeMismatch {
                what: "tensor reshape",
                got: shape.size(),
                expected: self.size(),
            });
        }

        self.shape = shape;
        Ok(())
    }

    /// Copies the channel `z` into a new single-channel tensor.
    pub fn depth_slice(&self, z: usize) -> Result<Tensor> {
        let Shape {
            width,
            height,
            depth,
        } = self.shape;

        if z >= depth {
            return Err(MlErr::IndexOutOfBounds {
                what: "tensor depth",
                index: z,
                len: depth,
            });
        }

        let n = width * height;
        Tensor::from_vec(Shape::d2(width, height), self.data[z * n..(z + 1) * n].to_vec())
    }

    fn zip_ip<F>(&mut self, what: &'static str, other: &Tensor, f: F) -> Result<()>
    where
        F: Fn(&mut f32, f32),
    {
        if self.shape != other.shape {
            return Err(MlErr::ShapeMismatch {
                what,
                got: other.shape,
                expected: self.shape,
            });
        }

        self.data.iter_mut().zip(&other.data).for_each(|(a, &b)| f(a, b));
        Ok(())
    }

    fn channel(&self, z: usize) -> Result<ArrayView2<'_, f32>> {
        let dim = self.shape.matrix_dim();
        let n = dim.0 * dim.1;

        ArrayView2::from_shape(dim, &self.data[z * n..(z + 1) * n]).map_err(|_| {
            MlErr::SizeMismatch {
                what: "tensor channel",
                got: self.size(),
                expected: n * self.shape.depth,
            }
        })
    }

    fn channel_mut(&mut self, z: usize) -> Result<ArrayViewMut2<'_, f32>> {
        let dim = self.shape.matrix_dim();
        let n = dim.0 * dim.1;
        let len = self.size();
        let expected = n * self.shape.depth;

        ArrayViewMut2::from_shape(dim, &mut self.data[z * n..(z + 1) * n]).map_err(|_| {
            MlErr::SizeMismatch {
                what: "tensor channel",
                got: len,
                expected,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(width: usize, height: usize, data: &[f32]) -> Tensor {
        Tensor::from_vec(Shape::d2(width, height), data.to_vec()).unwrap()
    }

    #[test]
    fn new_is_zeroed() {
        let t = Tensor::new(Shape::new(2, 3, 2));
        assert_eq!(t.size(), 12);
        assert!(t.as_slice().iter().all(|&x| x == 0.));
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Tensor::from_vec(Shape::d1(3), vec![1., 2.]).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { got: 2, expected: 3, .. }));
    }

    #[test]
    fn add_zero_is_identity() {
        let a = matrix(3, 2, &[1., -2., 3., 4.5, 5., -6.]);
        let zero = Tensor::new(a.shape());

        assert_eq!(a.add(&zero).unwrap(), a);
    }

    #[test]
    fn add_shape_mismatch_leaves_operand_untouched() {
        let mut a = matrix(2, 2, &[1., 2., 3., 4.]);
        let b = Tensor::new(Shape::d1(4));

        assert!(matches!(
            a.add_ip(&b),
            Err(MlErr::ShapeMismatch { .. })
        ));
        assert_eq!(a.as_slice(), &[1., 2., 3., 4.]);
    }

    #[test]
    fn dot_matches_hand_computed_product() {
        // 2x3 · 3x2
        let a = matrix(3, 2, &[1., 2., 3., 4., 5., 6.]);
        let b = matrix(2, 3, &[7., 8., 9., 10., 11., 12.]);

        let c = a.dot(&b).unwrap();
        assert_eq!(c.shape(), Shape::d2(2, 2));
        assert_eq!(c.as_slice(), &[58., 64., 139., 154.]);
    }

    #[test]
    fn dot_rejects_incompatible_shapes() {
        let a = matrix(3, 2, &[0.; 6]);
        let b = matrix(2, 2, &[0.; 4]);

        assert!(matches!(a.dot(&b), Err(MlErr::ShapeMismatch { .. })));
    }

    #[test]
    fn dot_works_per_channel() {
        let a = Tensor::from_vec(Shape::new(1, 1, 2), vec![2., 3.]).unwrap();
        let b = Tensor::from_vec(Shape::new(2, 1, 2), vec![1., 2., 3., 4.]).unwrap();

        let c = a.dot(&b).unwrap();
        assert_eq!(c.shape(), Shape::new(2, 1, 2));
        assert_eq!(c.as_slice(), &[2., 4., 9., 12.]);
    }

    #[test]
    fn transpose_reorders_data() {
        let mut a = matrix(3, 2, &[1., 2., 3., 4., 5., 6.]);
        a.transpose();

        assert_eq!(a.shape(), Shape::d2(2, 3));
        assert_eq!(a.as_slice(), &[1., 4., 2., 5., 3., 6.]);
        assert_eq!(a.get(1, 2, 0), Some(6.));
    }

    #[test]
    fn transpose_is_an_involution_under_dot() {
        let a = matrix(3, 2, &[0.5, -1., 2., 3., 0.25, -4.]);
        let b = matrix(2, 3, &[1., 2., 3., 4., 5., 6.]);

        let mut tt = a.clone();
        tt.transpose();
        tt.transpose();

        assert_eq!(tt, a);
        assert_eq!(tt.dot(&b).unwrap(), a.dot(&b).unwrap());
    }

    #[test]
    fn reshape_keeps_data() {
        let a = Tensor::from_vec(Shape::new(2, 2, 2), (0..8).map(|x| x as f32).collect()).unwrap();
        let flat = a.clone().reshape(Shape::d1(8)).unwrap();

        assert_eq!(flat.as_slice(), a.as_slice());
        assert!(a.reshape(Shape::d1(7)).is_err());
    }

    #[test]
    fn depth_slice_copies_a_channel() {
        let a = Tensor::from_vec(Shape::new(2, 1, 3), vec![1., 2., 3., 4., 5., 6.]).unwrap();

        assert_eq!(a.depth_slice(1).unwrap().as_slice(), &[3., 4.]);
        assert!(matches!(
            a.depth_slice(3),
            Err(MlErr::IndexOutOfBounds { index: 3, len: 3, .. })
        ));
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        let a = matrix(4, 1, &[0.1, 0.7, 0.7, 0.2]);
        assert_eq!(a.argmax(), 1);
    }
}
