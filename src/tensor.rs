//! Row-major 2D tensor used as the numerical backbone of the engine
//!
//! A `Tensor` is a dense `rows × cols` matrix of f32 values stored in a flat
//! row-major buffer. A one-row tensor doubles as a vector view. All shape
//! violations are programmer errors and fail fast with an assertion.

use std::ops::{Index, IndexMut};

/// Dense 2D matrix with row-major storage.
///
/// Invariant: `data.len() == rows * cols` at all times. Cloning a tensor
/// deep-copies the buffer (value semantics).
///
/// # Example
///
/// ```
/// use dnn_engine::Tensor;
///
/// let mut a = Tensor::new(2, 3);
/// a[(0, 1)] = 5.0;
/// assert_eq!(a[(0, 1)], 5.0);
/// assert_eq!(a.transpose()[(1, 0)], 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tensor {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a zero-initialized `rows × cols` tensor.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a zero-initialized one-row tensor of length `len`.
    pub fn vector(len: usize) -> Self {
        Self::new(1, len)
    }

    /// Create a tensor from an existing row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Tensor data length {} does not match shape {}x{}",
            data.len(),
            rows,
            cols
        );
        Self { rows, cols, data }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when `other` has the same rows and columns.
    pub fn same_shape(&self, other: &Tensor) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Flat row-major view of the underlying buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat row-major view of the underlying buffer.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Slice view of row `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        assert!(i < self.rows, "Row index {} out of range ({})", i, self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Matrix multiplication `self · rhs`.
    ///
    /// Plain triple loop; the inner dimension is summed in scan order so
    /// results are bit-for-bit reproducible across runs.
    ///
    /// # Panics
    ///
    /// Panics if `self.cols != rhs.rows`.
    pub fn matmul(&self, rhs: &Tensor) -> Tensor {
        assert_eq!(
            self.cols, rhs.rows,
            "matmul dimension mismatch: {}x{} · {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );

        let mut out = Tensor::new(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut sum = 0.0f32;
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * rhs.data[k * rhs.cols + j];
                }
                out.data[i * rhs.cols + j] = sum;
            }
        }
        out
    }

    /// Return the transpose as a new `cols × rows` tensor.
    pub fn transpose(&self) -> Tensor {
        let mut out = Tensor::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Add `bias[j]` to every element of column `j`, in place.
    ///
    /// # Panics
    ///
    /// Panics if `bias.len() != self.cols`.
    pub fn add_bias(&mut self, bias: &[f32]) {
        assert_eq!(
            bias.len(),
            self.cols,
            "Bias length {} does not match column count {}",
            bias.len(),
            self.cols
        );
        for row in self.data.chunks_exact_mut(self.cols) {
            for (value, b) in row.iter_mut().zip(bias) {
                *value += *b;
            }
        }
    }

    /// Column index of the maximum element.
    ///
    /// Ties break to the first occurrence in row-major scan order (only a
    /// strictly greater value updates the winner). For a multi-row tensor
    /// this is the flat maximum's index modulo `cols`, meaningful only for
    /// batch-size-1 outputs; per-row argmax over a batch is intentionally
    /// not provided.
    pub fn argmax(&self) -> usize {
        assert!(!self.data.is_empty(), "argmax of an empty tensor");
        let mut max_idx = 0;
        let mut max_val = self.data[0];
        for (idx, &value) in self.data.iter().enumerate() {
            if value > max_val {
                max_val = value;
                max_idx = idx;
            }
        }
        max_idx % self.cols
    }
}

impl Index<(usize, usize)> for Tensor {
    type Output = f32;

    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Tensor {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        &mut self.data[r * self.cols + c]
    }
}

/// Single-index access for vector views. Requires `rows == 1`.
impl Index<usize> for Tensor {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        assert_eq!(self.rows, 1, "Single-index access requires a one-row tensor");
        &self.data[i]
    }
}

impl IndexMut<usize> for Tensor {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        assert_eq!(self.rows, 1, "Single-index access requires a one-row tensor");
        &mut self.data[i]
    }
}
