// src/core/matrix.rs

//! Dense complex matrices.
//!
//! `ComplexMatrix` is a value type: every operation returns a new matrix and
//! nothing is mutated in place. The `width` of a matrix is its number of
//! columns (the dimension it consumes) and the `height` its number of rows
//! (the dimension it produces), so an operator on `n` qubits feeding `m`
//! qubits is `2^m` high and `2^n` wide.

use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A dense matrix of `Complex64` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    width: usize,
    height: usize,
    /// Row-major entries, `height * width` long.
    data: Vec<Complex64>,
}

impl ComplexMatrix {
    /// Builds a matrix from conventional rows.
    ///
    /// # Panics
    /// Panics if `rows` is empty, a row is empty, or the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Self {
        assert!(!rows.is_empty() && !rows[0].is_empty(), "matrix must have at least one entry");
        let width = rows[0].len();
        assert!(rows.iter().all(|r| r.len() == width), "all matrix rows must have equal length");
        let height = rows.len();
        let data = rows.into_iter().flatten().collect();
        Self { width, height, data }
    }

    /// Builds a matrix from its columns, each given top to bottom.
    ///
    /// # Panics
    /// Panics if `columns` is empty, a column is empty, or the columns are ragged.
    pub fn from_columns(columns: Vec<Vec<Complex64>>) -> Self {
        assert!(!columns.is_empty() && !columns[0].is_empty(), "matrix must have at least one entry");
        let height = columns[0].len();
        assert!(columns.iter().all(|c| c.len() == height), "all matrix columns must have equal length");
        let width = columns.len();
        let mut m = Self::zeros(height, width);
        for (col, column) in columns.into_iter().enumerate() {
            for (row, value) in column.into_iter().enumerate() {
                m.data[row * width + col] = value;
            }
        }
        m
    }

    /// A single column holding `entries`.
    pub fn column_vector(entries: Vec<Complex64>) -> Self {
        Self::from_columns(vec![entries])
    }

    /// An all-zero `height × width` matrix.
    pub fn zeros(height: usize, width: usize) -> Self {
        assert!(height > 0 && width > 0, "matrix dimensions must be non-zero");
        Self { width, height, data: vec![Complex64::zero(); height * width] }
    }

    /// The `dim × dim` identity.
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim, dim);
        for i in 0..dim {
            m.data[i * dim + i] = Complex64::one();
        }
        m
    }

    /// A 1×1 matrix. `scalar(1)` is the neutral element of `tensor`.
    pub fn scalar(value: Complex64) -> Self {
        Self { width: 1, height: 1, data: vec![value] }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.width + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[row * self.width + col] = value;
    }

    /// All entries, row by row.
    pub fn entries(&self) -> &[Complex64] {
        &self.data
    }

    fn zip_with(&self, other: &ComplexMatrix, op: &str, f: impl Fn(Complex64, Complex64) -> Complex64) -> ComplexMatrix {
        assert!(
            self.width == other.width && self.height == other.height,
            "cannot {} a {}x{} matrix and a {}x{} matrix",
            op, self.height, self.width, other.height, other.width
        );
        let data = self.data.iter().zip(&other.data).map(|(a, b)| f(*a, *b)).collect();
        ComplexMatrix { width: self.width, height: self.height, data }
    }

    /// Element-wise difference.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn subtract(&self, other: &ComplexMatrix) -> ComplexMatrix {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Every entry multiplied by -1.
    pub fn negate(&self) -> ComplexMatrix {
        ComplexMatrix { width: self.width, height: self.height, data: self.data.iter().map(|z| -z).collect() }
    }

    /// Matrix product `self · other`: `other` acts first.
    ///
    /// # Panics
    /// Panics unless `self.width() == other.height()`.
    pub fn multiply(&self, other: &ComplexMatrix) -> ComplexMatrix {
        assert_eq!(
            self.width, other.height,
            "cannot multiply a {}x{} matrix by a {}x{} matrix",
            self.height, self.width, other.height, other.width
        );
        let mut out = ComplexMatrix::zeros(self.height, other.width);
        for row in 0..self.height {
            for k in 0..self.width {
                let a = self.data[row * self.width + k];
                if a.is_zero() {
                    continue;
                }
                for col in 0..other.width {
                    out.data[row * other.width + col] += a * other.data[k * other.width + col];
                }
            }
        }
        out
    }

    /// Tensor (Kronecker) product `self ⊗ other`.
    ///
    /// `self` occupies the most significant qubits of the result.
    pub fn tensor(&self, other: &ComplexMatrix) -> ComplexMatrix {
        let width = self.width * other.width;
        let height = self.height * other.height;
        let mut out = ComplexMatrix::zeros(height, width);
        for j in 0..self.height {
            for i in 0..self.width {
                let a = self.data[j * self.width + i];
                for l in 0..other.height {
                    for k in 0..other.width {
                        out.data[(j * other.height + l) * width + i * other.width + k] =
                            a * other.data[l * other.width + k];
                    }
                }
            }
        }
        out
    }

    /// Tensors a sequence of matrices left to right, starting from `scalar(1)`.
    pub fn tensor_all<'a, I>(matrices: I) -> ComplexMatrix
    where
        I: IntoIterator<Item = &'a ComplexMatrix>,
    {
        matrices
            .into_iter()
            .fold(ComplexMatrix::scalar(Complex64::one()), |acc, m| acc.tensor(m))
    }

    /// `sqrt(Σ z²)` over every entry, squaring the complex value itself.
    ///
    /// This is not `Σ |z|²`: for complex entries the two differ.
    fn square_sum_root(&self) -> Complex64 {
        self.data.iter().map(|z| z * z).sum::<Complex64>().sqrt()
    }

    /// Divides every entry by `sqrt(Σ z²)`. A matrix whose square sum is zero
    /// normalises to the zero matrix.
    pub fn normalize(&self) -> ComplexMatrix {
        let root = self.square_sum_root();
        let data = if root.is_zero() {
            vec![Complex64::zero(); self.data.len()]
        } else {
            self.data.iter().map(|z| *z / root).collect()
        };
        ComplexMatrix { width: self.width, height: self.height, data }
    }

    /// `|sqrt(Σ z²)|`, the length used for error scoring.
    pub fn magnitude(&self) -> f64 {
        self.square_sum_root().norm()
    }

    /// True when both matrices have the same shape and every pair of
    /// entries lies within `tolerance` of each other.
    pub fn approx_eq(&self, other: &ComplexMatrix, tolerance: f64) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.data.iter().zip(&other.data).all(|(a, b)| (a - b).norm() <= tolerance)
    }
}

impl Add for &ComplexMatrix {
    type Output = ComplexMatrix;

    fn add(self, other: &ComplexMatrix) -> ComplexMatrix {
        self.zip_with(other, "add", |a, b| a + b)
    }
}

impl Sub for &ComplexMatrix {
    type Output = ComplexMatrix;

    fn sub(self, other: &ComplexMatrix) -> ComplexMatrix {
        self.subtract(other)
    }
}

impl Neg for &ComplexMatrix {
    type Output = ComplexMatrix;

    fn neg(self) -> ComplexMatrix {
        self.negate()
    }
}

impl fmt::Display for ComplexMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                write!(f, "{},", self.get(row, col))?;
            }
            if row + 1 != self.height {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
