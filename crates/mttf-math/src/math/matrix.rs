//! Dense matrices over any [`Scalar`] with a fraction-free determinant.

use super::scalar::Scalar;
use std::fmt;
use thiserror::Error;

/// Errors from matrix construction and elimination.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    #[error("row {row} has {actual} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("elimination divided by a zero pivot")]
    ZeroPivot,
}

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Scalar> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Overwrites every entry of column `col` with `value`.
    pub fn set_column(&mut self, col: usize, value: &T) -> Result<(), MatrixError> {
        for row in 0..self.rows {
            self.set(row, col, value.clone())?;
        }
        Ok(())
    }

    /// Entries as nested rows, for serialization and display.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Determinant by Bareiss fraction-free elimination.
    ///
    /// Every division is exact for polynomial entries, which keeps
    /// intermediate symbolic expressions small. Rows are swapped when a pivot
    /// is identically zero.
    pub fn determinant(&self) -> Result<T, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        if n == 0 {
            return Ok(T::one());
        }

        let mut a: Vec<Vec<T>> = self.to_rows();
        let mut negate = false;
        let mut prev = T::one();

        for k in 0..n - 1 {
            if a[k][k].is_zero() {
                match (k + 1..n).find(|&i| !a[i][k].is_zero()) {
                    Some(i) => {
                        a.swap(i, k);
                        negate = !negate;
                    }
                    None => return Ok(T::zero()),
                }
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let cross = a[i][j].clone() * a[k][k].clone() - a[i][k].clone() * a[k][j].clone();
                    a[i][j] = cross.checked_div(&prev).ok_or(MatrixError::ZeroPivot)?;
                }
            }
            prev = a[k][k].clone();
        }

        let det = a[n - 1][n - 1].clone();
        Ok(if negate { -det } else { det })
    }
}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (c, value) in self.row(r).iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
