// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SeqadError;

/// Dense column-major `f64` matrix.
///
/// Feature matrices are `D x N` with one example per column; kernel matrices
/// are `N x N`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
}

/// `D x N` matrix, one column per example.
pub type FeatureMatrix = Matrix;

/// `N x N` Gram matrix.
pub type KernelMatrix = Matrix;

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            values: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a matrix from equally long columns.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, SeqadError> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, Vec::len);
        if let Some((idx, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != rows)
        {
            return Err(SeqadError::shape_mismatch(format!(
                "matrix columns must share one length: column 0 has {rows}, column {idx} has {}",
                column.len()
            )));
        }
        Ok(Self {
            values: columns.into_iter().flatten().collect(),
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[col * self.rows + row]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[col * self.rows + row] = value;
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.values[col * self.rows..(col + 1) * self.rows]
    }

    pub fn column_mut(&mut self, col: usize) -> &mut [f64] {
        &mut self.values[col * self.rows..(col + 1) * self.rows]
    }

    pub fn columns(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.cols).map(move |col| self.column(col))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Global `(min, max)` over the half-open column range `start..end`.
    pub fn min_max_in_columns(&self, start: usize, end: usize) -> Option<(f64, f64)> {
        if start >= end || end > self.cols || self.rows == 0 {
            return None;
        }
        let block = &self.values[start * self.rows..end * self.rows];
        let min = block.iter().copied().fold(f64::INFINITY, f64::min);
        let max = block.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// Copies the block at the given row and column indices.
    pub fn select(&self, row_indices: &[usize], col_indices: &[usize]) -> Result<Self, SeqadError> {
        if let Some(&bad) = row_indices.iter().find(|&&r| r >= self.rows) {
            return Err(SeqadError::invalid_input(format!(
                "row index {bad} out of bounds for {} rows",
                self.rows
            )));
        }
        if let Some(&bad) = col_indices.iter().find(|&&c| c >= self.cols) {
            return Err(SeqadError::invalid_input(format!(
                "column index {bad} out of bounds for {} columns",
                self.cols
            )));
        }
        let mut out = Self::zeros(row_indices.len(), col_indices.len());
        for (j, &col) in col_indices.iter().enumerate() {
            for (i, &row) in row_indices.iter().enumerate() {
                out.set(i, j, self.get(row, col));
            }
        }
        Ok(out)
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|i| {
            (i + 1..self.cols).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }

    /// Mean of all columns.
    pub fn column_mean(&self) -> Vec<f64> {
        let mut mean = vec![0.0; self.rows];
        if self.cols == 0 {
            return mean;
        }
        for column in self.columns() {
            for (acc, v) in mean.iter_mut().zip(column) {
                *acc += v / self.cols as f64;
            }
        }
        mean
    }
}
