// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::{FeatureMatrix, KernelMatrix, Matrix, SeqadError};

/// Accepted kernel-type names, in the order they are reported in errors.
pub const KERNEL_TYPE_NAMES: [&str; 2] = ["linear", "rbf"];

/// Kernel function applied between two feature columns.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum KernelType {
    /// Dot product.
    #[default]
    Linear,
    /// `exp(-||a - b||^2 / width)`.
    Rbf { width: f64 },
}

impl KernelType {
    /// Resolves a case-insensitive kernel-type name and its parameter.
    ///
    /// `linear` ignores `param`; `rbf` uses it as the width.
    pub fn from_name(name: &str, param: f64) -> Result<Self, SeqadError> {
        let kernel = match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Self::Linear,
            "rbf" => Self::Rbf { width: param },
            other => {
                return Err(SeqadError::invalid_input(format!(
                    "unknown kernel type '{other}'; expected one of: {}",
                    KERNEL_TYPE_NAMES.join(", ")
                )));
            }
        };
        kernel.validate()?;
        Ok(kernel)
    }

    pub fn validate(&self) -> Result<(), SeqadError> {
        if let Self::Rbf { width } = self {
            if !width.is_finite() || *width <= 0.0 {
                return Err(SeqadError::invalid_input(format!(
                    "rbf kernel width must be finite and > 0; got {width}"
                )));
            }
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Rbf { .. } => "rbf",
        }
    }

    pub fn evaluate(&self, left: &[f64], right: &[f64]) -> f64 {
        match self {
            Self::Linear => left.iter().zip(right).map(|(a, b)| a * b).sum::<f64>(),
            Self::Rbf { width } => {
                let dist_sq = left
                    .iter()
                    .zip(right)
                    .map(|(a, b)| {
                        let delta = a - b;
                        delta * delta
                    })
                    .sum::<f64>();
                (-dist_sq / width).exp()
            }
        }
    }
}

/// Cross Gram matrix: entry `(i, j)` is `k(a[:, i], b[:, j])`.
pub fn gram(a: &FeatureMatrix, b: &FeatureMatrix, kernel: KernelType) -> Result<Matrix, SeqadError> {
    kernel.validate()?;
    if a.rows() != b.rows() {
        return Err(SeqadError::shape_mismatch(format!(
            "gram inputs must share feature dimension: left has {}, right has {}",
            a.rows(),
            b.rows()
        )));
    }
    let mut out = Matrix::zeros(a.cols(), b.cols());
    for j in 0..b.cols() {
        for i in 0..a.cols() {
            let value = kernel.evaluate(a.column(i), b.column(j));
            if !value.is_finite() {
                return Err(SeqadError::numerical_issue(format!(
                    "non-finite kernel value at ({i}, {j})"
                )));
            }
            out.set(i, j, value);
        }
    }
    Ok(out)
}

/// Gram matrix of `phi` with itself. Only the upper triangle is evaluated and
/// mirrored, so the result is exactly symmetric.
pub fn gram_symmetric(phi: &FeatureMatrix, kernel: KernelType) -> Result<KernelMatrix, SeqadError> {
    kernel.validate()?;
    let n = phi.cols();
    let rows = upper_triangle_rows(phi, kernel)?;
    let mut out = Matrix::zeros(n, n);
    for (left, row) in rows.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let right = left + offset;
            out.set(left, right, value);
            out.set(right, left, value);
        }
    }
    Ok(out)
}

fn upper_triangle_row(
    phi: &FeatureMatrix,
    kernel: KernelType,
    left: usize,
) -> Result<Vec<f64>, SeqadError> {
    (left..phi.cols())
        .map(|right| {
            let value = kernel.evaluate(phi.column(left), phi.column(right));
            if value.is_finite() {
                Ok(value)
            } else {
                Err(SeqadError::numerical_issue(format!(
                    "non-finite kernel value at ({left}, {right})"
                )))
            }
        })
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn upper_triangle_rows(
    phi: &FeatureMatrix,
    kernel: KernelType,
) -> Result<Vec<Vec<f64>>, SeqadError> {
    (0..phi.cols())
        .map(|left| upper_triangle_row(phi, kernel, left))
        .collect()
}

#[cfg(feature = "rayon")]
fn upper_triangle_rows(
    phi: &FeatureMatrix,
    kernel: KernelType,
) -> Result<Vec<Vec<f64>>, SeqadError> {
    use rayon::prelude::*;

    (0..phi.cols())
        .into_par_iter()
        .map(|left| upper_triangle_row(phi, kernel, left))
        .collect()
}
