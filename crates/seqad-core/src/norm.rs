// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SeqadError;

/// Returns true when `ord` requests normalization (`ord >= 1`).
///
/// Orders below one, the conventional "-1" included, disable normalization.
pub fn normalization_enabled(ord: f64) -> bool {
    ord >= 1.0
}

/// L-`ord` vector norm for `ord >= 1`; `f64::INFINITY` yields the max-abs
/// norm.
pub fn lp_norm(values: &[f64], ord: f64) -> Result<f64, SeqadError> {
    if ord.is_nan() || ord < 1.0 {
        return Err(SeqadError::invalid_input(format!(
            "vector norm order must be >= 1; got {ord}"
        )));
    }
    if ord.is_infinite() {
        return Ok(values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())));
    }
    if ord == 1.0 {
        return Ok(values.iter().map(|v| v.abs()).sum());
    }
    if ord == 2.0 {
        return Ok(values.iter().map(|v| v * v).sum::<f64>().sqrt());
    }
    Ok(values
        .iter()
        .map(|v| v.abs().powf(ord))
        .sum::<f64>()
        .powf(1.0 / ord))
}

/// Divides `values` by its L-`ord` norm in place.
///
/// No-op when `ord < 1`. A zero norm is reported as `ZeroNorm` naming
/// `context`.
pub fn normalize_lp(values: &mut [f64], ord: f64, context: &str) -> Result<(), SeqadError> {
    if ord.is_nan() {
        return Err(SeqadError::invalid_input(
            "vector norm order must not be NaN",
        ));
    }
    if !normalization_enabled(ord) {
        return Ok(());
    }
    let norm = lp_norm(values, ord)?;
    if norm == 0.0 {
        return Err(SeqadError::zero_norm(format!(
            "{context} has zero L{ord} norm"
        )));
    }
    if !norm.is_finite() {
        return Err(SeqadError::numerical_issue(format!(
            "{context} has non-finite L{ord} norm"
        )));
    }
    for v in values.iter_mut() {
        *v /= norm;
    }
    Ok(())
}
