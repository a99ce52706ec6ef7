// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{BuiltKernel, MAX_FEATURE_LEN, bounded_feature_len};
use crate::gram::{KernelType, gram_symmetric};
use crate::sequence::flatten_sequences;
use log::debug;
use seqad_core::{Matrix, SeqadError, SequenceCollection, normalize_lp};

/// Offset added to the training maximum so it falls inside the last edge.
pub const EDGE_EPSILON: f64 = 1e-8;

/// Histogram kernel output together with its bin edges and the diagnostic
/// mean histogram.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramKernel {
    pub built: BuiltKernel,
    /// `bins + 1` linearly spaced edges fitted on the training columns.
    pub edges: Vec<f64>,
    /// Mean of all normalized histogram columns, train and test.
    pub mean_histogram: Vec<f64>,
}

/// `bins + 1` linearly spaced edges from `min` to `max + EDGE_EPSILON`.
pub fn histogram_edges(min: f64, max: f64, bins: usize) -> Result<Vec<f64>, SeqadError> {
    if bins < 2 {
        return Err(SeqadError::invalid_input(format!(
            "histogram bins must be >= 2; got {bins}"
        )));
    }
    if bins > MAX_FEATURE_LEN {
        return Err(SeqadError::invalid_input(format!(
            "histogram bins must be <= {MAX_FEATURE_LEN}; got {bins}"
        )));
    }
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(SeqadError::invalid_input(format!(
            "histogram range must be finite with min <= max; got min={min}, max={max}"
        )));
    }
    let upper = max + EDGE_EPSILON;
    let step = (upper - min) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|b| min + step * b as f64).collect();
    edges.push(upper);
    Ok(edges)
}

/// Bucket of `value` among `bins` buckets.
///
/// Bucket 0 is `(-inf, edges[1])`, bucket `b` in `1..bins-1` is
/// `[edges[b], edges[b+1])` and the last bucket is `[edges[bins-1], +inf)`.
/// The outer edges only bound the fit range; samples beyond them land in the
/// outer buckets.
pub fn bucket_index(value: f64, edges: &[f64]) -> usize {
    let bins = edges.len() - 1;
    edges[1..bins].partition_point(|&edge| edge <= value)
}

/// Per-channel histogram kernel.
///
/// Bin edges come from the training columns of the unnormalized flattened
/// feature matrix; every example (train and test) is then counted against
/// those edges, channel by channel.
pub fn build_histogram_kernel(
    collection: &SequenceCollection,
    bins: usize,
    ord: f64,
) -> Result<HistogramKernel, SeqadError> {
    if bins < 2 {
        return Err(SeqadError::invalid_input(format!(
            "histogram bins must be >= 2; got {bins}"
        )));
    }
    let channels = collection.channels();
    let rows = bounded_feature_len(
        &format!("histogram of {channels} channels x {bins} bins"),
        channels.checked_mul(bins),
    )?;
    let raw = flatten_sequences(collection, -1.0)?;
    let (min_phi, max_phi) = raw
        .min_max_in_columns(0, collection.num_train())
        .ok_or_else(|| SeqadError::invalid_input("histogram needs at least one training column"))?;
    let edges = histogram_edges(min_phi, max_phi, bins)?;
    debug!("build histograms with {bins} bins over training range [{min_phi}, {max_phi}]");

    let mut phi = Matrix::zeros(rows, collection.len());
    for (n, seq) in collection.sequences().iter().enumerate() {
        let column = phi.column_mut(n);
        for f in 0..channels {
            for &value in seq.channel(f) {
                column[f * bins + bucket_index(value, &edges)] += 1.0;
            }
        }
        normalize_lp(column, ord, &format!("histogram column {n}"))?;
    }

    let mean_histogram = phi.column_mean();
    debug!("mean histogram: {mean_histogram:?}");

    let kernel = gram_symmetric(&phi, KernelType::Linear)?;
    Ok(HistogramKernel {
        built: BuiltKernel {
            kernel,
            notes: vec![
                "builder=histogram".to_string(),
                format!("bins={bins}"),
                format!("ord={ord}"),
                format!("range=[{min_phi}, {max_phi}]"),
            ],
            phi,
        },
        edges,
        mean_histogram,
    })
}
