// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod dispatch;
pub mod fisher;
pub mod gram;
pub mod histogram;
pub mod hmm;
pub mod sequence;

use seqad_core::{FeatureMatrix, KernelMatrix, SeqadError};

pub use dispatch::{KERNEL_METHOD_TAGS, KernelMethod, build_kernel};
pub use fisher::{
    FisherKernel, FisherMode, FisherParameters, build_fisher_kernel, estimate_parameters,
    random_parameters,
};
pub use gram::{KERNEL_TYPE_NAMES, KernelType, gram, gram_symmetric};
pub use histogram::{HistogramKernel, bucket_index, build_histogram_kernel, histogram_edges};
pub use hmm::{Decoded, SequenceModel, StructuredHmm, parameter_len};
pub use sequence::{build_sequence_kernel, flatten_sequences};

/// Output shared by every builder: one feature column per example and the
/// Gram matrix over those columns.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltKernel {
    pub kernel: KernelMatrix,
    pub phi: FeatureMatrix,
    /// Short `key=value` notes describing how the kernel was built.
    pub notes: Vec<String>,
}

/// Largest feature dimension any builder will allocate.
pub const MAX_FEATURE_LEN: usize = 1 << 24;

/// Accepts a feature dimension computed with checked arithmetic; `None`
/// means the computation overflowed.
pub(crate) fn bounded_feature_len(what: &str, len: Option<usize>) -> Result<usize, SeqadError> {
    match len {
        Some(len) if len <= MAX_FEATURE_LEN => Ok(len),
        _ => Err(SeqadError::invalid_input(format!(
            "{what} exceeds the feature limit of {MAX_FEATURE_LEN} entries"
        ))),
    }
}

/// Feature and kernel builders for seqad.
pub fn crate_name() -> &'static str {
    "seqad-kernels"
}
