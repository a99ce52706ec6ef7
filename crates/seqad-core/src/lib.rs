// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod error;
pub mod matrix;
pub mod norm;
pub mod repro;
pub mod sequence;

pub use error::SeqadError;
pub use matrix::{FeatureMatrix, KernelMatrix, Matrix};
pub use norm::{lp_norm, normalization_enabled, normalize_lp};
pub use repro::{StableRng, derive_seed};
pub use sequence::{LabelSequence, Sequence, SequenceCollection};

/// Core shared types for seqad.
pub fn crate_name() -> &'static str {
    "seqad-core"
}
