// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::BuiltKernel;
use crate::fisher::{FisherMode, build_fisher_kernel};
use crate::gram::KernelType;
use crate::histogram::build_histogram_kernel;
use crate::hmm::StructuredHmm;
use crate::sequence::build_sequence_kernel;
use log::debug;
use seqad_core::{LabelSequence, SeqadError, SequenceCollection};

/// Tags accepted by [`KernelMethod::from_tag`], in reporting order.
pub const KERNEL_METHOD_TAGS: [&str; 5] = ["linear", "rbf", "hist", "fisher", "fisher-rand"];

/// Feature/kernel construction strategy selected per detector method.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KernelMethod {
    Sequence { kernel: KernelType },
    Histogram { bins: usize },
    Fisher { states: usize },
    FisherRandom { states: usize },
}

impl KernelMethod {
    /// Resolves a case-insensitive method tag with its numeric parameter.
    ///
    /// `hist` takes the bin count, `fisher` and `fisher-rand` the number of
    /// latent states, `rbf` the kernel width; `linear` ignores `param`.
    pub fn from_tag(tag: &str, param: f64) -> Result<Self, SeqadError> {
        let lowered = tag.trim().to_ascii_lowercase();
        let method = match lowered.as_str() {
            "linear" => Self::Sequence {
                kernel: KernelType::Linear,
            },
            "rbf" => Self::Sequence {
                kernel: KernelType::Rbf { width: param },
            },
            "hist" => Self::Histogram {
                bins: count_param("hist", param)?,
            },
            "fisher" => Self::Fisher {
                states: count_param("fisher", param)?,
            },
            "fisher-rand" => Self::FisherRandom {
                states: count_param("fisher-rand", param)?,
            },
            other => {
                return Err(SeqadError::invalid_input(format!(
                    "unknown kernel method '{other}'; expected one of: {}",
                    KERNEL_METHOD_TAGS.join(", ")
                )));
            }
        };
        method.validate()?;
        Ok(method)
    }

    pub fn validate(&self) -> Result<(), SeqadError> {
        match self {
            Self::Sequence { kernel } => kernel.validate(),
            Self::Histogram { bins } if *bins < 2 => Err(SeqadError::invalid_input(format!(
                "histogram bins must be >= 2; got {bins}"
            ))),
            Self::Fisher { states } | Self::FisherRandom { states } if *states == 0 => Err(
                SeqadError::invalid_input("fisher kernel needs at least one latent state"),
            ),
            _ => Ok(()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequence { kernel } => kernel.label(),
            Self::Histogram { .. } => "hist",
            Self::Fisher { .. } => "fisher",
            Self::FisherRandom { .. } => "fisher-rand",
        }
    }
}

fn count_param(tag: &str, param: f64) -> Result<usize, SeqadError> {
    if !param.is_finite() || param < 0.0 || param.fract() != 0.0 {
        return Err(SeqadError::invalid_input(format!(
            "'{tag}' needs a non-negative integer parameter; got {param}"
        )));
    }
    Ok(param as usize)
}

/// Builds the kernel and feature matrix for `method`.
///
/// `labels` are only read by the Fisher builders; `seed` only by
/// [`KernelMethod::FisherRandom`].
pub fn build_kernel(
    collection: &SequenceCollection,
    labels: &[LabelSequence],
    method: &KernelMethod,
    ord: f64,
    seed: u64,
) -> Result<BuiltKernel, SeqadError> {
    method.validate()?;
    debug!("build {} kernel with ord={ord}", method.label());
    match *method {
        KernelMethod::Sequence { kernel } => build_sequence_kernel(collection, ord, kernel),
        KernelMethod::Histogram { bins } => {
            build_histogram_kernel(collection, bins, ord).map(|out| out.built)
        }
        KernelMethod::Fisher { states } => build_fisher_kernel::<StructuredHmm>(
            collection,
            labels,
            states,
            ord,
            FisherMode::Estimated,
        )
        .map(|out| out.built),
        KernelMethod::FisherRandom { states } => build_fisher_kernel::<StructuredHmm>(
            collection,
            labels,
            states,
            ord,
            FisherMode::Randomized { seed },
        )
        .map(|out| out.built),
    }
}
