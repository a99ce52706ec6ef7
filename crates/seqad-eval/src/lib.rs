// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod config;
pub mod detectors;
pub mod error;
pub mod generator;
pub mod harness;
pub mod report;
pub mod roc;

pub use config::{ExperimentConfig, MethodConfig};
pub use detectors::{
    DetectorInput, DetectorKind, HMAD_MAX_ITERATIONS, OneClassSvm, Solvers,
    StructuredFit, StructuredOneClassSvm, StructuredPrediction, StructuredTrainOptions,
    regularization, score_test_partition,
};
pub use error::EvalError;
pub use generator::{GeneratedSequence, GenerationRequest, SequenceGenerator};
pub use harness::{TrialData, prepare_trial, run_method, run_sweep};
pub use report::{AucAccumulator, Summary, SweepReport, TrialFailure, TrialStage, summarize};
pub use roc::{RocPoint, auc, roc_auc, roc_curve};

/// Evaluation harness crate name helper.
pub fn crate_name() -> &'static str {
    "seqad-eval"
}
