// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::{KernelMatrix, LabelSequence, SeqadError, Sequence, SequenceCollection};
use seqad_kernels::BuiltKernel;
use serde::{Deserialize, Serialize};

/// Iteration cap handed to the structured one-class SVM.
pub const HMAD_MAX_ITERATIONS: usize = 60;

/// Anomaly detector evaluated by the harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum DetectorKind {
    /// Fixed linear scorer `w . phi` with `w = -1`.
    Bayes,
    /// One-class SVM over the kernel matrix.
    #[serde(rename = "ocsvm")]
    OcSvm,
    /// Structured one-class SVM over the raw sequences.
    Hmad {
        #[serde(default)]
        zero_shot: bool,
    },
}

impl DetectorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bayes => "Bayes",
            Self::OcSvm => "OcSvm",
            Self::Hmad { .. } => "HMAD",
        }
    }

    /// Whether the detector consumes a built kernel/feature matrix.
    pub fn needs_kernel(&self) -> bool {
        !matches!(self, Self::Hmad { .. })
    }
}

/// Plain one-class SVM solver.
pub trait OneClassSvm {
    /// Trains on the `num_train x num_train` training kernel block.
    fn train(&mut self, kernel: &KernelMatrix, c: f64) -> Result<(), SeqadError>;

    /// Indices into the training block of the support vectors of the last
    /// successful `train`.
    fn support(&self) -> Vec<usize>;

    /// Scores every row of a `test x support` kernel block. Higher scores
    /// mean more anomalous.
    fn score(&self, kernel: &KernelMatrix) -> Result<Vec<f64>, SeqadError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructuredTrainOptions {
    pub c: f64,
    pub max_iterations: usize,
    pub zero_shot: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructuredFit {
    pub solution: Vec<f64>,
    pub latents: Vec<Vec<usize>>,
    pub threshold: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructuredPrediction {
    /// Higher scores mean more anomalous.
    pub scores: Vec<f64>,
    pub latents: Vec<Vec<usize>>,
}

/// Structured (latent-variable) one-class SVM solver.
pub trait StructuredOneClassSvm {
    fn train(
        &mut self,
        sequences: &[Sequence],
        labels: &[LabelSequence],
        options: &StructuredTrainOptions,
    ) -> Result<StructuredFit, SeqadError>;

    fn apply(&self, sequences: &[Sequence]) -> Result<StructuredPrediction, SeqadError>;
}

/// Solver instances shared by every trial of a sweep. Each trial retrains
/// them from scratch.
pub struct Solvers<'a> {
    pub ocsvm: &'a mut dyn OneClassSvm,
    pub structured: &'a mut dyn StructuredOneClassSvm,
}

/// Everything a detector may read for one trial.
#[derive(Clone, Copy, Debug)]
pub struct DetectorInput<'a> {
    pub collection: &'a SequenceCollection,
    pub labels: &'a [LabelSequence],
    pub built: Option<&'a BuiltKernel>,
    pub anomaly_probability: f64,
}

/// `C = 1 / (num_train * anomaly_probability)`.
pub fn regularization(num_train: usize, anomaly_probability: f64) -> Result<f64, SeqadError> {
    if num_train == 0 || !(anomaly_probability > 0.0 && anomaly_probability <= 1.0) {
        return Err(SeqadError::invalid_input(format!(
            "regularization needs num_train > 0 and anomaly probability in (0, 1]; got num_train={num_train}, p={anomaly_probability}"
        )));
    }
    Ok(1.0 / (num_train as f64 * anomaly_probability))
}

/// Scores the test partition with `kind`; one score per test example.
pub fn score_test_partition(
    kind: DetectorKind,
    input: &DetectorInput<'_>,
    solvers: &mut Solvers<'_>,
) -> Result<Vec<f64>, SeqadError> {
    let scores = match kind {
        DetectorKind::Bayes => bayes_scores(require_kernel(kind, input)?, input.collection),
        DetectorKind::OcSvm => ocsvm_scores(
            require_kernel(kind, input)?,
            input.collection,
            input.anomaly_probability,
            &mut *solvers.ocsvm,
        )?,
        DetectorKind::Hmad { zero_shot } => {
            hmad_scores(input, zero_shot, &mut *solvers.structured)?
        }
    };
    let expected = input.collection.num_test();
    if scores.len() != expected {
        return Err(SeqadError::shape_mismatch(format!(
            "{} returned {} scores for {expected} test examples",
            kind.display_name(),
            scores.len()
        )));
    }
    Ok(scores)
}

fn require_kernel<'a>(
    kind: DetectorKind,
    input: &DetectorInput<'a>,
) -> Result<&'a BuiltKernel, SeqadError> {
    input.built.ok_or_else(|| {
        SeqadError::invalid_input(format!(
            "{} needs a kernel method but none was built",
            kind.display_name()
        ))
    })
}

fn bayes_scores(built: &BuiltKernel, collection: &SequenceCollection) -> Vec<f64> {
    built
        .phi
        .columns()
        .skip(collection.num_train())
        .map(|column| -column.iter().sum::<f64>())
        .collect()
}

fn ocsvm_scores(
    built: &BuiltKernel,
    collection: &SequenceCollection,
    anomaly_probability: f64,
    solver: &mut dyn OneClassSvm,
) -> Result<Vec<f64>, SeqadError> {
    let num_train = collection.num_train();
    let train_idx: Vec<usize> = (0..num_train).collect();
    let test_idx: Vec<usize> = (num_train..collection.len()).collect();

    let c = regularization(num_train, anomaly_probability)?;
    solver.train(&built.kernel.select(&train_idx, &train_idx)?, c)?;

    let support = solver.support();
    if let Some(&bad) = support.iter().find(|&&s| s >= num_train) {
        return Err(SeqadError::invalid_input(format!(
            "support index {bad} is outside the {num_train} training examples"
        )));
    }
    solver.score(&built.kernel.select(&test_idx, &support)?)
}

fn hmad_scores(
    input: &DetectorInput<'_>,
    zero_shot: bool,
    solver: &mut dyn StructuredOneClassSvm,
) -> Result<Vec<f64>, SeqadError> {
    input.collection.check_labels(input.labels)?;
    let num_train = input.collection.num_train();
    let options = StructuredTrainOptions {
        c: regularization(num_train, input.anomaly_probability)?,
        max_iterations: HMAD_MAX_ITERATIONS,
        zero_shot,
    };
    solver.train(input.collection.train(), &input.labels[..num_train], &options)?;
    Ok(solver.apply(input.collection.test())?.scores)
}
