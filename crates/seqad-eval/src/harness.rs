// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::{ExperimentConfig, MethodConfig};
use crate::detectors::{DetectorInput, Solvers, score_test_partition};
use crate::generator::{GenerationRequest, SequenceGenerator};
use crate::report::{AucAccumulator, SweepReport, TrialFailure, TrialStage};
use crate::roc::roc_auc;
use log::{debug, info, warn};
use seqad_core::{LabelSequence, SeqadError, SequenceCollection, StableRng, derive_seed};
use seqad_kernels::build_kernel;
use seqad_preprocess::normalize_collection;

/// Normalized data of one `(repetition, level)` trial, shared by every
/// method.
#[derive(Clone, Debug)]
pub struct TrialData {
    pub collection: SequenceCollection,
    pub labels: Vec<LabelSequence>,
    /// Anomaly marker per example, train and test.
    pub anomalous: Vec<bool>,
}

impl TrialData {
    pub fn test_markers(&self) -> &[bool] {
        &self.anomalous[self.collection.num_train()..]
    }
}

/// Generates `config.examples` sequences at `anomaly_probability` and
/// normalizes them on the training prefix.
pub fn prepare_trial(
    config: &ExperimentConfig,
    generator: &mut dyn SequenceGenerator,
    anomaly_probability: f64,
    rng: &mut StableRng,
) -> Result<TrialData, (TrialStage, SeqadError)> {
    let request = GenerationRequest {
        length: config.length,
        block_length: config.block_length,
        anomaly_probability,
        num_blocks: config.blocks,
    };
    debug!(
        "generating {} sequences, {} for training, anomaly probability {anomaly_probability}",
        config.examples, config.train_examples
    );

    let mut sequences = Vec::with_capacity(config.examples);
    let mut labels = Vec::with_capacity(config.examples);
    let mut anomalous = Vec::with_capacity(config.examples);
    for _ in 0..config.examples {
        let generated = generator
            .generate(&request, rng)
            .map_err(|err| (TrialStage::Generate, err))?;
        sequences.push(generated.sequence);
        labels.push(generated.labels);
        anomalous.push(generated.anomalous);
    }
    let collection = SequenceCollection::new(sequences, config.train_examples)
        .and_then(|collection| collection.check_labels(&labels).map(|()| collection))
        .map_err(|err| (TrialStage::Generate, err))?;

    let (collection, report) =
        normalize_collection(collection).map_err(|err| (TrialStage::Normalize, err))?;
    for step in &report.steps {
        debug!("normalization step {}: {}", step.step, step.notes.join(", "));
    }
    Ok(TrialData {
        collection,
        labels,
        anomalous,
    })
}

/// Builds the method's kernel (if any), scores the test partition and
/// returns its AUC.
pub fn run_method(
    method: &MethodConfig,
    trial: &TrialData,
    anomaly_probability: f64,
    seed: u64,
    solvers: &mut Solvers<'_>,
) -> Result<f64, (TrialStage, SeqadError)> {
    let kernel_method = method
        .kernel_method()
        .map_err(|err| (TrialStage::Kernel, err))?;
    let built = kernel_method
        .map(|km| build_kernel(&trial.collection, &trial.labels, &km, method.ord, seed))
        .transpose()
        .map_err(|err| (TrialStage::Kernel, err))?;

    let input = DetectorInput {
        collection: &trial.collection,
        labels: &trial.labels,
        built: built.as_ref(),
        anomaly_probability,
    };
    let scores = score_test_partition(method.detector, &input, solvers)
        .map_err(|err| (TrialStage::Detector, err))?;
    roc_auc(&scores, trial.test_markers()).map_err(|err| (TrialStage::Roc, err))
}

/// Runs every repetition, level and method of `config`.
///
/// Failures are contained to the unit they occur in: a generation or
/// normalization failure skips every method of that `(repetition, level)`,
/// any later failure skips only that method. Skipped trials are listed in
/// the report and contribute no AUC.
pub fn run_sweep(
    config: &ExperimentConfig,
    generator: &mut dyn SequenceGenerator,
    solvers: &mut Solvers<'_>,
) -> Result<SweepReport, SeqadError> {
    config.validate()?;
    let names = config.display_names();
    let reps = config.repetitions;
    let num_levels = config.levels.len();
    let num_methods = config.methods.len();
    let mut acc = AucAccumulator::new(num_levels, num_methods);

    for r in 0..reps {
        for (b, &level) in config.levels.iter().enumerate() {
            let mut rng = StableRng::new(derive_seed(config.seed, &[r as u64, b as u64]));
            let trial = match prepare_trial(config, generator, level, &mut rng) {
                Ok(trial) => trial,
                Err((stage, err)) => {
                    warn!(
                        "iteration {}/{reps} in level {}/{num_levels}: {} failed for all methods: {err}",
                        r + 1,
                        b + 1,
                        stage.as_str()
                    );
                    for m in 0..num_methods {
                        acc.record_failure(TrialFailure::new(r, b, m, stage, &err));
                    }
                    continue;
                }
            };

            for (m, method) in config.methods.iter().enumerate() {
                let seed = derive_seed(config.seed, &[r as u64, b as u64, m as u64]);
                match run_method(method, &trial, level, seed, solvers) {
                    Ok(auc) => {
                        info!(
                            "iteration {}/{reps} in level {}/{num_levels} for method {} ({}/{num_methods}) got AUC = {auc:.4}",
                            r + 1,
                            b + 1,
                            names[m],
                            m + 1
                        );
                        acc.push(b, m, auc);
                    }
                    Err((stage, err)) => {
                        warn!(
                            "iteration {}/{reps} in level {}/{num_levels} for method {} ({}/{num_methods}) failed at {}: {err}",
                            r + 1,
                            b + 1,
                            names[m],
                            m + 1,
                            stage.as_str()
                        );
                        acc.record_failure(TrialFailure::new(r, b, m, stage, &err));
                    }
                }
            }
        }
    }

    let report = acc.into_report(config.clone());
    log_summary(&report);
    Ok(report)
}

fn log_summary(report: &SweepReport) {
    for (b, level) in report.config.levels.iter().enumerate() {
        info!("level={level}:");
        for (m, name) in report.names.iter().enumerate() {
            match (
                report.auc_mean[m][b],
                report.auc_std[m][b],
                report.auc_var[m][b],
            ) {
                (Some(mean), Some(std), Some(var)) => {
                    info!("   m={name}: AUC={mean:.4} STD={std:.4} VAR={var:.4}");
                }
                _ => info!("   m={name}: no successful trials"),
            }
        }
    }
    if !report.failures.is_empty() {
        warn!("{} trials were omitted", report.failures.len());
    }
}
