// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::ExperimentConfig;
use crate::error::EvalError;
use seqad_core::SeqadError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pipeline stage a trial failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStage {
    Generate,
    Normalize,
    Kernel,
    Detector,
    Roc,
}

impl TrialStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Normalize => "normalize",
            Self::Kernel => "kernel",
            Self::Detector => "detector",
            Self::Roc => "roc",
        }
    }
}

/// A trial whose AUC was omitted from the results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialFailure {
    pub repetition: usize,
    pub level_index: usize,
    pub method_index: usize,
    pub stage: TrialStage,
    pub code: String,
    pub message: String,
}

impl TrialFailure {
    pub fn new(
        repetition: usize,
        level_index: usize,
        method_index: usize,
        stage: TrialStage,
        err: &SeqadError,
    ) -> Self {
        Self {
            repetition,
            level_index,
            method_index,
            stage,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// AUC scores keyed by `(level, method)`, appended once per repetition.
#[derive(Clone, Debug, PartialEq)]
pub struct AucAccumulator {
    res: Vec<Vec<Vec<f64>>>,
    failures: Vec<TrialFailure>,
}

impl AucAccumulator {
    pub fn new(levels: usize, methods: usize) -> Self {
        Self {
            res: vec![vec![Vec::new(); methods]; levels],
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, level_index: usize, method_index: usize, auc: f64) {
        self.res[level_index][method_index].push(auc);
    }

    pub fn record_failure(&mut self, failure: TrialFailure) {
        self.failures.push(failure);
    }

    pub fn scores(&self, level_index: usize, method_index: usize) -> &[f64] {
        &self.res[level_index][method_index]
    }

    pub fn failures(&self) -> &[TrialFailure] {
        &self.failures
    }

    /// Summarizes every `(level, method)` cell into the final report.
    pub fn into_report(self, config: ExperimentConfig) -> SweepReport {
        let levels = self.res.len();
        let methods = config.methods.len();
        let mut auc_mean = vec![vec![None; levels]; methods];
        let mut auc_std = vec![vec![None; levels]; methods];
        let mut auc_var = vec![vec![None; levels]; methods];
        for (b, per_level) in self.res.iter().enumerate() {
            for (m, scores) in per_level.iter().enumerate() {
                if let Some(summary) = summarize(scores) {
                    auc_mean[m][b] = Some(summary.mean);
                    auc_std[m][b] = Some(summary.std);
                    auc_var[m][b] = Some(summary.var);
                }
            }
        }
        SweepReport {
            names: config.display_names(),
            config,
            res: self.res,
            auc_mean,
            auc_std,
            auc_var,
            failures: self.failures,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Population variance.
    pub var: f64,
}

pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values
        .iter()
        .map(|v| {
            let delta = v - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    Some(Summary {
        mean,
        std: var.sqrt(),
        var,
    })
}

/// Persisted result of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub config: ExperimentConfig,
    /// Display name per method.
    pub names: Vec<String>,
    /// Raw AUC lists indexed `[level][method]`.
    pub res: Vec<Vec<Vec<f64>>>,
    /// Indexed `[method][level]`; `None` where every trial failed.
    pub auc_mean: Vec<Vec<Option<f64>>>,
    pub auc_std: Vec<Vec<Option<f64>>>,
    pub auc_var: Vec<Vec<Option<f64>>>,
    pub failures: Vec<TrialFailure>,
}

impl SweepReport {
    pub fn to_json_string(&self) -> Result<String, EvalError> {
        serde_json::to_string_pretty(self)
            .map_err(|source| EvalError::json("failed to serialize sweep report", source))
    }

    pub fn write_json(&self, path: &Path) -> Result<(), EvalError> {
        let encoded = self.to_json_string()?;
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| EvalError::io(format!("failed to write '{}'", path.display()), source))
    }

    pub fn read_json(path: &Path) -> Result<Self, EvalError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| EvalError::io(format!("failed to read '{}'", path.display()), source))?;
        serde_json::from_str(&raw)
            .map_err(|source| EvalError::json("failed to parse sweep report", source))
    }
}
