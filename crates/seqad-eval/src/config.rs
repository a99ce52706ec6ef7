// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::detectors::DetectorKind;
use crate::error::EvalError;
use seqad_core::SeqadError;
use seqad_kernels::KernelMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One detector configuration of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodConfig {
    pub detector: DetectorKind,
    /// Kernel method tag (`linear`, `rbf`, `hist`, `fisher`, `fisher-rand`).
    /// Ignored by detectors that do not consume a kernel.
    #[serde(default)]
    pub kernel: String,
    #[serde(default)]
    pub param: f64,
    /// Feature normalization order; values below 1 disable normalization.
    pub ord: f64,
}

impl MethodConfig {
    pub fn new(detector: DetectorKind, kernel: impl Into<String>, param: f64, ord: f64) -> Self {
        Self {
            detector,
            kernel: kernel.into(),
            param,
            ord,
        }
    }

    /// Kernel method to build for this detector, `None` when the detector
    /// works on raw sequences.
    pub fn kernel_method(&self) -> Result<Option<KernelMethod>, SeqadError> {
        if !self.detector.needs_kernel() {
            return Ok(None);
        }
        KernelMethod::from_tag(&self.kernel, self.param).map(Some)
    }

    /// Report name, e.g. `OcSvm (RBF 0.1) [1]`, `Bayes (Linear) [1]` or
    /// `HMAD [1]`.
    pub fn display_name(&self) -> String {
        let kernel = match self.kernel.trim().to_ascii_lowercase().as_str() {
            "rbf" | "hist" => format!(" ({} {})", self.kernel, self.param),
            "linear" => format!(" ({})", self.kernel),
            _ => String::new(),
        };
        format!("{}{kernel} [{}]", self.detector.display_name(), self.ord)
    }
}

/// Full description of a sweep: data shape, contamination levels, repetitions
/// and the detector lineup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Timesteps per generated sequence.
    pub length: usize,
    pub examples: usize,
    /// Size of the training prefix; the rest is the test partition.
    pub train_examples: usize,
    pub repetitions: usize,
    pub block_length: usize,
    pub blocks: usize,
    /// Contamination (anomaly probability) levels.
    pub levels: Vec<f64>,
    pub methods: Vec<MethodConfig>,
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            length: 600,
            examples: 800,
            train_examples: 400,
            repetitions: 50,
            block_length: 120,
            blocks: 2,
            levels: vec![0.025, 0.05, 0.1, 0.15, 0.2, 0.3],
            methods: vec![
                MethodConfig::new(DetectorKind::Bayes, "Linear", 1.0, 1.0),
                MethodConfig::new(DetectorKind::Hmad { zero_shot: false }, "", 0.0, 1.0),
                MethodConfig::new(DetectorKind::OcSvm, "Fisher", 2.0, 1.0),
                MethodConfig::new(DetectorKind::OcSvm, "Fisher-Rand", 2.0, 1.0),
            ],
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), SeqadError> {
        if self.length == 0 {
            return Err(SeqadError::invalid_input("length must be >= 1"));
        }
        if self.block_length == 0 || self.block_length > self.length {
            return Err(SeqadError::invalid_input(format!(
                "block_length must be in 1..={}; got {}",
                self.length, self.block_length
            )));
        }
        if self.blocks == 0 {
            return Err(SeqadError::invalid_input("blocks must be >= 1"));
        }
        if self.train_examples == 0 || self.train_examples >= self.examples {
            return Err(SeqadError::invalid_input(format!(
                "train_examples must leave a non-empty test partition: train_examples={}, examples={}",
                self.train_examples, self.examples
            )));
        }
        if self.repetitions == 0 {
            return Err(SeqadError::invalid_input("repetitions must be >= 1"));
        }
        if self.levels.is_empty() {
            return Err(SeqadError::invalid_input(
                "at least one contamination level is required",
            ));
        }
        for (idx, level) in self.levels.iter().enumerate() {
            if !(*level > 0.0 && *level <= 1.0) {
                return Err(SeqadError::invalid_input(format!(
                    "contamination levels must be in (0, 1]; levels[{idx}]={level}"
                )));
            }
        }
        if self.methods.is_empty() {
            return Err(SeqadError::invalid_input("at least one method is required"));
        }
        for (idx, method) in self.methods.iter().enumerate() {
            if method.ord.is_nan() {
                return Err(SeqadError::invalid_input(format!(
                    "methods[{idx}].ord must not be NaN"
                )));
            }
            method.kernel_method().map_err(|err| {
                SeqadError::invalid_input(format!("methods[{idx}] ({}): {err}", method.display_name()))
            })?;
        }
        Ok(())
    }

    /// Parses and validates a JSON config. Missing fields take their
    /// default values.
    pub fn from_json_str(raw: &str) -> Result<Self, EvalError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|source| EvalError::json("failed to parse experiment config", source))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EvalError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| EvalError::io(format!("failed to read '{}'", path.display()), source))?;
        Self::from_json_str(&raw)
    }

    pub fn display_names(&self) -> Vec<String> {
        self.methods.iter().map(MethodConfig::display_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ExperimentConfig, MethodConfig};
    use crate::detectors::DetectorKind;
    use seqad_kernels::KernelMethod;

    #[test]
    fn default_config_is_valid_and_named() {
        let config = ExperimentConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(
            config.display_names(),
            vec!["Bayes (Linear) [1]", "HMAD [1]", "OcSvm [1]", "OcSvm [1]"]
        );
    }

    #[test]
    fn display_names_show_parameters_for_rbf_and_hist() {
        assert_eq!(
            MethodConfig::new(DetectorKind::OcSvm, "RBF", 0.1, 1.0).display_name(),
            "OcSvm (RBF 0.1) [1]"
        );
        assert_eq!(
            MethodConfig::new(DetectorKind::OcSvm, "Hist", 8.0, 2.0).display_name(),
            "OcSvm (Hist 8) [2]"
        );
    }

    #[test]
    fn kernel_method_is_skipped_for_raw_sequence_detectors() {
        let hmad = MethodConfig::new(DetectorKind::Hmad { zero_shot: true }, "", 0.0, 1.0);
        assert_eq!(hmad.kernel_method().expect("hmad"), None);
        let fisher = MethodConfig::new(DetectorKind::OcSvm, "Fisher", 2.0, 1.0);
        assert_eq!(
            fisher.kernel_method().expect("fisher"),
            Some(KernelMethod::Fisher { states: 2 })
        );
    }

    #[test]
    fn validation_rejects_bad_partitions_levels_and_kernels() {
        let mut config = ExperimentConfig {
            train_examples: 800,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());

        config.train_examples = 400;
        config.levels = vec![0.1, 0.0];
        assert!(config.validate().is_err());

        config.levels = vec![0.1];
        config.methods = vec![MethodConfig::new(DetectorKind::OcSvm, "poly", 2.0, 1.0)];
        let err = config.validate().expect_err("unknown kernel");
        assert!(err.to_string().contains("methods[0]"));
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let raw = r#"{
            "repetitions": 2,
            "levels": [0.1],
            "methods": [
                {"detector": {"name": "ocsvm"}, "kernel": "Hist", "param": 4, "ord": 1},
                {"detector": {"name": "hmad", "zero_shot": true}, "ord": 1}
            ]
        }"#;
        let config = ExperimentConfig::from_json_str(raw).expect("config");
        assert_eq!(config.repetitions, 2);
        assert_eq!(config.length, 600);
        assert_eq!(config.methods[1].detector, DetectorKind::Hmad { zero_shot: true });
        assert_eq!(config.display_names()[0], "OcSvm (Hist 4) [1]");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = ExperimentConfig::from_json_str("{").expect_err("malformed");
        assert_eq!(err.code(), "json_error");
        let err = ExperimentConfig::from_json_str(r#"{"repetitions": 0}"#).expect_err("invalid");
        assert_eq!(err.code(), "invalid_input");
    }
}
