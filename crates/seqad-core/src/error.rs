// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error type shared by every seqad crate.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SeqadError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Sequences (or labels) of unequal shape fed to a consumer that needs
    /// uniform shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// A feature or histogram vector whose norm is zero cannot be
    /// unit-normalized.
    #[error("zero norm: {0}")]
    ZeroNorm(String),
    /// A training channel with zero spread after centering.
    #[error("degenerate channel {channel}: {message}")]
    DegenerateChannel { channel: usize, message: String },
    /// A latent state that never occurs in the training labels.
    #[error("degenerate state {state}: {message}")]
    DegenerateState { state: usize, message: String },
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    /// Raised by external detector adapters when their solver fails.
    #[error("solver did not converge: {0}")]
    SolverNonConvergence(String),
}

impl SeqadError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn zero_norm(msg: impl Into<String>) -> Self {
        Self::ZeroNorm(msg.into())
    }

    pub fn degenerate_channel(channel: usize, msg: impl Into<String>) -> Self {
        Self::DegenerateChannel {
            channel,
            message: msg.into(),
        }
    }

    pub fn degenerate_state(state: usize, msg: impl Into<String>) -> Self {
        Self::DegenerateState {
            state,
            message: msg.into(),
        }
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn solver_non_convergence(msg: impl Into<String>) -> Self {
        Self::SolverNonConvergence(msg.into())
    }

    /// Stable machine-readable code, used in persisted failure records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ShapeMismatch(_) => "shape_mismatch",
            Self::ZeroNorm(_) => "zero_norm",
            Self::DegenerateChannel { .. } => "degenerate_channel",
            Self::DegenerateState { .. } => "degenerate_state",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::SolverNonConvergence(_) => "solver_non_convergence",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SeqadError;

    #[test]
    fn constructors_map_to_expected_variants_and_codes() {
        let cases = [
            (SeqadError::invalid_input("x"), "invalid_input"),
            (SeqadError::shape_mismatch("x"), "shape_mismatch"),
            (SeqadError::zero_norm("x"), "zero_norm"),
            (SeqadError::degenerate_channel(2, "x"), "degenerate_channel"),
            (SeqadError::degenerate_state(1, "x"), "degenerate_state"),
            (SeqadError::numerical_issue("x"), "numerical_issue"),
            (
                SeqadError::solver_non_convergence("x"),
                "solver_non_convergence",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn display_includes_channel_index() {
        let err = SeqadError::degenerate_channel(3, "max abs value is zero");
        assert_eq!(
            err.to_string(),
            "degenerate channel 3: max abs value is zero"
        );
    }
}
