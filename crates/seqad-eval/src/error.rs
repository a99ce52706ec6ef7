// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::SeqadError;
use thiserror::Error;

/// Errors raised around a sweep: configuration loading and report output.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Seqad(#[from] SeqadError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EvalError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Seqad(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}
