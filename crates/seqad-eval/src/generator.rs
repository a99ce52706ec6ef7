// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::{LabelSequence, SeqadError, Sequence, StableRng};

/// Parameters for one generated example.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationRequest {
    pub length: usize,
    pub block_length: usize,
    pub anomaly_probability: f64,
    pub num_blocks: usize,
}

/// One generated example with its per-timestep states and example-level
/// anomaly marker.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedSequence {
    pub sequence: Sequence,
    pub labels: LabelSequence,
    pub anomalous: bool,
}

/// Source of synthetic labeled sequences.
///
/// The harness hands every call a seeded rng so sweeps are reproducible
/// whenever the generator draws all randomness from it.
pub trait SequenceGenerator {
    fn generate(
        &mut self,
        request: &GenerationRequest,
        rng: &mut StableRng,
    ) -> Result<GeneratedSequence, SeqadError>;
}
