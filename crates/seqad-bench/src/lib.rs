// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::{LabelSequence, SeqadError, Sequence, SequenceCollection, StableRng};

/// Deterministic two-state collection for benchmarks: state 1 runs shift the
/// signal up by two.
pub fn two_state_collection(
    examples: usize,
    num_train: usize,
    channels: usize,
    len: usize,
    seed: u64,
) -> Result<(SequenceCollection, Vec<LabelSequence>), SeqadError> {
    let mut rng = StableRng::new(seed);
    let mut sequences = Vec::with_capacity(examples);
    let mut labels = Vec::with_capacity(examples);
    for _ in 0..examples {
        let states: Vec<usize> = (0..len).map(|t| usize::from((t / 16) % 2 == 1)).collect();
        let values = (0..channels)
            .flat_map(|_| {
                states
                    .iter()
                    .map(|&s| 2.0 * s as f64 + rng.next_f64() - 0.5)
                    .collect::<Vec<_>>()
            })
            .collect();
        sequences.push(Sequence::new(values, channels, len)?);
        labels.push(LabelSequence::new(states)?);
    }
    Ok((SequenceCollection::new(sequences, num_train)?, labels))
}

/// Benchmark fixtures for seqad.
pub fn crate_name() -> &'static str {
    "seqad-bench"
}
