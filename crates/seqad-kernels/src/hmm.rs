// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::bounded_feature_len;
use seqad_core::{LabelSequence, SeqadError, Sequence, SequenceCollection};

/// Result of decoding one example under a parameter vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// Score of the best latent path, `sol . features`.
    pub score: f64,
    pub path: Vec<usize>,
    /// Joint feature vector of the example and `path`; the gradient of the
    /// path score with respect to the parameters.
    pub features: Vec<f64>,
}

/// Generative sequence model consumed by the Fisher-kernel builder.
pub trait SequenceModel: Sized {
    /// Builds the model over a full collection with `states` latent states.
    fn from_collection(
        collection: &SequenceCollection,
        labels: &[LabelSequence],
        states: usize,
    ) -> Result<Self, SeqadError>;

    /// Length of parameter and feature vectors.
    fn parameter_len(&self) -> usize;

    fn decode(&self, sol: &[f64], example: usize) -> Result<Decoded, SeqadError>;
}

/// Length `K*K + K*F` of the parameter layout shared by [`StructuredHmm`]
/// and the Fisher builder, rejected when it overflows or exceeds
/// [`crate::MAX_FEATURE_LEN`].
pub fn parameter_len(states: usize, channels: usize) -> Result<usize, SeqadError> {
    let len = states
        .checked_mul(states)
        .zip(states.checked_mul(channels))
        .and_then(|(transitions, emissions)| transitions.checked_add(emissions));
    bounded_feature_len(
        &format!("parameter vector for {states} states and {channels} channels"),
        len,
    )
}

/// Structured-output HMM with linear transition and emission scores.
///
/// Parameters are laid out as `K*K` transition weights (row-major, previous
/// state first) followed by `K*F` emission weights (row-major, state first).
/// The score of a path `y` over example `x` is
/// `sum_t A[y(t-1), y(t)] + sum_t sum_f E[y(t), f] * x[f, t]`.
#[derive(Clone, Debug)]
pub struct StructuredHmm {
    sequences: Vec<Sequence>,
    labels: Vec<LabelSequence>,
    states: usize,
    channels: usize,
}

impl StructuredHmm {
    pub fn states(&self) -> usize {
        self.states
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    fn transition_index(&self, prev: usize, next: usize) -> usize {
        prev * self.states + next
    }

    fn emission_index(&self, state: usize, channel: usize) -> usize {
        self.states * self.states + state * self.channels + channel
    }

    fn example(&self, example: usize) -> Result<&Sequence, SeqadError> {
        self.sequences.get(example).ok_or_else(|| {
            SeqadError::invalid_input(format!(
                "example index {example} out of bounds for {} sequences",
                self.sequences.len()
            ))
        })
    }

    /// Joint feature vector of `example` under an explicit latent path:
    /// transition counts followed by per-state emission sums.
    pub fn joint_feature_map(&self, example: usize, path: &[usize]) -> Result<Vec<f64>, SeqadError> {
        let seq = self.example(example)?;
        if path.len() != seq.len() {
            return Err(SeqadError::shape_mismatch(format!(
                "latent path length {} does not match sequence length {} at example {example}",
                path.len(),
                seq.len()
            )));
        }
        if let Some(&bad) = path.iter().find(|&&s| s >= self.states) {
            return Err(SeqadError::invalid_input(format!(
                "state {bad} out of range for {} states at example {example}",
                self.states
            )));
        }

        let mut psi = vec![0.0; self.parameter_len()];
        for pair in path.windows(2) {
            psi[self.transition_index(pair[0], pair[1])] += 1.0;
        }
        for (t, &state) in path.iter().enumerate() {
            for f in 0..self.channels {
                psi[self.emission_index(state, f)] += seq.value(f, t);
            }
        }
        Ok(psi)
    }

    /// Joint feature vector of `example` under its stored labels.
    pub fn labeled_feature_map(&self, example: usize) -> Result<Vec<f64>, SeqadError> {
        let labels = self.labels.get(example).ok_or_else(|| {
            SeqadError::invalid_input(format!("no labels stored for example {example}"))
        })?;
        self.joint_feature_map(example, labels.states())
    }

    fn emission_score(&self, sol: &[f64], seq: &Sequence, state: usize, t: usize) -> f64 {
        (0..self.channels)
            .map(|f| sol[self.emission_index(state, f)] * seq.value(f, t))
            .sum()
    }

    fn viterbi(&self, sol: &[f64], seq: &Sequence) -> (f64, Vec<usize>) {
        let k = self.states;
        let len = seq.len();
        let mut delta: Vec<f64> = (0..k).map(|s| self.emission_score(sol, seq, s, 0)).collect();
        let mut backptr = vec![0usize; len * k];

        for t in 1..len {
            let mut next = vec![0.0; k];
            for (j, slot) in next.iter_mut().enumerate() {
                let mut best_state = 0usize;
                let mut best = delta[0] + sol[self.transition_index(0, j)];
                for (i, &prev) in delta.iter().enumerate().skip(1) {
                    let candidate = prev + sol[self.transition_index(i, j)];
                    if candidate > best {
                        best = candidate;
                        best_state = i;
                    }
                }
                backptr[t * k + j] = best_state;
                *slot = best + self.emission_score(sol, seq, j, t);
            }
            delta = next;
        }

        let mut last = 0usize;
        for (s, &value) in delta.iter().enumerate().skip(1) {
            if value > delta[last] {
                last = s;
            }
        }
        let score = delta[last];

        let mut path = vec![0usize; len];
        path[len - 1] = last;
        for t in (1..len).rev() {
            path[t - 1] = backptr[t * k + path[t]];
        }
        (score, path)
    }
}

impl SequenceModel for StructuredHmm {
    fn from_collection(
        collection: &SequenceCollection,
        labels: &[LabelSequence],
        states: usize,
    ) -> Result<Self, SeqadError> {
        if states == 0 {
            return Err(SeqadError::invalid_input(
                "structured hmm needs at least one latent state",
            ));
        }
        parameter_len(states, collection.channels())?;
        collection.check_labels(labels)?;
        Ok(Self {
            sequences: collection.sequences().to_vec(),
            labels: labels.to_vec(),
            states,
            channels: collection.channels(),
        })
    }

    fn parameter_len(&self) -> usize {
        self.states * self.states + self.states * self.channels
    }

    /// Viterbi argmax; ties resolve toward the lower state index.
    fn decode(&self, sol: &[f64], example: usize) -> Result<Decoded, SeqadError> {
        if sol.len() != self.parameter_len() {
            return Err(SeqadError::shape_mismatch(format!(
                "parameter vector has length {}, expected {} (states={}, channels={})",
                sol.len(),
                self.parameter_len(),
                self.states,
                self.channels
            )));
        }
        let seq = self.example(example)?;
        let (score, path) = self.viterbi(sol, seq);
        let features = self.joint_feature_map(example, &path)?;
        Ok(Decoded {
            score,
            path,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SequenceModel, StructuredHmm, parameter_len};
    use seqad_core::{LabelSequence, SeqadError, Sequence, SequenceCollection};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn model(values: &[f64], labels: &[usize], states: usize) -> StructuredHmm {
        let coll = SequenceCollection::new(
            vec![Sequence::univariate(values.to_vec()).expect("valid sequence")],
            1,
        )
        .expect("valid collection");
        let lbl = vec![LabelSequence::new(labels.to_vec()).expect("valid labels")];
        StructuredHmm::from_collection(&coll, &lbl, states).expect("valid model")
    }

    #[test]
    fn joint_feature_map_counts_transitions_and_sums_emissions() {
        let hmm = model(&[1.0, 2.0, 3.0, 4.0], &[0, 1, 1, 0], 2);
        let psi = hmm.labeled_feature_map(0).expect("psi");
        // transitions: (0,1), (1,1), (1,0)
        assert_eq!(&psi[0..4], &[0.0, 1.0, 1.0, 1.0]);
        // emissions: state 0 -> 1 + 4, state 1 -> 2 + 3
        assert_eq!(&psi[4..6], &[5.0, 5.0]);
    }

    #[test]
    fn decode_follows_emission_sign() {
        let hmm = model(&[-1.0, -2.0, 3.0, 4.0], &[0, 0, 0, 0], 2);
        // no transition preference; state 0 rewards negative, state 1 positive
        let sol = [0.0, 0.0, 0.0, 0.0, -1.0, 1.0];
        let decoded = hmm.decode(&sol, 0).expect("decode");
        assert_eq!(decoded.path, vec![0, 0, 1, 1]);
        assert_close(decoded.score, 10.0, 1e-12);
        let dot: f64 = sol.iter().zip(&decoded.features).map(|(a, b)| a * b).sum();
        assert_close(dot, decoded.score, 1e-12);
    }

    #[test]
    fn transition_weights_can_override_emissions() {
        let hmm = model(&[-1.0, 0.5, -1.0], &[0, 0, 0], 2);
        // staying in state 0 pays more than switching for one step
        let sol = [5.0, 0.0, 0.0, 0.0, -1.0, 1.0];
        let decoded = hmm.decode(&sol, 0).expect("decode");
        assert_eq!(decoded.path, vec![0, 0, 0]);
    }

    #[test]
    fn ties_resolve_to_lowest_state() {
        let hmm = model(&[1.0, 1.0], &[0, 0], 3);
        let sol = vec![0.0; hmm.parameter_len()];
        let decoded = hmm.decode(&sol, 0).expect("decode");
        assert_eq!(decoded.path, vec![0, 0]);
    }

    #[test]
    fn wrong_parameter_length_and_bad_index_are_rejected() {
        let hmm = model(&[1.0, 2.0], &[0, 1], 2);
        assert!(hmm.decode(&[0.0; 5], 0).is_err());
        assert!(hmm.decode(&[0.0; 6], 1).is_err());
        assert!(hmm.joint_feature_map(0, &[0, 2]).is_err());
        assert!(hmm.joint_feature_map(0, &[0]).is_err());
    }

    #[test]
    fn parameter_layout_length_is_checked() {
        assert_eq!(parameter_len(2, 3).expect("small"), 2 * 2 + 2 * 3);
        assert!(matches!(
            parameter_len(usize::MAX, 1),
            Err(SeqadError::InvalidInput(_))
        ));
        let coll = SequenceCollection::new(
            vec![Sequence::univariate(vec![1.0]).expect("valid sequence")],
            1,
        )
        .expect("valid collection");
        let lbl = vec![LabelSequence::new(vec![0]).expect("valid labels")];
        assert!(StructuredHmm::from_collection(&coll, &lbl, 1 << 13).is_err());
    }
}
