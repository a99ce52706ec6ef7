// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SeqadError;

/// One multi-channel example: `F` channels of `LEN` samples each.
///
/// Values are stored channel-major, so `channel(f)` is a contiguous slice of
/// length `len()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    values: Vec<f64>,
    channels: usize,
    len: usize,
}

impl Sequence {
    /// Constructs a validated sequence from channel-major values.
    pub fn new(values: Vec<f64>, channels: usize, len: usize) -> Result<Self, SeqadError> {
        if channels == 0 {
            return Err(SeqadError::invalid_input("sequence channels must be >= 1"));
        }
        if len == 0 {
            return Err(SeqadError::invalid_input("sequence length must be >= 1"));
        }
        let expected = channels.checked_mul(len).ok_or_else(|| {
            SeqadError::invalid_input("channels*len overflow while validating sequence shape")
        })?;
        if values.len() != expected {
            return Err(SeqadError::shape_mismatch(format!(
                "sequence value length mismatch: got {}, expected {expected} (channels={channels}, len={len})",
                values.len()
            )));
        }
        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(SeqadError::invalid_input(format!(
                "sequence values must be finite: channel={}, t={} has {value}",
                idx / len,
                idx % len
            )));
        }

        Ok(Self {
            values,
            channels,
            len,
        })
    }

    /// Builds a sequence from one vector per channel.
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Result<Self, SeqadError> {
        let count = channels.len();
        let len = channels.first().map_or(0, Vec::len);
        if let Some((idx, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != len)
        {
            return Err(SeqadError::shape_mismatch(format!(
                "all channels must share one length: channel 0 has {len}, channel {idx} has {}",
                channel.len()
            )));
        }
        Self::new(channels.into_iter().flatten().collect(), count, len)
    }

    /// Convenience constructor for a single-channel sequence.
    pub fn univariate(values: Vec<f64>) -> Result<Self, SeqadError> {
        let len = values.len();
        Self::new(values, 1, len)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn channel(&self, f: usize) -> &[f64] {
        &self.values[f * self.len..(f + 1) * self.len]
    }

    pub fn channel_mut(&mut self, f: usize) -> &mut [f64] {
        &mut self.values[f * self.len..(f + 1) * self.len]
    }

    pub fn value(&self, f: usize, t: usize) -> f64 {
        self.values[f * self.len + t]
    }
}

/// Discrete per-timestep state labels, parallel to a [`Sequence`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSequence {
    states: Vec<usize>,
}

impl LabelSequence {
    pub fn new(states: Vec<usize>) -> Result<Self, SeqadError> {
        if states.is_empty() {
            return Err(SeqadError::invalid_input("label sequence must not be empty"));
        }
        Ok(Self { states })
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Adjacent `(previous, next)` state pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.states.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// `N` sequences split into a contiguous training prefix and a test suffix.
///
/// The split point is fixed at construction; mutable access only ever hands
/// out the sequences themselves, never the partition.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceCollection {
    sequences: Vec<Sequence>,
    num_train: usize,
    channels: usize,
}

impl SequenceCollection {
    pub fn new(sequences: Vec<Sequence>, num_train: usize) -> Result<Self, SeqadError> {
        let Some(first) = sequences.first() else {
            return Err(SeqadError::invalid_input(
                "sequence collection must contain at least one sequence",
            ));
        };
        if num_train == 0 || num_train > sequences.len() {
            return Err(SeqadError::invalid_input(format!(
                "num_train must be in 1..={}; got {num_train}",
                sequences.len()
            )));
        }
        let channels = first.channels();
        if let Some((idx, seq)) = sequences
            .iter()
            .enumerate()
            .find(|(_, seq)| seq.channels() != channels)
        {
            return Err(SeqadError::shape_mismatch(format!(
                "all sequences must share channel count {channels}; sequence {idx} has {}",
                seq.channels()
            )));
        }

        Ok(Self {
            sequences,
            num_train,
            channels,
        })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn num_train(&self) -> usize {
        self.num_train
    }

    pub fn num_test(&self) -> usize {
        self.sequences.len() - self.num_train
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn sequences_mut(&mut self) -> &mut [Sequence] {
        &mut self.sequences
    }

    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn train(&self) -> &[Sequence] {
        &self.sequences[..self.num_train]
    }

    pub fn test(&self) -> &[Sequence] {
        &self.sequences[self.num_train..]
    }

    /// Returns the shared sequence length, or `ShapeMismatch` when lengths
    /// differ.
    pub fn uniform_len(&self) -> Result<usize, SeqadError> {
        let len = self.sequences[0].len();
        if let Some((idx, seq)) = self
            .sequences
            .iter()
            .enumerate()
            .find(|(_, seq)| seq.len() != len)
        {
            return Err(SeqadError::shape_mismatch(format!(
                "all sequences must share one length: sequence 0 has {len}, sequence {idx} has {}",
                seq.len()
            )));
        }
        Ok(len)
    }

    /// Checks that `labels` is parallel to the collection, timestep by
    /// timestep.
    pub fn check_labels(&self, labels: &[LabelSequence]) -> Result<(), SeqadError> {
        if labels.len() != self.sequences.len() {
            return Err(SeqadError::shape_mismatch(format!(
                "expected one label sequence per example: {} sequences, {} label sequences",
                self.sequences.len(),
                labels.len()
            )));
        }
        for (idx, (seq, lbl)) in self.sequences.iter().zip(labels).enumerate() {
            if seq.len() != lbl.len() {
                return Err(SeqadError::shape_mismatch(format!(
                    "label length mismatch at example {idx}: sequence len {}, label len {}",
                    seq.len(),
                    lbl.len()
                )));
            }
        }
        Ok(())
    }
}
