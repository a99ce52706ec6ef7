// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use log::debug;
use seqad_core::{SeqadError, Sequence, SequenceCollection};

/// Per-channel centering and scaling statistics fitted on a training prefix.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationStats {
    /// Timestep-weighted mean of each channel over the training prefix.
    pub mean: Vec<f64>,
    /// Largest absolute centered value of each channel over the training
    /// prefix.
    pub max_abs: Vec<f64>,
}

impl NormalizationStats {
    pub fn channels(&self) -> usize {
        self.mean.len()
    }
}

/// Mean and max-abs of each channel over some set of sequences.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSummary {
    pub mean: Vec<f64>,
    pub max_abs: Vec<f64>,
    pub timesteps: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub notes: Vec<String>,
}

/// Everything `normalize_collection` learned and checked.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationReport {
    pub stats: NormalizationStats,
    /// Diagnostic summary of the whole normalized collection. Never fed back
    /// into the fitted statistics.
    pub post: ChannelSummary,
    pub steps: Vec<StepReport>,
}

/// Fits normalization statistics on the training prefix of a collection.
///
/// Fitting only ever reads `collection.train()`; the test suffix cannot
/// influence the statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn fit(collection: &SequenceCollection) -> Result<FittedNormalizer, SeqadError> {
        let channels = collection.channels();
        let train = collection.train();

        let mean = channel_means(train, channels);

        let mut max_abs = vec![0.0_f64; channels];
        for seq in train {
            for (d, slot) in max_abs.iter_mut().enumerate() {
                let centered_max = seq
                    .channel(d)
                    .iter()
                    .fold(0.0_f64, |acc, v| acc.max((v - mean[d]).abs()));
                *slot = slot.max(centered_max);
            }
        }

        if let Some((channel, _)) = max_abs.iter().enumerate().find(|(_, m)| **m == 0.0) {
            return Err(SeqadError::degenerate_channel(
                channel,
                format!(
                    "training max abs value is zero after centering (mean={}); channel is constant over {} training sequences",
                    mean[channel],
                    train.len()
                ),
            ));
        }

        debug!(
            "normalization fitted on {} training sequences: mean={mean:?}, max_abs={max_abs:?}",
            train.len()
        );
        Ok(FittedNormalizer {
            stats: NormalizationStats { mean, max_abs },
        })
    }
}

/// Normalizer with frozen statistics, ready to transform collections.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedNormalizer {
    stats: NormalizationStats,
}

impl FittedNormalizer {
    /// Rebuilds a fitted normalizer from previously computed statistics.
    pub fn from_stats(stats: NormalizationStats) -> Result<Self, SeqadError> {
        if stats.mean.len() != stats.max_abs.len() {
            return Err(SeqadError::shape_mismatch(format!(
                "normalization stats disagree on channel count: mean has {}, max_abs has {}",
                stats.mean.len(),
                stats.max_abs.len()
            )));
        }
        if let Some((channel, value)) = stats
            .max_abs
            .iter()
            .copied()
            .enumerate()
            .find(|(_, m)| *m == 0.0 || !m.is_finite())
        {
            return Err(SeqadError::degenerate_channel(
                channel,
                format!("max_abs must be finite and non-zero; got {value}"),
            ));
        }
        Ok(Self { stats })
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Centers and scales one sequence in place.
    pub fn apply(&self, seq: &mut Sequence) -> Result<(), SeqadError> {
        if seq.channels() != self.stats.channels() {
            return Err(SeqadError::shape_mismatch(format!(
                "normalizer fitted on {} channels, sequence has {}",
                self.stats.channels(),
                seq.channels()
            )));
        }
        for d in 0..self.stats.channels() {
            let mean = self.stats.mean[d];
            let scale = self.stats.max_abs[d];
            for v in seq.channel_mut(d) {
                *v = (*v - mean) / scale;
            }
        }
        Ok(())
    }

    /// Applies the statistics to every sequence, train and test alike.
    pub fn transform(
        &self,
        mut collection: SequenceCollection,
    ) -> Result<SequenceCollection, SeqadError> {
        for seq in collection.sequences_mut() {
            self.apply(seq)?;
        }
        Ok(collection)
    }
}

/// Summarizes every sequence of the collection, train and test.
pub fn consistency_check(collection: &SequenceCollection) -> ChannelSummary {
    let channels = collection.channels();
    let sequences = collection.sequences();
    let mut max_abs = vec![0.0_f64; channels];
    for seq in sequences {
        for (d, slot) in max_abs.iter_mut().enumerate() {
            let m = seq.channel(d).iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            *slot = slot.max(m);
        }
    }
    ChannelSummary {
        mean: channel_means(sequences, channels),
        max_abs,
        timesteps: sequences.iter().map(Sequence::len).sum(),
    }
}

/// Fits on the training prefix, transforms the whole collection and runs the
/// diagnostic consistency pass.
pub fn normalize_collection(
    collection: SequenceCollection,
) -> Result<(SequenceCollection, NormalizationReport), SeqadError> {
    let fitted = Normalizer::fit(&collection)?;
    let num_train = collection.num_train();
    let normalized = fitted.transform(collection)?;
    let post = consistency_check(&normalized);
    debug!(
        "post-normalization summary over {} sequences: mean={:?}, max_abs={:?}",
        normalized.len(),
        post.mean,
        post.max_abs
    );

    let stats = fitted.stats().clone();
    let steps = vec![
        StepReport {
            step: "fit".to_string(),
            notes: vec![
                format!("num_train={num_train}"),
                format!("mean={:?}", stats.mean),
                format!("max_abs={:?}", stats.max_abs),
            ],
        },
        StepReport {
            step: "transform".to_string(),
            notes: vec![format!("sequences={}", normalized.len())],
        },
        StepReport {
            step: "consistency_check".to_string(),
            notes: vec![
                format!("mean={:?}", post.mean),
                format!("max_abs={:?}", post.max_abs),
            ],
        },
    ];

    Ok((normalized, NormalizationReport { stats, post, steps }))
}

fn channel_means(sequences: &[Sequence], channels: usize) -> Vec<f64> {
    let mut sums = vec![0.0; channels];
    let mut count = 0usize;
    for seq in sequences {
        count += seq.len();
        for (d, sum) in sums.iter_mut().enumerate() {
            *sum += seq.channel(d).iter().sum::<f64>();
        }
    }
    if count == 0 {
        return sums;
    }
    sums.into_iter().map(|s| s / count as f64).collect()
}

pub fn crate_name() -> &'static str {
    let _ = seqad_core::crate_name();
    "seqad-preprocess"
}
