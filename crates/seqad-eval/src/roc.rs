// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use seqad_core::SeqadError;
use serde::{Deserialize, Serialize};

/// Point on an ROC curve; examples scoring `>= threshold` are flagged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub true_positive_rate: f64,
    pub false_positive_rate: f64,
}

/// ROC curve of `scores` against `anomalous` labels.
///
/// Anomalous examples are the positive class and higher scores mean more
/// anomalous. Tied scores share one threshold. The curve starts at `(0, 0)`
/// with an infinite threshold and ends at `(1, 1)`.
pub fn roc_curve(scores: &[f64], anomalous: &[bool]) -> Result<Vec<RocPoint>, SeqadError> {
    if scores.len() != anomalous.len() {
        return Err(SeqadError::shape_mismatch(format!(
            "roc needs one label per score: {} scores, {} labels",
            scores.len(),
            anomalous.len()
        )));
    }
    if let Some((idx, score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(SeqadError::numerical_issue(format!(
            "scores must be finite; scores[{idx}]={score}"
        )));
    }
    let positives = anomalous.iter().filter(|&&a| a).count();
    let negatives = anomalous.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(SeqadError::invalid_input(format!(
            "roc is undefined with a single class: {positives} anomalous, {negatives} nominal"
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = Vec::with_capacity(scores.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        true_positive_rate: 0.0,
        false_positive_rate: 0.0,
    });
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut idx = 0usize;
    while idx < order.len() {
        let threshold = scores[order[idx]];
        while idx < order.len() && scores[order[idx]] == threshold {
            if anomalous[order[idx]] {
                tp += 1;
            } else {
                fp += 1;
            }
            idx += 1;
        }
        points.push(RocPoint {
            threshold,
            true_positive_rate: tp as f64 / positives as f64,
            false_positive_rate: fp as f64 / negatives as f64,
        });
    }
    Ok(points)
}

/// Area under `curve` by the trapezoid rule over false-positive rate.
pub fn auc(curve: &[RocPoint]) -> f64 {
    curve
        .windows(2)
        .map(|pair| {
            let width = pair[1].false_positive_rate - pair[0].false_positive_rate;
            width * (pair[0].true_positive_rate + pair[1].true_positive_rate) / 2.0
        })
        .sum()
}

pub fn roc_auc(scores: &[f64], anomalous: &[bool]) -> Result<f64, SeqadError> {
    roc_curve(scores, anomalous).map(|curve| auc(&curve))
}
