// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::BuiltKernel;
use crate::gram::{KernelType, gram_symmetric};
use crate::hmm::{SequenceModel, parameter_len};
use log::debug;
use seqad_core::{
    LabelSequence, Matrix, SeqadError, SequenceCollection, StableRng, normalize_lp,
};

/// How the parameter vector handed to the sequence model is obtained.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FisherMode {
    /// Count-based estimate from the training labels.
    Estimated,
    /// Uniform `[0, 1)` draws; an uninformative model for comparison.
    Randomized { seed: u64 },
}

/// Parameters of the generative model used to derive Fisher features.
#[derive(Clone, Debug, PartialEq)]
pub struct FisherParameters {
    pub states: usize,
    pub channels: usize,
    /// `K x K` row-major, `[prev * K + next]`. Empty in randomized mode.
    pub transitions: Vec<f64>,
    /// `K x F` row-major, `[state * F + channel]`. Empty in randomized mode.
    pub emissions: Vec<f64>,
    /// `vec(A)` followed by `vec(E)`, length `K*K + K*F`.
    pub sol: Vec<f64>,
}

/// Fisher kernel output together with the parameters it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct FisherKernel {
    pub built: BuiltKernel,
    pub parameters: FisherParameters,
}

/// Estimates transition and emission parameters from the training prefix.
///
/// Emissions are per-state means. Transitions are raw pair counts divided by
/// the total number of training timesteps; rows are deliberately NOT
/// normalized to sum to one, so `A` is not a proper transition-probability
/// matrix. Fisher features are built from exactly this estimate.
pub fn estimate_parameters(
    collection: &SequenceCollection,
    labels: &[LabelSequence],
    states: usize,
) -> Result<FisherParameters, SeqadError> {
    if states == 0 {
        return Err(SeqadError::invalid_input(
            "fisher kernel needs at least one latent state",
        ));
    }
    let channels = collection.channels();
    let len = parameter_len(states, channels)?;
    collection.check_labels(labels)?;

    let mut transitions = vec![0.0; states * states];
    let mut emissions = vec![0.0; states * channels];
    let mut state_counts = vec![0usize; states];
    let mut timesteps = 0usize;

    for (n, (seq, lbl)) in collection.train().iter().zip(labels).enumerate() {
        if let Some(&bad) = lbl.states().iter().find(|&&s| s >= states) {
            return Err(SeqadError::invalid_input(format!(
                "training label {bad} at example {n} is out of range for {states} states"
            )));
        }
        for (prev, next) in lbl.transitions() {
            transitions[prev * states + next] += 1.0;
        }
        for (t, &state) in lbl.states().iter().enumerate() {
            state_counts[state] += 1;
            for f in 0..channels {
                emissions[state * channels + f] += seq.value(f, t);
            }
        }
        timesteps += seq.len();
    }

    for (state, &count) in state_counts.iter().enumerate() {
        if count == 0 {
            return Err(SeqadError::degenerate_state(
                state,
                "state never occurs in the training labels; emission mean is undefined",
            ));
        }
        for value in &mut emissions[state * channels..(state + 1) * channels] {
            *value /= count as f64;
        }
    }
    for value in &mut transitions {
        *value /= timesteps as f64;
    }

    let mut sol = Vec::with_capacity(len);
    sol.extend_from_slice(&transitions);
    sol.extend_from_slice(&emissions);
    Ok(FisherParameters {
        states,
        channels,
        transitions,
        emissions,
        sol,
    })
}

/// Uniform `[0, 1)` parameter vector of the estimated layout's length.
pub fn random_parameters(
    states: usize,
    channels: usize,
    seed: u64,
) -> Result<FisherParameters, SeqadError> {
    let len = parameter_len(states, channels)?;
    let mut rng = StableRng::new(seed);
    Ok(FisherParameters {
        states,
        channels,
        transitions: vec![],
        emissions: vec![],
        sol: rng.uniform_vec(len),
    })
}

/// Fisher-score kernel.
///
/// The model is instantiated over the whole collection; only parameter
/// estimation is restricted to the training prefix.
pub fn build_fisher_kernel<M>(
    collection: &SequenceCollection,
    labels: &[LabelSequence],
    states: usize,
    ord: f64,
    mode: FisherMode,
) -> Result<FisherKernel, SeqadError>
where
    M: SequenceModel + Sync,
{
    if states == 0 {
        return Err(SeqadError::invalid_input(
            "fisher kernel needs at least one latent state",
        ));
    }
    let parameters = match mode {
        FisherMode::Estimated => estimate_parameters(collection, labels, states)?,
        FisherMode::Randomized { seed } => random_parameters(states, collection.channels(), seed)?,
    };
    debug!(
        "fisher parameters ({mode:?}): states={states}, channels={}, len={}",
        parameters.channels,
        parameters.sol.len()
    );

    let model = M::from_collection(collection, labels, states)?;
    if model.parameter_len() != parameters.sol.len() {
        return Err(SeqadError::shape_mismatch(format!(
            "model expects {} parameters, estimate has {}",
            model.parameter_len(),
            parameters.sol.len()
        )));
    }

    let columns = decode_columns(&model, &parameters.sol, collection.len(), ord)?;
    let phi = Matrix::from_columns(columns)?;
    let kernel = gram_symmetric(&phi, KernelType::Linear)?;
    Ok(FisherKernel {
        built: BuiltKernel {
            kernel,
            notes: vec![
                "builder=fisher".to_string(),
                format!("states={states}"),
                format!("ord={ord}"),
                format!("mode={mode:?}"),
            ],
            phi,
        },
        parameters,
    })
}

fn decode_column<M: SequenceModel>(
    model: &M,
    sol: &[f64],
    example: usize,
    ord: f64,
) -> Result<Vec<f64>, SeqadError> {
    let mut features = model.decode(sol, example)?.features;
    normalize_lp(&mut features, ord, &format!("fisher feature column {example}"))?;
    Ok(features)
}

#[cfg(not(feature = "rayon"))]
fn decode_columns<M: SequenceModel + Sync>(
    model: &M,
    sol: &[f64],
    examples: usize,
    ord: f64,
) -> Result<Vec<Vec<f64>>, SeqadError> {
    (0..examples)
        .map(|n| decode_column(model, sol, n, ord))
        .collect()
}

#[cfg(feature = "rayon")]
fn decode_columns<M: SequenceModel + Sync>(
    model: &M,
    sol: &[f64],
    examples: usize,
    ord: f64,
) -> Result<Vec<Vec<f64>>, SeqadError> {
    use rayon::prelude::*;

    (0..examples)
        .into_par_iter()
        .map(|n| decode_column(model, sol, n, ord))
        .collect()
}
