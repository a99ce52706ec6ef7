// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use seqad_core::{LabelSequence, Sequence, SequenceCollection, lp_norm};
use seqad_kernels::{
    FisherMode, KernelMethod, KernelType, StructuredHmm, build_fisher_kernel,
    build_histogram_kernel, build_kernel, flatten_sequences,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type RawExample = (Vec<Vec<f64>>, Vec<usize>);

fn collection_strategy() -> impl Strategy<Value = (Vec<RawExample>, usize, usize)> {
    (1usize..=3, 2usize..=6, 2usize..=8, 1usize..=3).prop_flat_map(
        |(channels, examples, len, states)| {
            let values = prop::collection::vec(prop::collection::vec(-5.0f64..5.0, len), channels);
            let labels = prop::collection::vec(0usize..states, len);
            (
                prop::collection::vec((values, labels), examples),
                1usize..=examples,
                Just(states),
            )
        },
    )
}

fn build(raw: &[RawExample], num_train: usize) -> (SequenceCollection, Vec<LabelSequence>) {
    let seqs = raw
        .iter()
        .map(|(channels, _)| Sequence::from_channels(channels.clone()).expect("generated"))
        .collect();
    let labels = raw
        .iter()
        .map(|(_, states)| LabelSequence::new(states.clone()).expect("generated labels"))
        .collect();
    (
        SequenceCollection::new(seqs, num_train).expect("generated collection"),
        labels,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn gram_matrices_are_symmetric((raw, num_train, _) in collection_strategy(), width in 0.1f64..10.0) {
        init_logging();
        let (coll, labels) = build(&raw, num_train);
        for method in [
            KernelMethod::Sequence { kernel: KernelType::Linear },
            KernelMethod::Sequence { kernel: KernelType::Rbf { width } },
            KernelMethod::Histogram { bins: 4 },
            KernelMethod::FisherRandom { states: 2 },
        ] {
            let built = build_kernel(&coll, &labels, &method, -1.0, 5).expect("built");
            prop_assert_eq!(built.kernel.shape(), (coll.len(), coll.len()));
            prop_assert!(built.kernel.is_symmetric(0.0));
        }
    }

    #[test]
    fn histogram_counts_cover_every_sample((raw, num_train, _) in collection_strategy(), bins in 2usize..10) {
        init_logging();
        let (coll, _) = build(&raw, num_train);
        let len = coll.uniform_len().expect("uniform") as f64;
        let raw_hist = build_histogram_kernel(&coll, bins, -1.0).expect("raw histogram");
        for column in raw_hist.built.phi.columns() {
            for channel in column.chunks(bins) {
                prop_assert_eq!(channel.iter().sum::<f64>(), len);
            }
        }
        let unit = build_histogram_kernel(&coll, bins, 2.0).expect("normalized histogram");
        for column in unit.built.phi.columns() {
            let norm = lp_norm(column, 2.0).expect("norm");
            prop_assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn fisher_features_have_model_dimensionality((raw, num_train, states) in collection_strategy(), seed in any::<u64>()) {
        init_logging();
        let (coll, labels) = build(&raw, num_train);
        let out = build_fisher_kernel::<StructuredHmm>(
            &coll,
            &labels,
            states,
            -1.0,
            FisherMode::Randomized { seed },
        )
        .expect("randomized fisher");
        let dims = states * states + states * coll.channels();
        prop_assert_eq!(out.parameters.sol.len(), dims);
        prop_assert_eq!(out.built.phi.shape(), (dims, coll.len()));
    }

    #[test]
    fn rebuilding_is_idempotent((raw, num_train, _) in collection_strategy(), bins in 2usize..6) {
        let (coll, labels) = build(&raw, num_train);
        let method = KernelMethod::Histogram { bins };
        let first = build_kernel(&coll, &labels, &method, 1.0, 0).expect("first");
        let second = build_kernel(&coll, &labels, &method, 1.0, 0).expect("second");
        prop_assert_eq!(first, second);
        let flat_a = flatten_sequences(&coll, -1.0).expect("flatten");
        let flat_b = flatten_sequences(&coll, -1.0).expect("flatten");
        prop_assert_eq!(flat_a, flat_b);
    }
}
