// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::BuiltKernel;
use crate::gram::{KernelType, gram_symmetric};
use seqad_core::{FeatureMatrix, Matrix, SeqadError, SequenceCollection, normalize_lp};

/// Flattens every sequence into one column of length `F * LEN`, channels
/// concatenated end to end.
///
/// Columns are divided by their L-`ord` norm when `ord >= 1`. All sequences
/// must share one length.
pub fn flatten_sequences(
    collection: &SequenceCollection,
    ord: f64,
) -> Result<FeatureMatrix, SeqadError> {
    let len = collection.uniform_len()?;
    let dims = collection.channels() * len;
    let mut phi = Matrix::zeros(dims, collection.len());
    for (n, seq) in collection.sequences().iter().enumerate() {
        let column = phi.column_mut(n);
        column.copy_from_slice(seq.values());
        normalize_lp(column, ord, &format!("sequence feature column {n}"))?;
    }
    Ok(phi)
}

/// Whole-sequence kernel: flattened sequences under `kernel`.
pub fn build_sequence_kernel(
    collection: &SequenceCollection,
    ord: f64,
    kernel: KernelType,
) -> Result<BuiltKernel, SeqadError> {
    kernel.validate()?;
    let phi = flatten_sequences(collection, ord)?;
    let kern = gram_symmetric(&phi, kernel)?;
    Ok(BuiltKernel {
        kernel: kern,
        notes: vec![
            "builder=sequence".to_string(),
            format!("kernel={}", kernel.label()),
            format!("ord={ord}"),
            format!("dims={}", phi.rows()),
        ],
        phi,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_sequence_kernel, flatten_sequences};
    use crate::gram::KernelType;
    use seqad_core::{SeqadError, Sequence, SequenceCollection};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn two_channel(a: &[f64], b: &[f64]) -> Sequence {
        Sequence::from_channels(vec![a.to_vec(), b.to_vec()]).expect("valid sequence")
    }

    #[test]
    fn channels_are_concatenated_per_column() {
        let coll = SequenceCollection::new(
            vec![two_channel(&[1.0, 2.0], &[3.0, 4.0]), two_channel(&[5.0, 6.0], &[7.0, 8.0])],
            1,
        )
        .expect("valid collection");
        let phi = flatten_sequences(&coll, -1.0).expect("flatten");
        assert_eq!(phi.shape(), (4, 2));
        assert_eq!(phi.column(0), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(phi.column(1), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn ord_one_normalizes_by_l1_norm() {
        let coll = SequenceCollection::new(vec![two_channel(&[1.0, -1.0], &[2.0, 0.0])], 1)
            .expect("valid collection");
        let phi = flatten_sequences(&coll, 1.0).expect("flatten");
        assert_close(phi.column(0).iter().map(|v| v.abs()).sum(), 1.0, 1e-12);
        assert_close(phi.get(2, 0), 0.5, 1e-12);
    }

    #[test]
    fn zero_vector_with_normalization_fails() {
        let coll = SequenceCollection::new(
            vec![
                Sequence::univariate(vec![1.0, 1.0]).expect("valid"),
                Sequence::univariate(vec![0.0, 0.0]).expect("valid"),
            ],
            1,
        )
        .expect("valid collection");
        let err = flatten_sequences(&coll, 2.0).expect_err("zero column");
        assert!(matches!(err, SeqadError::ZeroNorm(ref msg) if msg.contains("column 1")));
        assert!(flatten_sequences(&coll, -1.0).is_ok());
    }

    #[test]
    fn unequal_lengths_are_a_shape_mismatch() {
        let coll = SequenceCollection::new(
            vec![
                Sequence::univariate(vec![1.0, 2.0]).expect("valid"),
                Sequence::univariate(vec![1.0]).expect("valid"),
            ],
            1,
        )
        .expect("collections allow variable length");
        assert!(matches!(
            build_sequence_kernel(&coll, 2.0, KernelType::Linear),
            Err(SeqadError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn normalized_linear_kernel_has_unit_diagonal() {
        let coll = SequenceCollection::new(
            vec![
                Sequence::univariate(vec![3.0, 4.0]).expect("valid"),
                Sequence::univariate(vec![0.0, 2.0]).expect("valid"),
            ],
            1,
        )
        .expect("valid collection");
        let built = build_sequence_kernel(&coll, 2.0, KernelType::Linear).expect("kernel");
        assert_close(built.kernel.get(0, 0), 1.0, 1e-12);
        assert_close(built.kernel.get(1, 1), 1.0, 1e-12);
        assert_close(built.kernel.get(0, 1), 0.8, 1e-12);
        assert!(built.kernel.is_symmetric(0.0));
    }
}
