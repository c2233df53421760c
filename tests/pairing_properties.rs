//! Property tests for label conversion, instance pairing and pair reduction.
//!
//! Covers:
//! - grouped/flat round-trips preserving per-class row sets
//! - canonical, duplicate-free pairing tables
//! - complete pair counts without limits
//! - exact limit enforcement and balanced mode
//! - absolute-difference shape and value laws

use std::collections::HashSet;

use ndarray::{Array1, Array2, Array3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lir_rs::{
    flat_to_grouped, grouped_to_flat, AbsDiffTransformer, DifferentSourceLimit, InstancePairing,
    PairingConfig,
};

fn labels_strategy(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..2, 2..max_len)
        .prop_filter("both classes present", |labels| {
            labels.contains(&0) && labels.contains(&1)
        })
}

fn samples_for(labels: &[usize], n_features: usize) -> Array2<f64> {
    Array2::from_shape_fn((labels.len(), n_features), |(row, col)| {
        (row * n_features + col) as f64
    })
}

fn row_set(matrix: &Array2<f64>) -> HashSet<Vec<u64>> {
    matrix
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect())
        .collect()
}

fn choose2(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

#[cfg(test)]
mod conversion_properties {
    use super::*;

    proptest! {
        /// Property: flat -> grouped recovers exactly the rows of each group
        #[test]
        fn prop_grouped_flat_round_trip(
            first in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 3), 1..12),
            second in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 3), 1..12),
        ) {
            let to_matrix = |rows: &Vec<Vec<f64>>| {
                Array2::from_shape_vec((rows.len(), 3), rows.concat()).unwrap()
            };
            let groups = vec![to_matrix(&first), to_matrix(&second)];

            let (x, y) = grouped_to_flat(&groups).unwrap();
            prop_assert_eq!(x.nrows(), first.len() + second.len());
            prop_assert_eq!(y.len(), x.nrows());

            let recovered = flat_to_grouped(x.view(), y.view()).unwrap();
            prop_assert_eq!(recovered.len(), 2);
            prop_assert_eq!(row_set(&recovered[0]), row_set(&groups[0]));
            prop_assert_eq!(row_set(&recovered[1]), row_set(&groups[1]));
        }
    }
}

#[cfg(test)]
mod pairing_properties {
    use super::*;

    proptest! {
        /// Property: every pair is (i, j) with i < j and appears at most once
        #[test]
        fn prop_pairing_is_canonical(
            labels in labels_strategy(25),
            same_limit in prop::option::of(1usize..40),
            seed in any::<u64>(),
        ) {
            let x = samples_for(&labels, 2);
            let y = Array1::from(labels);
            let mut engine = InstancePairing::with_limits(same_limit, DifferentSourceLimit::Balanced);

            engine.transform(x.view(), y.view(), &mut StdRng::seed_from_u64(seed)).unwrap();

            let mut seen = HashSet::new();
            for row in engine.pairing().unwrap().rows() {
                prop_assert!(row[0] < row[1]);
                prop_assert!(seen.insert((row[0], row[1])));
            }
        }

        /// Property: without limits, counts follow the class sizes
        #[test]
        fn prop_unlimited_pairing_is_complete(labels in labels_strategy(30)) {
            let x = samples_for(&labels, 1);
            let class_one = labels.iter().filter(|&&label| label == 1).count();
            let class_zero = labels.len() - class_one;
            let y = Array1::from(labels);

            let paired = InstancePairing::default()
                .transform(x.view(), y.view(), &mut StdRng::seed_from_u64(0))
                .unwrap();

            prop_assert_eq!(paired.same_source_count(), choose2(class_zero) + choose2(class_one));
            prop_assert_eq!(paired.different_source_count(), class_zero * class_one);
        }

        /// Property: an exceeded same-source limit is met exactly, and balanced
        /// mode matches the different-source count to it
        #[test]
        fn prop_limits_are_enforced(
            labels in labels_strategy(30),
            limit in 1usize..20,
            seed in any::<u64>(),
        ) {
            let x = samples_for(&labels, 1);
            let class_one = labels.iter().filter(|&&label| label == 1).count();
            let class_zero = labels.len() - class_one;
            let candidates_same = choose2(class_zero) + choose2(class_one);
            let candidates_diff = class_zero * class_one;
            let y = Array1::from(labels);

            let config = PairingConfig::default().with_same_source_limit(limit).balanced();
            let paired = InstancePairing::new(config)
                .transform(x.view(), y.view(), &mut StdRng::seed_from_u64(seed))
                .unwrap();

            let expected_same = candidates_same.min(limit);
            prop_assert_eq!(paired.same_source_count(), expected_same);
            prop_assert_eq!(paired.different_source_count(), candidates_diff.min(expected_same));
        }

        /// Property: pair labels agree with the class labels of the indexed rows
        #[test]
        fn prop_labels_match_pairing(
            labels in labels_strategy(20),
            diff_limit in 1usize..30,
            seed in any::<u64>(),
        ) {
            let x = samples_for(&labels, 1);
            let y = Array1::from(labels);
            let mut engine = InstancePairing::with_limits(None, DifferentSourceLimit::Limit(diff_limit));

            let paired = engine
                .transform(x.view(), y.view(), &mut StdRng::seed_from_u64(seed))
                .unwrap();

            for (row, &label) in engine.pairing().unwrap().rows().into_iter().zip(paired.labels.iter()) {
                let same = y[row[0]] == y[row[1]];
                prop_assert_eq!(label, if same { 1.0 } else { 0.0 });
            }
        }
    }
}

#[cfg(test)]
mod reduction_properties {
    use super::*;

    proptest! {
        /// Property: (m, f, 2) reduces to (m, f) holding |a - b|
        #[test]
        fn prop_abs_diff_shape_and_values(
            m in 0usize..10,
            f in 1usize..6,
            values in prop::collection::vec(-1e3f64..1e3, 120),
        ) {
            let pairs = Array3::from_shape_fn((m, f, 2), |(i, j, k)| values[(i * f + j) * 2 + k]);

            let out = AbsDiffTransformer::new().transform(pairs.view()).unwrap();

            prop_assert_eq!(out.dim(), (m, f));
            for ((i, j), &value) in out.indexed_iter() {
                prop_assert_eq!(value, (pairs[[i, j, 0]] - pairs[[i, j, 1]]).abs());
                prop_assert!(value >= 0.0);
            }
        }
    }
}
