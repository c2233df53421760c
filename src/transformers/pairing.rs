//! Instance pairing: turning labelled samples into same-source and
//! different-source pairs.
//!
//! Every unordered pair of distinct rows `(i, j)` with `i < j` is a candidate.
//! Candidates whose labels are equal are same-source pairs, the rest are
//! different-source pairs. Either set may be capped by uniform subsampling
//! without replacement; the different-source cap can also follow the number of
//! same-source pairs actually kept ("balanced" mode).
//!
//! Output rows list the kept same-source pairs first, then the kept
//! different-source pairs, each in ascending `(i, j)` order.

use std::collections::HashSet;
use std::hash::Hash;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};
use rand::seq::index;
use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

use crate::core::config::{DifferentSourceLimit, PairingConfig};
use crate::core::errors::{LirError, Result};
use crate::transformers::{FeatureData, Transformer};

/// Paired label value for pairs sharing a class label
pub const SAME_SOURCE: f64 = 1.0;

/// Paired label value for pairs with differing class labels
pub const DIFFERENT_SOURCE: f64 = 0.0;

/// Result of pairing a labelled sample matrix
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSamples {
    /// Paired features, shape (n_pairs, n_features, 2)
    pub features: Array3<f64>,
    /// [`SAME_SOURCE`] or [`DIFFERENT_SOURCE`] per pair
    pub labels: Array1<f64>,
}

impl PairedSamples {
    /// Number of pairs
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no pairs were produced
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of same-source pairs
    pub fn same_source_count(&self) -> usize {
        self.labels.iter().filter(|&&label| label == SAME_SOURCE).count()
    }

    /// Number of different-source pairs
    pub fn different_source_count(&self) -> usize {
        self.len() - self.same_source_count()
    }
}

/// Generates same-source and different-source sample pairs
#[derive(Debug, Clone, Default)]
pub struct InstancePairing {
    config: PairingConfig,
    pairing: Option<Array2<usize>>,
}

impl InstancePairing {
    /// Create a pairing engine with the given limits
    pub fn new(config: PairingConfig) -> Self {
        Self {
            config,
            pairing: None,
        }
    }

    /// Create a pairing engine from explicit limits
    pub fn with_limits(
        same_source_limit: Option<usize>,
        different_source_limit: DifferentSourceLimit,
    ) -> Self {
        Self::new(PairingConfig {
            same_source_limit,
            different_source_limit,
        })
    }

    /// Sampling limits in use
    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Row indices of the input contributing to each pair of the last
    /// transform, shape (n_pairs, 2), with `row[0] < row[1]`.
    pub fn pairing(&self) -> Option<&Array2<usize>> {
        self.pairing.as_ref()
    }

    /// No population statistics are needed
    pub fn fit(&mut self, _population: ArrayView2<f64>) -> &mut Self {
        self
    }

    /// Pair the rows of `x` according to the labels `y`.
    ///
    /// `rng` is only consulted when a limit is exceeded; with no limit in
    /// effect the output is fully deterministic.
    pub fn transform<L, R>(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView1<L>,
        rng: &mut R,
    ) -> Result<PairedSamples>
    where
        L: Eq + Hash,
        R: Rng + ?Sized,
    {
        if x.nrows() != y.len() {
            return Err(LirError::shape_mismatch(
                "instance_pairing.transform",
                format!("{} labels (one per row of X)", x.nrows()),
                format!("{} labels", y.len()),
            ));
        }

        let n_classes = y.iter().collect::<HashSet<_>>().len();
        if n_classes > 2 {
            warn!(
                "Pairing {} distinct labels; any two samples with equal labels are treated as same-source",
                n_classes
            );
        }

        let n = x.nrows();
        let mut same_source = Vec::new();
        let mut different_source = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if y[i] == y[j] {
                    same_source.push((i, j));
                } else {
                    different_source.push((i, j));
                }
            }
        }
        debug!(
            "Pair candidates for {} samples: {} same-source, {} different-source",
            n,
            same_source.len(),
            different_source.len()
        );

        let same_source = match self.config.same_source_limit {
            Some(limit) => subsample(same_source, limit, "same-source", rng),
            None => same_source,
        };

        let different_limit = self
            .config
            .different_source_limit
            .resolve(different_source.len(), same_source.len());
        let different_source = subsample(different_source, different_limit, "different-source", rng);

        let pairing = Array2::from_shape_fn(
            (same_source.len() + different_source.len(), 2),
            |(row, member)| {
                let (i, j) = if row < same_source.len() {
                    same_source[row]
                } else {
                    different_source[row - same_source.len()]
                };
                if member == 0 {
                    i
                } else {
                    j
                }
            },
        );

        let features = Array3::from_shape_fn(
            (pairing.nrows(), x.ncols(), 2),
            |(pair, feature, member)| x[[pairing[[pair, member]], feature]],
        );
        let labels: Array1<f64> = std::iter::repeat(SAME_SOURCE)
            .take(same_source.len())
            .chain(std::iter::repeat(DIFFERENT_SOURCE).take(different_source.len()))
            .collect();

        self.pairing = Some(pairing);
        Ok(PairedSamples { features, labels })
    }
}

/// Keep at most `limit` candidates, drawn uniformly without replacement.
///
/// The kept candidates retain their original relative order. A limit above
/// the candidate count keeps everything and logs a warning.
fn subsample<R>(
    candidates: Vec<(usize, usize)>,
    limit: usize,
    kind: &str,
    rng: &mut R,
) -> Vec<(usize, usize)>
where
    R: Rng + ?Sized,
{
    if candidates.len() < limit {
        warn!(
            "Limit of {} {} pairs not met: only {} candidates, keeping all",
            limit,
            kind,
            candidates.len()
        );
        return candidates;
    }
    if candidates.len() == limit {
        return candidates;
    }

    info!(
        "Subsampling {} of {} {} pairs",
        limit,
        candidates.len(),
        kind
    );

    let mut picked = index::sample(rng, candidates.len(), limit).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|position| candidates[position]).collect()
}

impl Transformer for InstancePairing {
    fn name(&self) -> &'static str {
        "instance_pairing"
    }

    fn fit(&mut self, _population: &FeatureData) -> Result<()> {
        Ok(())
    }

    fn transform(&mut self, data: FeatureData, rng: &mut dyn RngCore) -> Result<FeatureData> {
        match data {
            FeatureData::Samples {
                features,
                labels: Some(labels),
            } => {
                let paired = Self::transform(self, features.view(), labels.view(), rng)?;
                Ok(FeatureData::Pairs {
                    features: paired.features,
                    labels: paired.labels,
                })
            }
            FeatureData::Samples { labels: None, .. } => Err(LirError::value_constraint_field(
                "instance pairing requires class labels",
                "labels",
            )),
            other => Err(LirError::shape_mismatch(
                "instance_pairing.transform",
                "samples",
                other.kind(),
            )),
        }
    }

    fn pairing(&self) -> Option<&Array2<usize>> {
        self.pairing.as_ref()
    }
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod tests;
