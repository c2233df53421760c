//! Feature transforms applied between raw samples and a likelihood-ratio estimator.
//!
//! Each stage implements [`Transformer`], a two-operation interface: `fit` on a
//! population, then `transform` on data. Stages exchange [`FeatureData`], which
//! records whether the data is still per-sample, paired, or already reduced to
//! pair differences, so that a stage handed the wrong layout fails with a
//! shape error instead of misreading axes.

use std::fmt;

use ndarray::{Array1, Array2, Array3};
use rand::RngCore;

use crate::core::convert::grouped_to_flat;
use crate::core::errors::{LirError, Result};

pub mod abs_diff;
pub mod gaussian_cdf;
pub mod normalizer;
pub mod pairing;

pub use abs_diff::AbsDiffTransformer;
pub use gaussian_cdf::{GaussianCdfState, GaussianCdfTransformer};
pub use normalizer::VectorNormalizer;
pub use pairing::{InstancePairing, PairedSamples, DIFFERENT_SOURCE, SAME_SOURCE};

/// Data exchanged between pipeline stages
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureData {
    /// One row per sample, optionally with class labels
    Samples {
        /// Sample matrix, shape (n_samples, n_features)
        features: Array2<f64>,
        /// Class label per row
        labels: Option<Array1<usize>>,
    },
    /// Paired samples, shape (n_pairs, n_features, 2)
    Pairs {
        /// Paired feature tensor
        features: Array3<f64>,
        /// 1.0 for same-source pairs, 0.0 for different-source pairs
        labels: Array1<f64>,
    },
    /// Pair-level feature matrix, shape (n_pairs, n_features)
    Differences {
        /// Reduced pair features
        features: Array2<f64>,
        /// 1.0 for same-source pairs, 0.0 for different-source pairs
        labels: Array1<f64>,
    },
}

impl FeatureData {
    /// Labelled samples
    pub fn samples(features: Array2<f64>, labels: Array1<usize>) -> Self {
        Self::Samples {
            features,
            labels: Some(labels),
        }
    }

    /// Samples without class labels
    pub fn unlabeled(features: Array2<f64>) -> Self {
        Self::Samples {
            features,
            labels: None,
        }
    }

    /// Labelled samples from per-class matrices
    pub fn from_groups(groups: &[Array2<f64>]) -> Result<Self> {
        let (features, labels) = grouped_to_flat(groups)?;
        Ok(Self::samples(features, labels))
    }

    /// Short name of the layout, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Samples { .. } => "samples",
            Self::Pairs { .. } => "pairs",
            Self::Differences { .. } => "differences",
        }
    }

    /// Number of rows (samples or pairs)
    pub fn n_rows(&self) -> usize {
        match self {
            Self::Samples { features, .. } | Self::Differences { features, .. } => features.nrows(),
            Self::Pairs { features, .. } => features.shape()[0],
        }
    }

    /// Number of features per row
    pub fn n_features(&self) -> usize {
        match self {
            Self::Samples { features, .. } | Self::Differences { features, .. } => features.ncols(),
            Self::Pairs { features, .. } => features.shape()[1],
        }
    }

    /// The 2-D feature matrix, if the data has one
    pub fn matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Self::Samples { features, .. } | Self::Differences { features, .. } => Some(features),
            Self::Pairs { .. } => None,
        }
    }

    /// Replace the 2-D feature matrix, keeping labels.
    fn map_matrix<F>(self, operation: &str, f: F) -> Result<Self>
    where
        F: FnOnce(Array2<f64>) -> Result<Array2<f64>>,
    {
        match self {
            Self::Samples { features, labels } => Ok(Self::Samples {
                features: f(features)?,
                labels,
            }),
            Self::Differences { features, labels } => Ok(Self::Differences {
                features: f(features)?,
                labels,
            }),
            Self::Pairs { features, .. } => Err(LirError::shape_mismatch(
                operation,
                "2-D samples or differences",
                format!("pairs with shape {:?}", features.shape()),
            )),
        }
    }
}

/// A fit/transform stage of a feature pipeline
pub trait Transformer: fmt::Debug + Send + Sync {
    /// Stage name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Learn population statistics, if the stage has any
    fn fit(&mut self, population: &FeatureData) -> Result<()>;

    /// Transform data; `rng` drives any random subsampling
    fn transform(&mut self, data: FeatureData, rng: &mut dyn RngCore) -> Result<FeatureData>;

    /// Pairing index table retained by the last transform, for pairing stages
    fn pairing(&self) -> Option<&Array2<usize>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_groups() {
        let data =
            FeatureData::from_groups(&[array![[1.0, 2.0], [3.0, 4.0]], array![[10.0, 20.0]]])
                .unwrap();

        assert_eq!(data.kind(), "samples");
        assert_eq!(data.n_rows(), 3);
        assert_eq!(data.n_features(), 2);
        if let FeatureData::Samples { labels, .. } = data {
            assert_eq!(labels, Some(array![0, 0, 1]));
        } else {
            panic!("Expected samples");
        }
    }

    #[test]
    fn test_pairs_dimensions() {
        let data = FeatureData::Pairs {
            features: Array3::zeros((5, 3, 2)),
            labels: Array1::zeros(5),
        };

        assert_eq!(data.n_rows(), 5);
        assert_eq!(data.n_features(), 3);
        assert!(data.matrix().is_none());
    }

    #[test]
    fn test_map_matrix_rejects_pairs() {
        let data = FeatureData::Pairs {
            features: Array3::zeros((1, 1, 2)),
            labels: Array1::zeros(1),
        };

        let err = data.map_matrix("test", Ok).unwrap_err();
        assert!(matches!(err, LirError::ShapeMismatch { .. }));
    }
}
