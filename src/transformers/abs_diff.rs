//! Reduction of paired samples to their element-wise absolute difference.

use ndarray::{s, Array2, ArrayView3, ArrayViewD, Ix3};
use rand::RngCore;

use crate::core::errors::{LirError, Result};
use crate::transformers::{FeatureData, Transformer};

/// Collapses a (pairs, features, 2) tensor to a (pairs, features) matrix of
/// `|member0 - member1|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsDiffTransformer;

impl AbsDiffTransformer {
    /// Create a new reducer
    pub fn new() -> Self {
        Self
    }

    /// No population statistics are needed
    pub fn fit(&mut self, _population: ArrayView3<f64>) -> &mut Self {
        self
    }

    /// Absolute difference between the two members of every pair
    pub fn transform(&self, pairs: ArrayView3<f64>) -> Result<Array2<f64>> {
        if pairs.shape()[2] != 2 {
            return Err(LirError::shape_mismatch(
                "abs_diff.transform",
                "(n_pairs, n_features, 2)",
                format!("{:?}", pairs.shape()),
            ));
        }

        let first = pairs.slice(s![.., .., 0]);
        let second = pairs.slice(s![.., .., 1]);
        Ok((&first - &second).mapv_into(f64::abs))
    }

    /// Transform an array of arbitrary rank, which must be 3-D.
    pub fn transform_dyn(&self, pairs: ArrayViewD<f64>) -> Result<Array2<f64>> {
        let shape = pairs.shape().to_vec();
        let pairs = pairs.into_dimensionality::<Ix3>().map_err(|_| {
            LirError::shape_mismatch(
                "abs_diff.transform",
                "(n_pairs, n_features, 2)",
                format!("{shape:?}"),
            )
        })?;
        self.transform(pairs)
    }
}

impl Transformer for AbsDiffTransformer {
    fn name(&self) -> &'static str {
        "abs_diff"
    }

    fn fit(&mut self, _population: &FeatureData) -> Result<()> {
        Ok(())
    }

    fn transform(&mut self, data: FeatureData, _rng: &mut dyn RngCore) -> Result<FeatureData> {
        match data {
            FeatureData::Pairs { features, labels } => Ok(FeatureData::Differences {
                features: Self::transform(self, features.view())?,
                labels,
            }),
            other => Err(LirError::shape_mismatch(
                "abs_diff.transform",
                "pairs",
                other.kind(),
            )),
        }
    }
}
