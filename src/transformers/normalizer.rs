//! Per-row L1 normalization.

use ndarray::{Array2, ArrayView2, Axis};
use rand::RngCore;

use crate::core::errors::Result;
use crate::transformers::{FeatureData, Transformer};

/// Rescales every sample so that its feature values sum to 1.
///
/// Rows summing to zero produce non-finite values; callers must keep such
/// rows out of the input if that matters to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorNormalizer;

impl VectorNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    /// No population statistics are needed
    pub fn fit(&mut self, _population: ArrayView2<f64>) -> &mut Self {
        self
    }

    /// Divide each row by its sum
    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let row_sums = x.sum_axis(Axis(1)).insert_axis(Axis(1));
        &x / &row_sums
    }

    /// Fit on `x` and transform it
    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Array2<f64> {
        self.fit(x);
        Self::transform(self, x)
    }
}

impl Transformer for VectorNormalizer {
    fn name(&self) -> &'static str {
        "vector_normalizer"
    }

    fn fit(&mut self, _population: &FeatureData) -> Result<()> {
        Ok(())
    }

    fn transform(&mut self, data: FeatureData, _rng: &mut dyn RngCore) -> Result<FeatureData> {
        let this = &*self;
        data.map_matrix(self.name(), |x| Ok(this.transform(x.view())))
    }
}
