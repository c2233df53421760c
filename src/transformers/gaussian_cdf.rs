//! Gaussian cumulative-distribution rescaling of features.
//!
//! For each feature a normal distribution is fitted to the whole population
//! (mean and population standard deviation). A value is then replaced by the
//! probability mass below it, so a value equal to the population mean becomes
//! 0.5. Features without spread in the population carry no information under
//! this model and are dropped from the output.

use ndarray::{Array1, Array2, ArrayView2, ArrayViewD, Axis, Ix2, Zip};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::core::errors::{LirError, Result};
use crate::transformers::{FeatureData, Transformer};

/// Population statistics learned by [`GaussianCdfTransformer::fit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianCdfState {
    /// Mean of each retained feature
    pub mean: Array1<f64>,
    /// Population standard deviation of each retained feature
    pub std: Array1<f64>,
    /// Mask over the input features; `true` where the feature is kept
    pub retained: Array1<bool>,
}

impl GaussianCdfState {
    fn from_population(x: ArrayView2<f64>) -> Result<Self> {
        let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            LirError::value_constraint_field("cannot fit on an empty population", "population")
        })?;
        let std = x.std_axis(Axis(0), 0.0);

        let retained = std.mapv(|s| s > 0.0);
        let kept: Vec<usize> = retained
            .iter()
            .enumerate()
            .filter_map(|(index, &keep)| keep.then_some(index))
            .collect();

        Ok(Self {
            mean: mean.select(Axis(0), &kept),
            std: std.select(Axis(0), &kept),
            retained,
        })
    }

    /// Indices of the retained input features
    pub fn retained_indices(&self) -> Vec<usize> {
        self.retained
            .iter()
            .enumerate()
            .filter_map(|(index, &keep)| keep.then_some(index))
            .collect()
    }

    fn distributions(&self) -> Result<Array1<Normal>> {
        self.mean
            .iter()
            .zip(self.std.iter())
            .map(|(&mean, &std)| Normal::new(mean, std).map_err(LirError::from))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

/// Maps features to their Gaussian cumulative probability in the population
#[derive(Debug, Clone, Default)]
pub struct GaussianCdfTransformer {
    state: Option<GaussianCdfState>,
}

impl GaussianCdfTransformer {
    /// Create an unfitted transformer
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit per-feature mean and standard deviation on `population`.
    ///
    /// Refitting replaces the previous state entirely.
    pub fn fit(&mut self, population: ArrayView2<f64>) -> Result<&mut Self> {
        let state = GaussianCdfState::from_population(population)?;

        let dropped = state.retained.iter().filter(|keep| !**keep).count();
        if dropped > 0 {
            warn!(
                "Dropping {} of {} features with zero population variance",
                dropped,
                state.retained.len()
            );
        }
        debug!(
            "Fitted Gaussian CDF on {} samples, {} features retained",
            population.nrows(),
            state.mean.len()
        );

        self.state = Some(state);
        Ok(self)
    }

    /// Replace every retained feature value by its cumulative probability.
    ///
    /// The output has one column per retained feature, in input order.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let state = self.state()?;

        if x.ncols() != state.retained.len() {
            return Err(LirError::shape_mismatch(
                "gaussian_cdf.transform",
                format!("{} features (as fitted)", state.retained.len()),
                format!("{} features", x.ncols()),
            ));
        }

        let distributions = state.distributions()?;
        let mut out = x.select(Axis(1), &state.retained_indices());

        let zip = Zip::from(out.columns_mut()).and(&distributions);
        #[cfg(feature = "parallel")]
        zip.par_for_each(|mut column, dist| column.mapv_inplace(|v| dist.cdf(v)));
        #[cfg(not(feature = "parallel"))]
        zip.for_each(|mut column, dist| column.mapv_inplace(|v| dist.cdf(v)));

        Ok(out)
    }

    /// Transform an array of arbitrary rank, which must be 2-D.
    pub fn transform_dyn(&self, x: ArrayViewD<f64>) -> Result<Array2<f64>> {
        let ndim = x.ndim();
        let x = x.into_dimensionality::<Ix2>().map_err(|_| {
            LirError::shape_mismatch(
                "gaussian_cdf.transform",
                "2 axes (n_samples, n_features)",
                format!("{ndim} axes"),
            )
        })?;
        self.transform(x)
    }

    /// Fit on `x` and transform it
    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        Self::transform(self, x)
    }

    /// Fitted state
    pub fn state(&self) -> Result<&GaussianCdfState> {
        self.state
            .as_ref()
            .ok_or_else(|| LirError::not_fitted("GaussianCdfTransformer"))
    }

    /// Whether `fit` has been called
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Number of features seen during fit
    pub fn n_features_in(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.retained.len())
    }

    /// Number of features produced by transform
    pub fn n_features_out(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.mean.len())
    }
}

impl Transformer for GaussianCdfTransformer {
    fn name(&self) -> &'static str {
        "gaussian_cdf"
    }

    fn fit(&mut self, population: &FeatureData) -> Result<()> {
        let x = population.matrix().ok_or_else(|| {
            LirError::shape_mismatch(
                "gaussian_cdf.fit",
                "2-D samples or differences",
                population.kind(),
            )
        })?;
        GaussianCdfTransformer::fit(self, x.view()).map(|_| ())
    }

    fn transform(&mut self, data: FeatureData, _rng: &mut dyn RngCore) -> Result<FeatureData> {
        let this = &*self;
        data.map_matrix("gaussian_cdf.transform", |x| this.transform(x.view()))
    }
}

#[cfg(test)]
#[path = "gaussian_cdf_tests.rs"]
mod tests;
