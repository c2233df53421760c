//! Ordered composition of transform stages.
//!
//! A [`TransformPipeline`] runs its stages in sequence. Fitting follows the
//! usual estimator-pipeline contract: each stage is fitted on the output of the
//! previous stage, and that output is transformed before being handed on.

use ndarray::Array2;
use rand::RngCore;
use tracing::debug;

use crate::core::config::{PipelineConfig, StageConfig};
use crate::core::errors::{LirError, Result};
use crate::transformers::{
    AbsDiffTransformer, FeatureData, GaussianCdfTransformer, InstancePairing, Transformer,
    VectorNormalizer,
};

/// An ordered sequence of transform stages
#[derive(Debug, Default)]
pub struct TransformPipeline {
    stages: Vec<Box<dyn Transformer>>,
}

impl TransformPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn with_stage(mut self, stage: impl Transformer + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Build the stages described by a validated configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let stages = config
            .stages
            .iter()
            .map(|stage| -> Box<dyn Transformer> {
                match stage {
                    StageConfig::VectorNormalizer => Box::new(VectorNormalizer::new()),
                    StageConfig::GaussianCdf => Box::new(GaussianCdfTransformer::new()),
                    StageConfig::InstancePairing(pairing) => {
                        Box::new(InstancePairing::new(pairing.clone()))
                    }
                    StageConfig::AbsDiff => Box::new(AbsDiffTransformer::new()),
                }
            })
            .collect();

        Ok(Self { stages })
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Fit every stage on the output of its predecessor and return the
    /// transformed population.
    pub fn fit_transform(
        &mut self,
        population: FeatureData,
        rng: &mut dyn RngCore,
    ) -> Result<FeatureData> {
        let mut data = population;
        for (index, stage) in self.stages.iter_mut().enumerate() {
            debug!(
                "Fitting stage {} ({}) on {} {}",
                index,
                stage.name(),
                data.n_rows(),
                data.kind()
            );
            stage.fit(&data).map_err(|e| stage_error(index, stage.name(), e))?;
            data = stage
                .transform(data, rng)
                .map_err(|e| stage_error(index, stage.name(), e))?;
        }
        Ok(data)
    }

    /// Fit every stage, discarding the transformed population
    pub fn fit(&mut self, population: FeatureData, rng: &mut dyn RngCore) -> Result<&mut Self> {
        self.fit_transform(population, rng)?;
        Ok(self)
    }

    /// Run every stage's transform in order
    pub fn transform(&mut self, data: FeatureData, rng: &mut dyn RngCore) -> Result<FeatureData> {
        let mut data = data;
        for (index, stage) in self.stages.iter_mut().enumerate() {
            debug!("Running stage {} ({}) on {} {}", index, stage.name(), data.n_rows(), data.kind());
            data = stage
                .transform(data, rng)
                .map_err(|e| stage_error(index, stage.name(), e))?;
        }
        Ok(data)
    }

    /// Pairing index table from the most recent run of the pairing stage
    pub fn pairing(&self) -> Option<&Array2<usize>> {
        self.stages.iter().find_map(|stage| stage.pairing())
    }
}

/// Prefix shape errors with the failing stage so a misordered pipeline is easy to spot.
fn stage_error(index: usize, name: &str, err: LirError) -> LirError {
    match err {
        LirError::ShapeMismatch {
            operation,
            expected,
            actual,
        } => LirError::ShapeMismatch {
            operation: format!("stage {index} ({name}): {operation}"),
            expected,
            actual,
        },
        other => other,
    }
}
