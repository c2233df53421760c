//! # lir-rs: Feature Preparation for Likelihood-Ratio Estimation
//!
//! Forensic comparisons ask whether two trace samples share a common source.
//! A likelihood-ratio estimator answers that from *pairs* of samples, so this
//! crate turns labelled sample sets into paired, rescaled features ready for
//! an external classifier:
//!
//! - **Label formats**: conversion between per-class matrices and a flat
//!   matrix with a label vector
//! - **Instance pairing**: all same-source and different-source pairs, with
//!   reproducible subsampling limits and a balanced mode
//! - **Feature transforms**: per-row L1 normalization, Gaussian CDF rescaling
//!   and absolute pair differences
//! - **Pipelines**: ordered, configurable chains of the above
//!
//! ## Architecture
//!
//! ```text
//! grouped samples ──► grouped_to_flat ──► (X, y)
//!                                           │
//!              VectorNormalizer / GaussianCdfTransformer (per sample)
//!                                           │
//!                                    InstancePairing ──► (m, f, 2) + labels
//!                                           │
//!                                   AbsDiffTransformer ──► (m, f) ──► estimator
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lir_rs::core::config::{PairingConfig, PipelineConfig, StageConfig};
//! use lir_rs::core::pipeline::TransformPipeline;
//! use lir_rs::transformers::FeatureData;
//! use ndarray::array;
//!
//! fn main() -> lir_rs::Result<()> {
//!     let config = PipelineConfig {
//!         stages: vec![
//!             StageConfig::GaussianCdf,
//!             StageConfig::InstancePairing(PairingConfig::default().balanced()),
//!             StageConfig::AbsDiff,
//!         ],
//!         seed: Some(42),
//!     };
//!     let mut pipeline = TransformPipeline::from_config(&config)?;
//!     let mut rng = config.rng();
//!
//!     let population = FeatureData::from_groups(&[
//!         array![[1.0, 2.0], [1.5, 2.5]],
//!         array![[8.0, 1.0], [7.5, 0.5]],
//!     ])?;
//!     let pairs = pipeline.fit_transform(population, &mut rng)?;
//!     println!("{} pairs prepared", pairs.n_rows());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core infrastructure
pub mod core {
    //! Errors, configuration, label-format conversion and pipelines.

    pub mod config;
    pub mod convert;
    pub mod errors;
    pub mod pipeline;
}

// Fit/transform stages
pub mod transformers;

// Re-export primary types for convenience
pub use crate::core::config::{DifferentSourceLimit, PairingConfig, PipelineConfig, StageConfig};
pub use crate::core::convert::{flat_to_grouped, grouped_to_flat};
pub use crate::core::errors::{LirError, Result, ResultExt};
pub use crate::core::pipeline::TransformPipeline;
pub use transformers::{
    AbsDiffTransformer, FeatureData, GaussianCdfTransformer, InstancePairing, PairedSamples,
    Transformer, VectorNormalizer,
};
