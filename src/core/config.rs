//! Configuration types for pairing and transform pipelines.
//!
//! Configurations are plain serde structures so that a whole pipeline can be
//! described in YAML and validated before any data is touched.

use std::fmt;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LirError, Result};

/// Cap on the number of different-source pairs kept by instance pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "LimitRepr", into = "LimitRepr")]
pub enum DifferentSourceLimit {
    /// Keep every different-source candidate
    #[default]
    Unlimited,
    /// Keep at most this many different-source pairs
    Limit(usize),
    /// Keep as many different-source pairs as same-source pairs were retained
    Balanced,
}

impl DifferentSourceLimit {
    /// Resolve the effective cap given the candidate count and the number of
    /// same-source pairs retained after their own limit was applied.
    pub fn resolve(self, candidates: usize, same_source_retained: usize) -> usize {
        match self {
            Self::Unlimited => candidates,
            Self::Limit(limit) => limit,
            Self::Balanced => same_source_retained,
        }
    }
}

impl fmt::Display for DifferentSourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limit(limit) => write!(f, "{limit}"),
            Self::Balanced => write!(f, "balanced"),
        }
    }
}

/// Wire form of [`DifferentSourceLimit`]: an integer or a keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(usize),
    Keyword(String),
    Unset(()),
}

impl TryFrom<LimitRepr> for DifferentSourceLimit {
    type Error = String;

    fn try_from(repr: LimitRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            LimitRepr::Count(limit) => Ok(Self::Limit(limit)),
            LimitRepr::Unset(()) => Ok(Self::Unlimited),
            LimitRepr::Keyword(keyword) => match keyword.as_str() {
                "balanced" => Ok(Self::Balanced),
                "unlimited" => Ok(Self::Unlimited),
                other => Err(format!(
                    "unknown different_source_limit '{other}' (expected an integer, 'balanced' or 'unlimited')"
                )),
            },
        }
    }
}

impl From<DifferentSourceLimit> for LimitRepr {
    fn from(limit: DifferentSourceLimit) -> Self {
        match limit {
            DifferentSourceLimit::Limit(limit) => Self::Count(limit),
            other => Self::Keyword(other.to_string()),
        }
    }
}

/// Sampling limits for instance pairing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Maximum number of same-source pairs (None = no limit)
    #[serde(default)]
    pub same_source_limit: Option<usize>,

    /// Maximum number of different-source pairs
    #[serde(default)]
    pub different_source_limit: DifferentSourceLimit,
}

impl PairingConfig {
    /// Limit the number of same-source pairs
    pub fn with_same_source_limit(mut self, limit: usize) -> Self {
        self.same_source_limit = Some(limit);
        self
    }

    /// Limit the number of different-source pairs
    pub fn with_different_source_limit(mut self, limit: DifferentSourceLimit) -> Self {
        self.different_source_limit = limit;
        self
    }

    /// Balance different-source pairs against the retained same-source pairs
    pub fn balanced(self) -> Self {
        self.with_different_source_limit(DifferentSourceLimit::Balanced)
    }

    /// Validate pairing configuration
    pub fn validate(&self) -> Result<()> {
        if self.same_source_limit == Some(0) {
            return Err(LirError::config_field(
                "same_source_limit must be a positive integer",
                "same_source_limit",
            ));
        }

        if self.different_source_limit == DifferentSourceLimit::Limit(0) {
            return Err(LirError::config_field(
                "different_source_limit must be a positive integer",
                "different_source_limit",
            ));
        }

        Ok(())
    }
}

/// One stage of a transform pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageConfig {
    /// Per-row L1 normalization
    VectorNormalizer,
    /// Gaussian CDF rescaling fitted on the population
    GaussianCdf,
    /// Same-source / different-source pair generation
    InstancePairing(PairingConfig),
    /// Absolute difference between pair members
    AbsDiff,
}

impl StageConfig {
    /// Name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::VectorNormalizer => "vector_normalizer",
            Self::GaussianCdf => "gaussian_cdf",
            Self::InstancePairing(_) => "instance_pairing",
            Self::AbsDiff => "abs_diff",
        }
    }
}

/// Layout of the data flowing between stages, used for order validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataLayout {
    Samples,
    Pairs,
    Differences,
}

/// Ordered transform pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stages in execution order. Stages with settings are written as
    /// single-key maps, e.g. `- instance_pairing: {same_source_limit: 100}`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub stages: Vec<StageConfig>,

    /// Seed for pair subsampling (None = seeded from OS entropy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                StageConfig::InstancePairing(PairingConfig::default()),
                StageConfig::AbsDiff,
            ],
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            LirError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        Self::from_yaml_str(&content)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            LirError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Fix the subsampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Random source for the pairing stage
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Validate stage settings and that each stage accepts its predecessor's output
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(LirError::config_field(
                "pipeline must contain at least one stage",
                "stages",
            ));
        }

        let mut layout = DataLayout::Samples;
        for (index, stage) in self.stages.iter().enumerate() {
            layout = match (stage, layout) {
                (StageConfig::VectorNormalizer | StageConfig::GaussianCdf, DataLayout::Pairs) => {
                    return Err(LirError::config_field(
                        format!(
                            "{} operates on 2-D data and cannot follow instance_pairing directly",
                            stage.name()
                        ),
                        format!("stages[{index}]"),
                    ));
                }
                (StageConfig::VectorNormalizer | StageConfig::GaussianCdf, current) => current,
                (StageConfig::InstancePairing(pairing), DataLayout::Samples) => {
                    pairing.validate().map_err(|e| {
                        LirError::config_field(
                            format!("Invalid pairing configuration: {e}"),
                            format!("stages[{index}]"),
                        )
                    })?;
                    DataLayout::Pairs
                }
                (StageConfig::InstancePairing(_), _) => {
                    return Err(LirError::config_field(
                        "instance_pairing requires labelled samples and may appear only once",
                        format!("stages[{index}]"),
                    ));
                }
                (StageConfig::AbsDiff, DataLayout::Pairs) => DataLayout::Differences,
                (StageConfig::AbsDiff, _) => {
                    return Err(LirError::config_field(
                        "abs_diff requires paired samples produced by instance_pairing",
                        format!("stages[{index}]"),
                    ));
                }
            };
        }

        Ok(())
    }
}
