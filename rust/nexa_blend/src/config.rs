use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlendError, Result};
use crate::indices::{BlendIndex, FastBuilder, IndexBuilder, ReferenceBuilder};

/// Which [`IndexBuilder`] computes the blend. Both give identical output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderKind {
    Reference,
    #[default]
    Fast,
}

impl BuilderKind {
    pub fn build(self, weights: &[f64], size: usize) -> BlendIndex {
        match self {
            BuilderKind::Reference => ReferenceBuilder.build(weights, size),
            BuilderKind::Fast => FastBuilder.build(weights, size),
        }
    }
}

impl FromStr for BuilderKind {
    type Err = BlendError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reference" => Ok(BuilderKind::Reference),
            "fast" => Ok(BuilderKind::Fast),
            other => Err(BlendError::Configuration(format!(
                "unknown builder '{other}', expected 'reference' or 'fast'"
            ))),
        }
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderKind::Reference => f.write_str("reference"),
            BuilderKind::Fast => f.write_str("fast"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// One weight per dataset. `None` weights datasets by their length.
    pub weights: Option<Vec<f64>>,
    pub builder: BuilderKind,
    /// Skip the empty dataset check; lookups into such a dataset then
    /// request index 0 from it.
    pub allow_empty_sources: bool,
}

impl BlendConfig {
    pub fn new(weights: Option<Vec<f64>>) -> Self {
        BlendConfig {
            weights,
            ..Default::default()
        }
    }

    pub fn with_builder(mut self, builder: BuilderKind) -> Self {
        self.builder = builder;
        self
    }

    pub fn allow_empty_sources(mut self, allow: bool) -> Self {
        self.allow_empty_sources = allow;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
