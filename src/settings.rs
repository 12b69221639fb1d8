//! Pipeline configuration.
//!
//! Defaults match the Vélib' open-data feed. A TOML file and `VELIB_*`
//! environment variables can override any of them, e.g.
//! `VELIB_MISSING_THRESHOLD=0.3`.

use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_FILL_TEXT, DEFAULT_MISSING_THRESHOLD, DEFAULT_YES_TOKEN, ENV_PREFIX, GEO_KEY,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// A text column is dropped when its share of absent values is strictly above this
    #[validate(range(min = 0.0, max = 1.0))]
    pub missing_threshold: f64,

    /// Replacement for absent station names and communes
    #[validate(length(min = 1))]
    pub fill_text: String,

    /// The only status value read as `true`
    #[validate(length(min = 1))]
    pub yes_token: String,

    /// Feed key holding the nested `{lat, lon}` object
    #[validate(length(min = 1))]
    pub geo_key: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            fill_text: DEFAULT_FILL_TEXT.to_string(),
            yes_token: DEFAULT_YES_TOKEN.to_string(),
            geo_key: GEO_KEY.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = threshold;
        self
    }

    pub fn with_yes_token(mut self, token: &str) -> Self {
        self.yes_token = token.to_string();
        self
    }

    pub fn with_geo_key(mut self, key: &str) -> Self {
        self.geo_key = key.to_string();
        self
    }
}
