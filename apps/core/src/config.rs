//! Extraction configuration.
//!
//! Values come from the environment (a `.env` file is loaded first) and can be
//! overridden by command-line flags. Everything is validated before use.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::fs_manager::PortablePathManager;

pub const ENV_DEDUPE_SPANS: &str = "RXSCAN_DEDUPE_SPANS";
pub const ENV_ON_RECOGNIZER_FAILURE: &str = "RXSCAN_ON_RECOGNIZER_FAILURE";
pub const ENV_SEMANTIC_THRESHOLD: &str = "RXSCAN_SEMANTIC_THRESHOLD";
pub const ENV_MODELS_DIR: &str = "RXSCAN_MODELS_DIR";

const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.45;

/// What to do when the entity recognizer cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the extraction call
    #[default]
    Fail,
    /// Log a warning and return vitals only
    RegexOnly,
}

impl FromStr for FailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail" => Ok(FailurePolicy::Fail),
            "regex_only" => Ok(FailurePolicy::RegexOnly),
            other => Err(AppError::Config(format!(
                "Unknown recognizer failure policy '{}' (expected fail or regex_only)",
                other
            ))),
        }
    }
}

/// Configuration for an extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractorConfig {
    /// Collapse spans with the same text and category, keeping the first.
    pub dedupe_spans: bool,
    /// Behaviour when the recognizer fails to load or run.
    pub on_recognizer_failure: FailurePolicy,
    /// Minimum cosine similarity for the embedding recognizer. Value between 0.0 and 1.0.
    #[validate(range(min = 0.0, max = 1.0))]
    pub semantic_threshold: f32,
    /// Where embedding models are cached.
    pub models_dir: PathBuf,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            dedupe_spans: false,
            on_recognizer_failure: FailurePolicy::Fail,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
            models_dir: PortablePathManager::models_dir(),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DEDUPE_SPANS) {
            config.dedupe_spans = parse_bool(ENV_DEDUPE_SPANS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ON_RECOGNIZER_FAILURE) {
            config.on_recognizer_failure = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_SEMANTIC_THRESHOLD) {
            config.semantic_threshold = raw.trim().parse().map_err(|e| {
                AppError::Config(format!("{} must be a number: {}", ENV_SEMANTIC_THRESHOLD, e))
            })?;
        }
        if let Some(raw) = lookup(ENV_MODELS_DIR) {
            if !raw.trim().is_empty() {
                config.models_dir = PathBuf::from(raw.trim());
            }
        }

        config.validate()?;
        debug!("Loaded extractor config: {:?}", config);
        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
