//! Configuration for a pipeline run.
//!
//! Every knob lives in one [`PipelineConfig`] struct built via its
//! [`PipelineConfigBuilder`], so configs are trivial to share across tasks,
//! serialise for logging, and diff between runs. Callers set only what they
//! care about and rely on documented defaults for the rest.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Default structuring-service model when none is configured.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Default AWS region for the service clients.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default key prefix under which artifacts are published.
pub const DEFAULT_KEY_PREFIX: &str = "processed-data";

/// Configuration consumed by the pipeline.
///
/// # Example
/// ```rust
/// use pdf2table::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .model_id("anthropic.claude-3-haiku-20240307-v1:0")
///     .bucket("license-archive")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Structuring-service model identifier. Default: [`DEFAULT_MODEL_ID`].
    ///
    /// Also selects the request-body shape: identifiers containing
    /// `"claude-3"` use the chat-style messages shape, everything else the
    /// legacy prompt shape.
    pub model_id: String,

    /// AWS region for the Bedrock and S3 clients. Default: [`DEFAULT_REGION`].
    pub region: String,

    /// Destination bucket for published artifacts.
    ///
    /// Only required for the publish action; processing a document without a
    /// bucket works normally, and publishing becomes a no-op with a
    /// configuration warning.
    pub bucket: Option<String>,

    /// Key prefix for published artifacts. Default: [`DEFAULT_KEY_PREFIX`].
    ///
    /// The full key is `<prefix>/<YYYY>/<MM>/<DD>/<filename>`, dated at
    /// publish time.
    pub key_prefix: String,

    /// Maximum tokens the structuring service may generate. Default: 2000.
    ///
    /// Dense forms with many discovered extra fields can exceed 1000 output
    /// tokens; setting this too low truncates the JSON mid-object, which
    /// surfaces as a malformed-response failure.
    pub max_tokens: usize,

    /// Extracted-text length (trimmed characters) below which a run records
    /// a low-text warning. Default: 50.
    ///
    /// Very little text from a PDF almost always means a scanned or
    /// image-based source that would need OCR for good results. The run
    /// continues — the warning tells the caller why output may be thin.
    pub low_text_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            bucket: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_tokens: 2000,
            low_text_threshold: 50,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the environment, falling back to defaults.
    ///
    /// Reads `BEDROCK_MODEL_ID`, `AWS_REGION`, and `S3_BUCKET_NAME`. Empty
    /// values are treated as unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model_id) = std::env::var("BEDROCK_MODEL_ID") {
            if !model_id.is_empty() {
                config.model_id = model_id;
            }
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            if !region.is_empty() {
                config.region = region;
            }
        }
        config.bucket = std::env::var("S3_BUCKET_NAME")
            .ok()
            .filter(|bucket| !bucket.is_empty());
        config
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = model_id.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.bucket = Some(bucket.into());
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn low_text_threshold(mut self, chars: usize) -> Self {
        self.config.low_text_threshold = chars;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if c.model_id.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.key_prefix.trim_matches('/').is_empty() {
            return Err(PipelineError::InvalidConfig(
                "key prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.key_prefix, "processed-data");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.low_text_threshold, 50);
        assert!(config.bucket.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::builder()
            .model_id("anthropic.claude-v2")
            .region("eu-west-1")
            .bucket("license-archive")
            .max_tokens(4000)
            .build()
            .unwrap();
        assert_eq!(config.model_id, "anthropic.claude-v2");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.bucket.as_deref(), Some("license-archive"));
        assert_eq!(config.max_tokens, 4000);
    }

    #[test]
    fn rejects_empty_model_id() {
        let err = PipelineConfig::builder().model_id("  ").build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let err = PipelineConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_slash_only_prefix() {
        let err = PipelineConfig::builder().key_prefix("//").build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
