//! Configuration structures for report extraction and batch runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StockmailError};
use crate::extract::ContentType;

/// Main configuration for stockmail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StockmailConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Report extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Content type assumed when the caller gives no hint.
    pub default_content_type: ContentType,

    /// Retry with the plain-text walker when the markup walker finds nothing.
    pub markup_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_content_type: ContentType::Html,
            markup_fallback: true,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions picked up by a batch glob.
    pub extensions: Vec<String>,

    /// Skip files whose report date was already extracted in the same run.
    pub skip_duplicate_dates: bool,

    /// Number of documents extracted concurrently.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string(), "htm".to_string(), "txt".to_string()],
            skip_duplicate_dates: true,
            jobs: 4,
        }
    }
}

impl BatchConfig {
    /// Whether a file with this extension belongs in a batch.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl StockmailConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| StockmailError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StockmailError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StockmailConfig =
            serde_json::from_str(r#"{ "batch": { "jobs": 8 } }"#).unwrap();

        assert_eq!(config.batch.jobs, 8);
        assert!(config.batch.skip_duplicate_dates);
        assert_eq!(config.extraction.default_content_type, ContentType::Html);
        assert!(config.extraction.markup_fallback);
    }

    #[test]
    fn test_content_type_serializes_lowercase() {
        let json = serde_json::to_value(ExtractionConfig::default()).unwrap();
        assert_eq!(json["default_content_type"], "html");
    }

    #[test]
    fn test_accepts_extension_ignores_case() {
        let batch = BatchConfig::default();
        assert!(batch.accepts_extension("HTML"));
        assert!(batch.accepts_extension("txt"));
        assert!(!batch.accepts_extension("pdf"));
    }
}
