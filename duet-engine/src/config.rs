//! Engine configuration

use duet_chat::Markers;
use duet_error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Round cap used when none is configured
pub const DEFAULT_MAX_ROUNDS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Turns allowed after the seed before the run is exhausted
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default)]
    pub markers: Markers,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            markers: Markers::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            Error::config_invalid(format!("invalid engine configuration: {}", e))
                .with_operation("config::parse")
                .set_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).with_context("path", path.display().to_string()))?;
        Self::from_json_str(&content)
            .map_err(|e| e.with_operation("config::from_file").with_context("path", path.display().to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(Error::config_invalid("max_rounds must be at least 1")
                .with_operation("config::validate"));
        }
        if self.markers.termination.is_empty() || self.markers.artifact.is_empty() {
            return Err(Error::config_invalid("markers must not be empty")
                .with_operation("config::validate"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_error::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_rounds, 20);
        assert_eq!(config.markers.termination, "TERMINATE");
        assert_eq!(config.markers.artifact, "IMAGE_GENERATION");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"max_rounds": 5}"#).unwrap();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.markers, Markers::default());

        let config = EngineConfig::from_json_str(r#"{"markers": {"termination": "LGTM"}}"#).unwrap();
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.markers.termination, "LGTM");
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineConfig::from_json_str(r#"{"max_rounds": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = EngineConfig::from_json_str(r#"{"markers": {"artifact": ""}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = EngineConfig::from_json_str(r#"{"max_round": 3}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.source_ref().is_some());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_rounds": 3, "markers": {{"artifact": "[ART]"}}}}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.markers.artifact, "[ART]");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert!(err.context_value("path").is_some());
    }
}
