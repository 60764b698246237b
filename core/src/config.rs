//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::client::ResourcePath;
use crate::error::ApiError;

pub const DEFAULT_MIRROR_KEY: &str = "teachers";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Key under which locally created docentes are mirrored.
    pub mirror_key: String,
    /// Where `FileMirror` keeps its document. `None` keeps the mirror in memory.
    pub mirror_path: Option<PathBuf>,
    /// Handed to the transport; the client enforces no timeout of its own.
    pub timeout_secs: u64,
    pub read_path: ResourcePath,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            mirror_key: DEFAULT_MIRROR_KEY.to_string(),
            mirror_path: None,
            timeout_secs: 30,
            read_path: ResourcePath::Docentes,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.mirror_key, "teachers");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn fields_override_defaults() {
        let config = ClientConfig::from_json(
            r#"{"base_url":"https://api.example.edu","mirror_path":"/tmp/mirror.json","read_path":"profesores"}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.edu");
        assert_eq!(config.mirror_path, Some(PathBuf::from("/tmp/mirror.json")));
        assert_eq!(config.read_path, ResourcePath::Profesores);
        assert_eq!(config.mirror_key, "teachers");
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = ClientConfig::from_json(r#"{"timeout_secs":"soon"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
