//! Environment driven configuration. Callers load `.env` with dotenvy first.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    classifier::{profile::UnsupportedLanguage, ProfileClassifier},
    instance::DEFAULT_CLOUD_INIT_DIR,
};

const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DETECT_PORT: u16 = 5000;
pub const DEFAULT_EXPENSES_PORT: u16 = 5001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
    #[error(transparent)]
    Language(#[from] UnsupportedLanguage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Reads `{prefix}_HOST` and `{prefix}_PORT`.
    pub fn from_lookup(
        prefix: &str,
        default_port: u16,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = lookup(&format!("{prefix}_HOST"))
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port_var = format!("{prefix}_PORT");
        let port = match lookup(&port_var) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: port_var,
                value: raw,
            })?,
            None => default_port,
        };

        Ok(Self { host, port })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub server: ServerConfig,
    /// Restricts the classifier's label set when present.
    pub languages: Option<Vec<String>>,
    pub instance_dir: PathBuf,
}

impl DetectionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server = ServerConfig::from_lookup("LANGDETECT", DEFAULT_DETECT_PORT, lookup)?;

        let languages = lookup("LANGDETECT_LANGUAGES")
            .map(|raw| {
                raw.split(',')
                    .map(|code| code.trim().to_ascii_lowercase())
                    .filter(|code| !code.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|codes| !codes.is_empty());

        let instance_dir = lookup("INSTANCE_METADATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLOUD_INIT_DIR));

        Ok(Self {
            server,
            languages,
            instance_dir,
        })
    }

    pub fn classifier(&self) -> Result<ProfileClassifier, ConfigError> {
        match &self.languages {
            Some(codes) => Ok(ProfileClassifier::with_languages(codes)?),
            None => Ok(ProfileClassifier::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpensesConfig {
    pub server: ServerConfig,
}

impl ExpensesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_lookup("EXPENSES", DEFAULT_EXPENSES_PORT, lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn detection_defaults() {
        let config = DetectionConfig::from_lookup(&lookup(&[])).unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:5000");
        assert_eq!(config.languages, None);
        assert_eq!(config.instance_dir, PathBuf::from(DEFAULT_CLOUD_INIT_DIR));
    }

    #[test]
    fn detection_overrides() {
        let config = DetectionConfig::from_lookup(&lookup(&[
            ("LANGDETECT_HOST", "127.0.0.1"),
            ("LANGDETECT_PORT", "8080"),
            ("LANGDETECT_LANGUAGES", "en, FR,,es"),
            ("INSTANCE_METADATA_DIR", "/tmp/instances"),
        ]))
        .unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
        assert_eq!(
            config.languages,
            Some(vec!["en".to_string(), "fr".to_string(), "es".to_string()])
        );
        assert_eq!(config.instance_dir, PathBuf::from("/tmp/instances"));
        assert!(config.classifier().is_ok());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = DetectionConfig::from_lookup(&lookup(&[("LANGDETECT_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "LANGDETECT_PORT"));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let config =
            DetectionConfig::from_lookup(&lookup(&[("LANGDETECT_LANGUAGES", "en,klingon")]))
                .unwrap();
        assert!(matches!(config.classifier(), Err(ConfigError::Language(_))));
    }

    #[test]
    fn expenses_use_their_own_port() {
        let config = ExpensesConfig::from_lookup(&lookup(&[])).unwrap();
        assert_eq!(config.server.port, DEFAULT_EXPENSES_PORT);

        let config = ExpensesConfig::from_lookup(&lookup(&[("EXPENSES_PORT", "9000")])).unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:9000");
    }
}
