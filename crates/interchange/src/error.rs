use std::path::PathBuf;

/// Errors raised while loading or parsing configuration and session input.
///
/// The evaluation engine itself never fails; every problem it can detect is
/// caught here, once, at load time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration or session document is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A section has the wrong shape (e.g. `all` is not an array).
    #[error("{section}: {message}")]
    Shape { section: String, message: String },

    /// A record value cannot be represented (nested objects, bad numbers).
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn shape(section: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Shape {
            section: section.into(),
            message: message.into(),
        }
    }
}
