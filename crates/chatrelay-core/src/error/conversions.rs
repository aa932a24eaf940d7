//! From trait implementations for RelayError conversions

use super::types::RelayError;

impl From<std::io::Error> for RelayError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<toml::de::Error> for RelayError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.message().to_string(), "Parsing TOML configuration")
    }
}

impl From<toml::ser::Error> for RelayError {
    fn from(error: toml::ser::Error) -> Self {
        Self::config_with_context(error.to_string(), "Serializing configuration")
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        Self::http_client(error.to_string())
    }
}
