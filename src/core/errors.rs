//! Custom error types for translation and configuration

use thiserror::Error;

/// Translation-related errors
///
/// Transport faults, unexpected HTTP statuses and malformed provider
/// responses all collapse into [`TranslationError::Backend`]; callers only
/// ever need the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Nothing to translate
    #[error("No text to translate")]
    EmptyInput,

    /// Any failure reported by, or while talking to, a backend
    #[error("Error translating: {message}")]
    Backend {
        /// Human readable description, shown verbatim to the user
        message: String,
    },
}

impl TranslationError {
    /// Provider answered with a non-200 status
    pub fn http_status(status: u16) -> Self {
        Self::Backend {
            message: format!("HTTP error with status code: {}", status),
        }
    }

    /// Provider answered 200 but the body is missing the expected field
    pub fn unexpected_response(body: impl std::fmt::Display) -> Self {
        Self::Backend {
            message: format!("Unknown error when translating: {}", body),
        }
    }

    /// Connection, timeout or decoding fault
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::transport(err)
    }
}

/// Configuration errors
///
/// Resolution stops at the first problem it finds, so each variant names a
/// single offending item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Backend identifier is not registered
    #[error("Unknown API type: {kind}")]
    UnknownBackend {
        /// Identifier found in the config source
        kind: String,
    },

    /// Required field absent or empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the field as written in the config source
        field: String,
    },

    /// Rule pattern does not compile
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRule {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Backend identifier registered twice
    #[error("Backend already registered: {name}")]
    DuplicateBackend {
        /// The identifier
        name: String,
    },

    /// Backend identifier is empty or contains whitespace
    #[error("Invalid backend name: '{name}'")]
    InvalidBackendName {
        /// The identifier
        name: String,
    },

    /// No configuration has been loaded successfully yet
    #[error("No configuration loaded")]
    NotLoaded,

    /// The config document could not be read or parsed
    #[error("Configuration source error: {message}")]
    Source {
        /// Underlying loader message
        message: String,
    },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Source {
            message: err.to_string(),
        }
    }
}

/// Any error surfaced to the collaborator driving the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipperError {
    /// Translation failed or input was empty
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_messages() {
        assert_eq!(
            TranslationError::http_status(503).to_string(),
            "Error translating: HTTP error with status code: 503"
        );
        assert_eq!(
            TranslationError::unexpected_response("{\"error_code\":\"54001\"}").to_string(),
            "Error translating: Unknown error when translating: {\"error_code\":\"54001\"}"
        );
    }

    #[test]
    fn test_missing_field_names_field() {
        let err = ConfigError::MissingField {
            field: "appkey".to_string(),
        };
        assert!(err.to_string().contains("appkey"));
    }

    #[test]
    fn test_umbrella_is_transparent() {
        let err: ClipperError = TranslationError::EmptyInput.into();
        assert_eq!(err.to_string(), "No text to translate");

        let err: ClipperError = ConfigError::NotLoaded.into();
        assert_eq!(err.to_string(), "No configuration loaded");
    }
}
