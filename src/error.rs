use thiserror::Error;

/// Unified error type for tag-retention operations
#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("Invalid retention '{expression}': {reason}")]
    InvalidRetentionFormat { expression: String, reason: String },

    #[error("Configuration input '{input}' is not an array: {reason}")]
    ConfigNotArray { input: String, reason: String },

    #[error("Configuration {location} is missing required field(s): {}", fields.join(", "))]
    ConfigMissingFields {
        location: String,
        fields: Vec<String>,
    },

    #[error("Configuration {location} has an invalid '{field}': {reason}")]
    ConfigInvalidField {
        location: String,
        field: String,
        reason: String,
    },

    #[error("Invalid match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Registry operation failed: {0}")]
    Registry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in tag-retention
pub type Result<T> = std::result::Result<T, RetentionError>;

impl RetentionError {
    /// Create a retention format error for `expression`
    pub fn retention_format(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        RetentionError::InvalidRetentionFormat {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-fields error for the entry at `location`
    pub fn missing_fields(location: impl Into<String>, fields: &[&str]) -> Self {
        RetentionError::ConfigMissingFields {
            location: location.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Create an invalid-field error for the entry at `location`
    pub fn invalid_field(
        location: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RetentionError::ConfigInvalidField {
            location: location.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration loading error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RetentionError::Config(msg.into())
    }

    /// Create an authentication error with context
    pub fn authentication(msg: impl Into<String>) -> Self {
        RetentionError::Authentication(msg.into())
    }

    /// Create a registry error with context
    pub fn registry(msg: impl Into<String>) -> Self {
        RetentionError::Registry(msg.into())
    }

    /// Whether this error belongs to the configuration tier.
    ///
    /// Configuration errors are raised before any registry interaction and
    /// always abort the run. Everything else happened while talking to the
    /// registry.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RetentionError::InvalidRetentionFormat { .. }
                | RetentionError::ConfigNotArray { .. }
                | RetentionError::ConfigMissingFields { .. }
                | RetentionError::ConfigInvalidField { .. }
                | RetentionError::InvalidPattern { .. }
                | RetentionError::Config(_)
        )
    }
}
