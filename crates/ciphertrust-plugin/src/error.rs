//! Error types for the plugin server

/// Failures of the plugin machinery itself: codec, handshake and transport
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("msgpack decode error: {0}")]
    Decode(String),

    #[error("msgpack encode error: {0}")]
    Encode(String),

    #[error("value does not conform to type {expected}: {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("certificate error: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Error returned by resource and data source handlers
///
/// Surfaced to Terraform as a single error diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{summary}: {detail}")]
pub struct ProviderError {
    pub summary: String,
    pub detail: String,
    pub attribute: Option<Vec<String>>,
}

impl ProviderError {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    /// Attach the error to a top-level attribute
    pub fn at(mut self, attribute: &str) -> Self {
        self.attribute = Some(vec![attribute.to_string()]);
        self
    }
}

impl From<PluginError> for ProviderError {
    fn from(err: PluginError) -> Self {
        ProviderError::new("Internal plugin error", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("Error creating user", "status 409").at("username");
        assert_eq!(err.to_string(), "Error creating user: status 409");
        assert_eq!(err.attribute, Some(vec!["username".to_string()]));
    }

    #[test]
    fn test_plugin_error_conversion() {
        let err: ProviderError = PluginError::Decode("truncated".to_string()).into();
        assert_eq!(err.summary, "Internal plugin error");
        assert!(err.detail.contains("truncated"));
    }
}
