//! Client error types for the CipherTrust REST API

/// Errors that can occur during CmClient operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// HTTP status returned by the appliance, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::AuthFailed("bad credentials".to_string());
        assert_eq!(err.to_string(), "authentication failed: bad credentials");

        let err = ClientError::RequestFailed {
            status: 409,
            body: "{\"code\":4}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 409: {\"code\":4}"
        );
    }

    #[test]
    fn test_not_found() {
        let err = ClientError::RequestFailed {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ClientError::InvalidConfig("address".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
    }
}
