use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Path does not exist: {0}")]
    NotFound(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("{}", storage_message(.status, .code, .message))]
    Storage {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Storage failure with no HTTP response attached (transport, signing)
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// Storage failure reported by the service
    pub fn storage_status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            status: Some(status),
            code,
            message: message.into(),
        }
    }

    /// HTTP status carried by a storage error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Storage { status, .. } => *status,
            _ => None,
        }
    }
}

fn storage_message(status: &Option<u16>, code: &Option<String>, message: &str) -> String {
    match (status, code) {
        (Some(status), Some(code)) => {
            format!("Storage error (status {status}, code {code}): {message}")
        }
        (Some(status), None) => format!("Storage error (status {status}): {message}"),
        (None, _) => format!("Storage error: {message}"),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_display_with_code() {
        let err = Error::storage_status(403, Some("AccessDenied".to_string()), "denied");
        assert_eq!(
            err.to_string(),
            "Storage error (status 403, code AccessDenied): denied"
        );
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_storage_display_without_status() {
        let err = Error::storage("connection reset");
        assert_eq!(err.to_string(), "Storage error: connection reset");
        assert_eq!(err.status(), None);
    }
}
