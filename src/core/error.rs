use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures raised by a provider adapter while generating text
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered, but not with usable content
    #[error("API error: {0}")]
    Api(String),

    /// The provider rejected the credentials (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Provider did not respond within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            ProviderError::Api(format!("API returned error status: {}", err))
        } else if err.is_decode() {
            ProviderError::Serialization(format!("Failed to decode response: {}", err))
        } else {
            ProviderError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Serialization(format!("JSON error: {}", err))
    }
}

/// Failures raised by a history store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be reached or refused the connection
    #[error("Storage connection error: {0}")]
    Connection(String),

    #[error("Storage write error: {0}")]
    Write(String),

    #[error("Storage read error: {0}")]
    Read(String),

    #[error("Storage did not respond within {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Outcome of a failed dispatch, rendered to callers through `Display`
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The requested tag does not name a registered provider
    #[error("Unknown model type: {0}")]
    UnknownModelType(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Process-level error type for startup and serving
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The HTTP server failed to bind or stopped unexpectedly
    #[error("Server error: {0}")]
    Server(String),
}

impl From<serde_yml::Error> for RelayError {
    fn from(err: serde_yml::Error) -> Self {
        RelayError::Serialization(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_keeps_provider_text() {
        let err = DispatchError::from(ProviderError::Api("quota exceeded".to_string()));
        assert_eq!(err.to_string(), "API error: quota exceeded");
    }

    #[test]
    fn timeouts_render_whole_seconds() {
        let err = StorageError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Storage did not respond within 10s");
    }

    #[test]
    fn unknown_model_type_names_the_tag() {
        let err = DispatchError::UnknownModelType("openai".to_string());
        assert_eq!(err.to_string(), "Unknown model type: openai");
    }
}
