use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for semcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for semcache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unknown eviction policy name
    #[error("unknown eviction policy '{name}' (expected noop, lru or costaware)")]
    InvalidPolicy { name: String },

    /// Cache backend failures (lookups, writes, context activation)
    #[error("cache backend error for run tag '{run_tag}': {message}")]
    Backend { run_tag: String, message: String },

    /// Byte accounting would become inconsistent
    #[error("byte accounting error for key '{key}': {message}")]
    Accounting { key: String, message: String },

    /// Upstream model call timed out
    #[error("model call to '{endpoint}' timed out after {duration:?}")]
    ModelTimeout { endpoint: String, duration: Duration },

    /// Upstream model call failed for any other reason
    #[error("model call to '{endpoint}' failed: {message}")]
    ModelRequest { endpoint: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Prompt trace construction errors
    #[error("trace error: {message}")]
    Trace { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(run_tag: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Backend {
            run_tag: run_tag.into(),
            message: message.into(),
        }
    }

    /// Create an accounting error
    pub fn accounting(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Accounting {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a model request error
    pub fn model_request(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ModelRequest {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a file system error
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Errors from the upstream model; the prompt can be skipped and the run continued.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ModelTimeout { .. } | Self::ModelRequest { .. })
    }

    /// Errors that must stop the process at startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InvalidPolicy { .. }
                | Self::FileSystem { .. }
                | Self::Json { .. }
        )
    }
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}
