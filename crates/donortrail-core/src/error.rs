//! Error types for donortrail core.

/// Errors that can occur while resolving members and aggregating donors.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested member id is not present in the roster.
    #[error("Member not found: {id}")]
    MemberNotFound {
        /// Bioguide id that was looked up
        id: String,
    },

    /// Upstream answered with a non-success, non-rate-limit status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Request URL with credentials redacted
        url: String,
    },

    /// Upstream kept rate limiting until the retry budget ran out.
    #[error("Rate limited after {attempts} attempts: {url}")]
    RateLimited {
        /// Number of attempts made
        attempts: u32,
        /// Request URL with credentials redacted
        url: String,
    },

    /// Connection-level failure (DNS, TLS, reset, ...).
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upstream body could not be decoded into the expected shape.
    #[error("Decode error: {message}")]
    Decode {
        /// What failed to decode
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for donortrail operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is transient.
    ///
    /// Rate limiting and transport failures may succeed on a later call;
    /// everything else is a property of the request or the data.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Transport { .. } => true,
            Error::MemberNotFound { .. } => false,
            Error::Upstream { .. } => false,
            Error::Decode { .. } => false,
            Error::Config { .. } => false,
            Error::Io(_) => false,
            Error::Serialization(_) => false,
        }
    }

    /// Returns whether this error came from talking to an upstream source.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Upstream { .. }
                | Error::RateLimited { .. }
                | Error::Transport { .. }
                | Error::Decode { .. }
        )
    }

    /// Creates a member-not-found error.
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Error::MemberNotFound { id: id.into() }
    }

    /// Creates an upstream status error.
    pub fn upstream<S: Into<String>>(status: u16, url: S) -> Self {
        Error::Upstream {
            status,
            url: url.into(),
        }
    }

    /// Creates a transport error with a message.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error with a message and source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a decode error.
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
