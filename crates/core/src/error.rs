//! Error types for bfs-core
//!
//! Remote failures (`Network`, `NotFound`, `Auth`) abort the operation that
//! raised them. `Config` errors are raised before any remote call is made.

use thiserror::Error;

/// Result type alias for bfs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bfs-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid root specification, missing bucket, or bad config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Listing or write call failed in transit or on the server
    #[error("Network error: {0}")]
    Network(String),

    /// Bucket (or key) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Permission denied or invalid credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// True for failures of a listing or create-object call
    pub fn is_remote_access(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::NotFound(_) | Error::Auth(_)
        )
    }

    /// True for errors detected while assembling configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::TomlDe(_) | Error::TomlSer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Network("timeout".into()).is_remote_access());
        assert!(Error::NotFound("bucket".into()).is_remote_access());
        assert!(Error::Auth("denied".into()).is_remote_access());
        assert!(!Error::Config("bad root".into()).is_remote_access());

        assert!(Error::Config("bad root".into()).is_config());
        assert!(!Error::Network("timeout".into()).is_config());
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("Bucket not found: dev".into());
        assert_eq!(err.to_string(), "Not found: Bucket not found: dev");
    }
}
