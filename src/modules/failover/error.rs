//! Failover error types.

use thiserror::Error;

/// Errors raised around the balancer: configuration and strict topology checks.
///
/// Balancer operations themselves never fail.
#[derive(Debug, Error)]
pub enum FailoverError {
    /// A path was listed without any server.
    #[error("path '{0}' has no servers")]
    EmptyServerList(String),

    /// The staleness tolerance is unusable.
    #[error("invalid staleness tolerance: {0}")]
    InvalidTolerance(String),
}

/// Result type for failover operations.
pub type FailoverResult<T> = Result<T, FailoverError>;
