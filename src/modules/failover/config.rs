//! Failover configuration types.

use super::error::{FailoverError, FailoverResult};
use super::topology::Topology;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long an active server may go without serving a changed playlist.
pub const DEFAULT_NOT_MODIFIED_TOLERANCE: Duration = Duration::from_secs(8);

/// Configuration for the failover module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Staleness tolerance of the active server.
    #[serde(with = "humantime_serde")]
    pub not_modified_tolerance: Duration,

    /// Reject topologies containing a path with no servers instead of
    /// dropping that path.
    pub strict_topology: bool,

    /// Static topology applied on init and reload.
    pub paths: Topology,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            not_modified_tolerance: DEFAULT_NOT_MODIFIED_TOLERANCE,
            strict_topology: false,
            paths: Topology::new(),
        }
    }
}

impl FailoverConfig {
    /// Set the staleness tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.not_modified_tolerance = tolerance;
        self
    }

    /// Check the configuration for values the balancer cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero tolerance, or, in strict mode, for a
    /// static path without servers.
    pub fn validate(&self) -> FailoverResult<()> {
        if self.not_modified_tolerance.is_zero() {
            return Err(FailoverError::InvalidTolerance(
                "not_modified_tolerance must be greater than zero".to_string(),
            ));
        }

        if self.strict_topology {
            if let Some(path) = self.paths.empty_paths().next() {
                return Err(FailoverError::EmptyServerList(path.to_string()));
            }
        }

        Ok(())
    }
}
