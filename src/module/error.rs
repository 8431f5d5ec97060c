//! Module error types and result aliases.

use thiserror::Error;

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur during module lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// Configuration could not be parsed or validated.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Module is in an invalid state for the requested operation.
    #[error("invalid state: current={current}, expected={expected}")]
    InvalidState {
        /// Current state of the module.
        current: String,
        /// Expected state for the operation.
        expected: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModuleError::InvalidState {
            current: "stopped".to_string(),
            expected: "running".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state: current=stopped, expected=running"
        );

        let err = ModuleError::ConfigError("bad tolerance".to_string());
        assert_eq!(err.to_string(), "configuration error: bad tolerance");
    }
}
