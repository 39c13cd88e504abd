//! Error types for the MegaRAID operator
//!
//! Provides structured error types for command execution, inventory
//! queries, and lifecycle operations. Parse-level anomalies are not
//! represented here: malformed rows and missing labels are absorbed at the
//! parsing layer and surface as skipped rows or sentinel values.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the operator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Command Execution Errors
    // =========================================================================
    #[error("Command timed out after {timeout:?}: {command}")]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("Command execution failed: {command}: {reason}")]
    ExecFailed { command: String, reason: String },

    // =========================================================================
    // Lifecycle Precondition Errors
    // =========================================================================
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No filesystem found on {device}; format the device first")]
    NoFilesystem { device: String },

    #[error("Unsupported filesystem: {filesystem} (supported: ext4, xfs)")]
    UnsupportedFilesystem { filesystem: String },

    #[error("Another operation is in progress on {resource}")]
    OperationInProgress { resource: String },

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an error, used to map failures onto the
/// API response surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller supplied an invalid or unsatisfiable request
    InvalidInput,
    /// The target resource is busy with another mutation
    Busy,
    /// The external command did not complete in time
    Timeout,
    /// The external command could not be executed
    Unavailable,
    /// Anything else
    Internal,
}

impl Error {
    /// Classify this error for response mapping
    pub fn classify(&self) -> ErrorClass {
        match self {
            Error::InvalidRequest(_)
            | Error::NoFilesystem { .. }
            | Error::UnsupportedFilesystem { .. } => ErrorClass::InvalidInput,

            Error::OperationInProgress { .. } => ErrorClass::Busy,

            Error::CommandTimedOut { .. } => ErrorClass::Timeout,

            Error::ExecFailed { .. } => ErrorClass::Unavailable,

            Error::Internal(_) | Error::Configuration(_) | Error::Io(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Whether the failure was caused by the caller rather than the host
    pub fn is_caller_error(&self) -> bool {
        matches!(self.classify(), ErrorClass::InvalidInput | ErrorClass::Busy)
    }
}

/// Result type alias for the operator
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = Error::InvalidRequest("no drives selected".into());
        assert_eq!(err.classify(), ErrorClass::InvalidInput);
        assert!(err.is_caller_error());

        let err = Error::OperationInProgress {
            resource: "vd:239".into(),
        };
        assert_eq!(err.classify(), ErrorClass::Busy);
        assert!(err.is_caller_error());

        let err = Error::CommandTimedOut {
            command: "storcli64 /c0 show".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.classify(), ErrorClass::Timeout);
        assert!(!err.is_caller_error());

        let err = Error::ExecFailed {
            command: "mount /dev/sdb /mnt/data".into(),
            reason: "No such file or directory".into(),
        };
        assert_eq!(err.classify(), ErrorClass::Unavailable);
    }

    #[test]
    fn test_error_display_carries_diagnostics() {
        let err = Error::UnsupportedFilesystem {
            filesystem: "btrfs".into(),
        };
        assert!(err.to_string().contains("btrfs"));
        assert!(err.to_string().contains("ext4"));

        let err = Error::NoFilesystem {
            device: "/dev/sdb".into(),
        };
        assert!(err.to_string().contains("/dev/sdb"));
    }
}
