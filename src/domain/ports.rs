//! Domain ports - trait definitions at the system boundaries
//!
//! [`CommandRunner`] is the raw output source: it executes privileged
//! management-utility and OS-utility commands and returns captured text.
//! [`ControllerGrammar`] is the grammar adapter: a pure mapping from one
//! vendor's semi-structured text output to typed records, isolated so a
//! structured-output backend could replace it without touching correlation
//! or lifecycle logic.

use crate::domain::model::{Controller, PhysicalDrive, VirtualDriveSummary};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Command Execution Port
// =============================================================================

/// Captured output of one external command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `None` if terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the process exited zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best diagnostic text for a failed invocation: stderr if non-empty,
    /// stdout otherwise.
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Port for privileged command execution.
///
/// Every invocation carries a mandatory timeout; implementations must
/// convert an expired timeout into [`crate::Error::CommandTimedOut`],
/// never a hang, and a failed process launch into
/// [`crate::Error::ExecFailed`]. A non-zero exit is not an error at this
/// layer - callers interpret exit status and output text themselves.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput>;
}

// =============================================================================
// Controller Grammar Port
// =============================================================================

/// Per-drive diagnostic attributes extracted from a detail query.
/// `None` means the label was absent from the output, not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveDetail {
    pub temperature: Option<String>,
    pub power_on_hours: Option<String>,
    pub media_errors: Option<u64>,
    pub predictive_failures: Option<u64>,
}

/// Pure parsing contract for one controller vendor's text output.
///
/// Implementations never fail: malformed rows are skipped, absent labels
/// resolve to sentinel defaults, and unrecognized state codes pass through
/// verbatim.
pub trait ControllerGrammar: Send + Sync {
    /// Parse the controller summary (`show`) output
    fn parse_controller(&self, raw: &str) -> Controller;

    /// Parse the physical-drive listing (`/eall/sall show`) output
    fn parse_physical_drives(&self, raw: &str) -> Vec<PhysicalDrive>;

    /// Parse the virtual-drive listing (`/vall show`) output
    fn parse_virtual_drives(&self, raw: &str) -> Vec<VirtualDriveSummary>;

    /// Extract the OS device name from a per-array detail (`show all`) output
    fn parse_os_device(&self, raw: &str) -> Option<String>;

    /// Extract diagnostic attributes from a per-drive detail output
    fn parse_drive_detail(&self, raw: &str) -> DriveDetail;

    /// Whether mutating-command output carries the vendor's success marker
    fn is_success(&self, raw: &str) -> bool;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type CommandRunnerRef = Arc<dyn CommandRunner>;
pub type ControllerGrammarRef = Arc<dyn ControllerGrammar>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_success() {
        let out = CommandOutput {
            stdout: "ok".into(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert!(out.success());

        let out = CommandOutput {
            stdout: String::new(),
            stderr: "umount: not mounted".into(),
            exit_code: Some(32),
        };
        assert!(!out.success());
        assert_eq!(out.diagnostic(), "umount: not mounted");
    }

    #[test]
    fn test_diagnostic_falls_back_to_stdout() {
        let out = CommandOutput {
            stdout: "Status = Failure".into(),
            stderr: "  ".into(),
            exit_code: Some(1),
        };
        assert_eq!(out.diagnostic(), "Status = Failure");
    }
}
