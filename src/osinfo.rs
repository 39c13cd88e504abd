//! OS-level block device facts
//!
//! Collects the OS view of the storage stack: the live mount table,
//! filesystem probes, and top-level disk enumeration. These are always
//! OS-view facts, never inferred from controller text. The same module
//! carries the OS mutation commands (mkdir/mount/umount/mkfs) used by the
//! lifecycle layer, so every privileged invocation goes through one place.

use crate::domain::ports::{CommandOutput, CommandRunnerRef};
use crate::error::Result;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

// =============================================================================
// Pure Parsers
// =============================================================================

/// Parse `mount` output into a device -> mount point map. Only lines for
/// block devices (leading `/dev/`) are considered; duplicate entries keep
/// the last mount seen.
pub fn parse_mount_table(raw: &str) -> HashMap<String, String> {
    let mut mounts = HashMap::new();
    for line in raw.lines() {
        if !line.starts_with("/dev/") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        // "<device> on <mount point> type <fs> (<options>)"
        if parts.len() >= 3 && parts[1] == "on" {
            mounts.insert(parts[0].to_string(), parts[2].to_string());
        }
    }
    mounts
}

/// Extract the filesystem type from `blkid` output. Absence of a `TYPE=`
/// attribute means no filesystem was detected.
pub fn parse_blkid_type(raw: &str) -> Option<String> {
    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("TYPE=") {
            let value = value.trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse `lsblk -ndo NAME,TYPE` output into `/dev/<name>` paths for
/// devices of kind "disk" (partitions, loop devices etc. excluded).
pub fn parse_lsblk_disks(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [name, "disk"] if !name.is_empty() => Some(format!("/dev/{}", name)),
                _ => None,
            }
        })
        .collect()
}

// =============================================================================
// OS Inventory
// =============================================================================

/// Configuration for OS command invocations
#[derive(Debug, Clone)]
pub struct OsConfig {
    /// Timeout for mount-table scans, probes, mount/unmount
    pub op_timeout: Duration,
    /// Timeout for filesystem creation, which can run for minutes
    pub format_timeout: Duration,
}

impl Default for OsConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(30),
            format_timeout: Duration::from_secs(300),
        }
    }
}

/// The OS state collector and OS mutation surface
pub struct OsInventory {
    runner: CommandRunnerRef,
    config: OsConfig,
}

impl OsInventory {
    pub fn new(runner: CommandRunnerRef, config: OsConfig) -> Self {
        Self { runner, config }
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Device -> mount point mapping from the live mount table.
    /// A failed scan degrades to an empty map.
    pub async fn mount_table(&self) -> HashMap<String, String> {
        match self.runner.run("mount", &[], self.config.op_timeout).await {
            Ok(out) => parse_mount_table(&out.stdout),
            Err(e) => {
                warn!(error = %e, "mount table scan failed");
                HashMap::new()
            }
        }
    }

    /// Probe a device's filesystem type. `None` means no filesystem was
    /// detected; probe failures also resolve to `None`, never an error.
    pub async fn probe_filesystem(&self, device: &str) -> Option<String> {
        match self
            .runner
            .run("blkid", &[device], self.config.op_timeout)
            .await
        {
            Ok(out) => parse_blkid_type(&out.stdout),
            Err(e) => {
                warn!(device, error = %e, "filesystem probe failed");
                None
            }
        }
    }

    /// Top-level block devices of kind "disk"
    pub async fn list_disks(&self) -> Vec<String> {
        match self
            .runner
            .run("lsblk", &["-ndo", "NAME,TYPE"], self.config.op_timeout)
            .await
        {
            Ok(out) => parse_lsblk_disks(&out.stdout),
            Err(e) => {
                warn!(error = %e, "block device enumeration failed");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Mutations (interpreted by the lifecycle layer)
    // =========================================================================

    /// Create the mount-point directory if it does not exist
    pub async fn ensure_mount_point(&self, mount_point: &str) -> Result<CommandOutput> {
        self.runner
            .run("mkdir", &["-p", mount_point], self.config.op_timeout)
            .await
    }

    /// Mount a device onto an existing mount point
    pub async fn mount(&self, device: &str, mount_point: &str) -> Result<CommandOutput> {
        self.runner
            .run("mount", &[device, mount_point], self.config.op_timeout)
            .await
    }

    /// Unmount a device
    pub async fn unmount(&self, device: &str) -> Result<CommandOutput> {
        self.runner
            .run("umount", &[device], self.config.op_timeout)
            .await
    }

    /// Create a filesystem. The caller validates the filesystem choice;
    /// this only knows how to invoke the two supported creators.
    pub async fn make_filesystem(&self, device: &str, filesystem: &str) -> Result<CommandOutput> {
        let (program, force_flag) = match filesystem {
            "xfs" => ("mkfs.xfs", "-f"),
            _ => ("mkfs.ext4", "-F"),
        };
        self.runner
            .run(program, &[force_flag, device], self.config.format_timeout)
            .await
    }
}
