//! Lifecycle orchestrator
//!
//! The four state-changing operations: create/delete array on the
//! controller side, mount/unmount/format on the OS side. Each operation
//! validates its preconditions, then holds the per-resource lock for the
//! duration of the external command. Controller tools report success only
//! as text, so mutating outcomes carry the raw diagnostic output verbatim
//! instead of a classified failure reason.

use crate::domain::model::OperationOutcome;
use crate::error::{Error, Result};
use crate::inventory::StorcliClient;
use crate::lifecycle::locks::{array_key, controller_key, device_key, ResourceLocks};
use crate::osinfo::OsInventory;
use std::sync::Arc;
use tracing::{info, warn};

/// Filesystems the format operation knows how to create
pub const SUPPORTED_FILESYSTEMS: &[&str] = &["ext4", "xfs"];

/// Sequences destructive operations behind precondition checks and
/// per-resource mutual exclusion
pub struct LifecycleOrchestrator {
    client: Arc<StorcliClient>,
    os: Arc<OsInventory>,
    locks: Arc<ResourceLocks>,
}

impl LifecycleOrchestrator {
    pub fn new(
        client: Arc<StorcliClient>,
        os: Arc<OsInventory>,
        locks: Arc<ResourceLocks>,
    ) -> Self {
        Self { client, os, locks }
    }

    // =========================================================================
    // Controller-side Operations
    // =========================================================================

    /// Build a new virtual drive of the given RAID type over the given
    /// physical drives. Minimum-drive-count policy is advisory and lives
    /// with the caller; the controller is trusted to reject invalid
    /// combinations, and its raw output is surfaced for diagnosis.
    pub async fn create_array(
        &self,
        raid_type: &str,
        drives: &[String],
    ) -> Result<OperationOutcome> {
        if drives.is_empty() {
            return Err(Error::InvalidRequest("no drives selected".into()));
        }

        let _guard = self
            .locks
            .try_acquire(&controller_key(self.client.controller_index()))?;

        info!(raid_type, drives = drives.len(), "creating array");
        let out = self.client.add_virtual_drive(raid_type, drives).await?;

        let success = self.client.output_indicates_success(&out.stdout);
        if !success {
            warn!(raid_type, "controller refused array creation");
        }
        Ok(OperationOutcome::from_raw(success, out.stdout))
    }

    /// Forcibly delete an array. Destructive and irreversible; callers
    /// are expected to unmount first.
    pub async fn delete_array(&self, array_id: &str) -> Result<OperationOutcome> {
        if array_id.trim().is_empty() {
            return Err(Error::InvalidRequest("no array id provided".into()));
        }

        let vd_number = StorcliClient::vd_number(array_id);
        let _guard = self.locks.try_acquire(&array_key(vd_number))?;

        info!(array = array_id, "deleting array");
        let out = self.client.delete_virtual_drive(vd_number).await?;

        let success = self.client.output_indicates_success(&out.stdout);
        if !success {
            warn!(array = array_id, "controller refused array deletion");
        }
        Ok(OperationOutcome::from_raw(success, out.stdout))
    }

    // =========================================================================
    // OS-side Operations
    // =========================================================================

    /// Mount a device. Refuses with `NoFilesystem` when no filesystem is
    /// supplied and none can be probed; an unformatted device is never
    /// mounted. Creates the mount point if necessary.
    pub async fn mount_device(
        &self,
        device: &str,
        mount_point: &str,
        filesystem: Option<&str>,
    ) -> Result<OperationOutcome> {
        if device.trim().is_empty() || mount_point.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "device and mount point are required".into(),
            ));
        }

        let _guard = self.locks.try_acquire(&device_key(device))?;

        let filesystem = match filesystem {
            Some(fs) if !fs.trim().is_empty() => fs.to_string(),
            _ => self
                .os
                .probe_filesystem(device)
                .await
                .ok_or_else(|| Error::NoFilesystem {
                    device: device.to_string(),
                })?,
        };

        info!(device, mount_point, filesystem, "mounting device");

        let mkdir = self.os.ensure_mount_point(mount_point).await?;
        if !mkdir.success() {
            return Ok(OperationOutcome::failed(mkdir.diagnostic().to_string()));
        }

        let out = self.os.mount(device, mount_point).await?;
        if out.success() {
            Ok(OperationOutcome::succeeded(format!(
                "Successfully mounted {} to {}",
                device, mount_point
            )))
        } else {
            Ok(OperationOutcome::failed(out.diagnostic().to_string()))
        }
    }

    /// Unmount a device. Whether the device is actually mounted is left
    /// to the OS; its error text is reported verbatim.
    pub async fn unmount_device(&self, device: &str) -> Result<OperationOutcome> {
        if device.trim().is_empty() {
            return Err(Error::InvalidRequest("device is required".into()));
        }

        let _guard = self.locks.try_acquire(&device_key(device))?;

        info!(device, "unmounting device");
        let out = self.os.unmount(device).await?;
        if out.success() {
            Ok(OperationOutcome::succeeded(format!(
                "Successfully unmounted {}",
                device
            )))
        } else {
            Ok(OperationOutcome::failed(out.diagnostic().to_string()))
        }
    }

    /// Create a filesystem on a device. The most destructive operation in
    /// the system; only ever invoked on explicit request. Unmounts first
    /// (best effort, formatting a mounted device is unsafe), then runs the
    /// filesystem creator under the long format timeout.
    pub async fn format_device(&self, device: &str, filesystem: &str) -> Result<OperationOutcome> {
        if device.trim().is_empty() {
            return Err(Error::InvalidRequest("device is required".into()));
        }
        if !SUPPORTED_FILESYSTEMS.contains(&filesystem) {
            return Err(Error::UnsupportedFilesystem {
                filesystem: filesystem.to_string(),
            });
        }

        let _guard = self.locks.try_acquire(&device_key(device))?;

        info!(device, filesystem, "formatting device");

        // Best effort: the device may well not be mounted
        if let Err(e) = self.os.unmount(device).await {
            warn!(device, error = %e, "pre-format unmount failed; continuing");
        }

        let out = self.os.make_filesystem(device, filesystem).await?;
        if out.success() {
            Ok(OperationOutcome::succeeded(format!(
                "Successfully formatted {} as {}",
                device, filesystem
            )))
        } else {
            Ok(OperationOutcome::failed(out.diagnostic().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use crate::inventory::{StorcliConfig, StorcliGrammar};
    use crate::osinfo::OsConfig;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn orchestrator(runner: Arc<ScriptedRunner>) -> LifecycleOrchestrator {
        let client = Arc::new(StorcliClient::new(
            runner.clone(),
            Arc::new(StorcliGrammar::new()),
            StorcliConfig {
                path: "storcli64".into(),
                ..StorcliConfig::default()
            },
        ));
        let os = Arc::new(OsInventory::new(runner, OsConfig::default()));
        LifecycleOrchestrator::new(client, os, Arc::new(ResourceLocks::new()))
    }

    #[tokio::test]
    async fn test_create_array_rejects_empty_drive_list() {
        let runner = Arc::new(ScriptedRunner::new());
        let orch = orchestrator(runner.clone());

        let err = orch.create_array("raid1", &[]).await.unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));
        // The controller was never invoked
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_array_scans_success_marker() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "storcli64 /c0 add vd type=raid5 drives=252:0,252:1,252:2",
            "Status = Success\nDescription = Add VD Succeeded\n",
        ));
        let orch = orchestrator(runner);

        let outcome = orch
            .create_array("raid5", &["252:0".into(), "252:1".into(), "252:2".into()])
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(outcome.output.unwrap().contains("Add VD Succeeded"));
    }

    #[tokio::test]
    async fn test_create_array_surfaces_refusal_text() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "storcli64 /c0 add vd type=raid6 drives=252:0",
            "Status = Failure\nDescription = operation not allowed: insufficient drives\n",
        ));
        let orch = orchestrator(runner);

        let outcome = orch.create_array("raid6", &["252:0".into()]).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.output.unwrap().contains("insufficient drives"));
    }

    #[tokio::test]
    async fn test_delete_array_rejects_empty_id() {
        let runner = Arc::new(ScriptedRunner::new());
        let orch = orchestrator(runner.clone());

        let err = orch.delete_array("").await.unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_array_resolves_vd_number() {
        let runner = Arc::new(
            ScriptedRunner::new().on("storcli64 /c0/v239 del force", "Status = Success\n"),
        );
        let orch = orchestrator(runner.clone());

        let outcome = orch.delete_array("0/239").await.unwrap();
        assert!(outcome.success);
        assert_eq!(runner.call_count("storcli64 /c0/v239 del force"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_deletes_execute_exactly_once() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_latency(Duration::from_millis(100))
                .on("storcli64 /c0/v239 del force", "Status = Success\n"),
        );
        let orch = Arc::new(orchestrator(runner.clone()));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.delete_array("0/239").await })
        };
        // Let the first delete reach the controller and hold the lock
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = orch.delete_array("0/239").await;
        assert_matches!(second, Err(Error::OperationInProgress { .. }));

        let outcome = first.await.unwrap().unwrap();
        assert!(outcome.success);
        // The destructive command ran exactly once
        assert_eq!(runner.call_count("storcli64 /c0/v239 del force"), 1);
    }

    #[tokio::test]
    async fn test_mount_requires_device_and_mount_point() {
        let orch = orchestrator(Arc::new(ScriptedRunner::new()));
        assert_matches!(
            orch.mount_device("", "/mnt/data", None).await,
            Err(Error::InvalidRequest(_))
        );
        assert_matches!(
            orch.mount_device("/dev/sdb", "", None).await,
            Err(Error::InvalidRequest(_))
        );
    }

    #[tokio::test]
    async fn test_mount_refuses_unformatted_device() {
        // blkid reports no TYPE attribute
        let runner = Arc::new(
            ScriptedRunner::new().on("blkid /dev/sdb", "/dev/sdb: PTTYPE=\"gpt\"\n"),
        );
        let orch = orchestrator(runner.clone());

        let err = orch
            .mount_device("/dev/sdb", "/mnt/data", None)
            .await
            .unwrap_err();
        assert_matches!(err, Error::NoFilesystem { .. });
        // No mount was attempted
        assert_eq!(runner.call_count("mount /dev/sdb /mnt/data"), 0);
        assert_eq!(runner.call_count("mkdir -p /mnt/data"), 0);
    }

    #[tokio::test]
    async fn test_mount_with_supplied_filesystem_skips_probe() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("mkdir -p /mnt/data", "")
                .on("mount /dev/sdb /mnt/data", ""),
        );
        let orch = orchestrator(runner.clone());

        let outcome = orch
            .mount_device("/dev/sdb", "/mnt/data", Some("ext4"))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(runner.call_count("blkid /dev/sdb"), 0);
        assert_eq!(runner.call_count("mount /dev/sdb /mnt/data"), 1);
    }

    #[tokio::test]
    async fn test_mount_reports_os_error_verbatim() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("blkid /dev/sdb", "/dev/sdb: TYPE=\"ext4\"\n")
                .on("mkdir -p /mnt/data", "")
                .on_failing(
                    "mount /dev/sdb /mnt/data",
                    "mount: /mnt/data: wrong fs type, bad option, bad superblock",
                    32,
                ),
        );
        let orch = orchestrator(runner);

        let outcome = orch
            .mount_device("/dev/sdb", "/mnt/data", None)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.unwrap().contains("bad superblock"));
    }

    #[tokio::test]
    async fn test_unmount_reports_os_error_verbatim() {
        let runner = Arc::new(ScriptedRunner::new().on_failing(
            "umount /dev/sdb",
            "umount: /dev/sdb: not mounted.",
            32,
        ));
        let orch = orchestrator(runner);

        let outcome = orch.unmount_device("/dev/sdb").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message.unwrap(), "umount: /dev/sdb: not mounted.");
    }

    #[tokio::test]
    async fn test_format_rejects_unsupported_filesystem() {
        let runner = Arc::new(ScriptedRunner::new());
        let orch = orchestrator(runner.clone());

        let err = orch.format_device("/dev/sdb", "btrfs").await.unwrap_err();
        assert_matches!(err, Error::UnsupportedFilesystem { .. });
        // Neither unmount nor format ran
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_format_unmounts_first_best_effort() {
        // umount fails (device not mounted); format proceeds anyway
        let runner = Arc::new(
            ScriptedRunner::new()
                .on_failing("umount /dev/sdb", "umount: /dev/sdb: not mounted.", 32)
                .on("mkfs.ext4 -F /dev/sdb", "Creating filesystem ...\ndone\n"),
        );
        let orch = orchestrator(runner.clone());

        let outcome = orch.format_device("/dev/sdb", "ext4").await.unwrap();
        assert!(outcome.success);
        assert_eq!(runner.call_count("umount /dev/sdb"), 1);
        assert_eq!(runner.call_count("mkfs.ext4 -F /dev/sdb"), 1);
    }

    #[tokio::test]
    async fn test_format_failure_reports_creator_diagnostics() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("umount /dev/sdb", "")
                .on_failing(
                    "mkfs.xfs -f /dev/sdb",
                    "mkfs.xfs: cannot open /dev/sdb: Device or resource busy",
                    1,
                ),
        );
        let orch = orchestrator(runner);

        let outcome = orch.format_device("/dev/sdb", "xfs").await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.unwrap().contains("resource busy"));
    }
}
