//! State correlation
//!
//! Joins controller-reported virtual drives to OS-level device names,
//! mount points, and filesystem types, producing the unified Array view.
//! The fetch is two-phase: one listing query for summaries, then one
//! detail query per array through a bounded concurrent stream that
//! preserves listing order. No caching: every call re-derives the view so
//! it is fresh with respect to completed mutations.

use crate::domain::model::{VirtualDrive, DEVICE_NOT_AVAILABLE};
use crate::inventory::StorcliClient;
use crate::lifecycle::locks::{array_key, ResourceLocks};
use crate::osinfo::OsInventory;
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Build the unified Array view.
///
/// Arrays with an in-flight mutation (for example a delete that is
/// currently executing) are omitted, so a to-be-deleted array is not
/// reported as still present.
pub async fn unified_arrays(
    client: &StorcliClient,
    os: &OsInventory,
    locks: &ResourceLocks,
    detail_concurrency: usize,
) -> Vec<VirtualDrive> {
    let summaries = client.virtual_drive_summaries().await;
    let mounts = os.mount_table().await;

    let visible: Vec<_> = summaries
        .into_iter()
        .filter(|vd| {
            let busy = locks.is_busy(&array_key(StorcliClient::vd_number(&vd.id)));
            if busy {
                debug!(array = %vd.id, "omitting array with in-flight mutation");
            }
            !busy
        })
        .collect();

    stream::iter(visible.into_iter().map(|vd| {
        let mounts = &mounts;
        async move {
            let device = client.os_device(&vd.id).await;

            let (device, mount_point, filesystem) = match device {
                Some(dev) if !dev.is_empty() => {
                    let mount_point = mounts.get(&dev).cloned();
                    let filesystem = os.probe_filesystem(&dev).await;
                    (dev, mount_point, filesystem)
                }
                // Not yet exposed to the OS: explicit sentinel, no facts
                _ => (DEVICE_NOT_AVAILABLE.to_string(), None, None),
            };

            VirtualDrive {
                id: vd.id,
                raid_type: vd.raid_type,
                state: vd.state,
                access: vd.access,
                size: vd.size,
                mounted: mount_point.is_some(),
                device,
                mount_point,
                filesystem,
                name: vd.name,
            }
        }
    }))
    .buffered(detail_concurrency.max(1))
    .collect()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DriveState;
    use crate::exec::testing::ScriptedRunner;
    use crate::inventory::{StorcliConfig, StorcliGrammar};
    use crate::osinfo::OsConfig;
    use std::sync::Arc;

    const VD_SHOW: &str = "\
---------------------------------------------------------------
DG/VD TYPE  State Access Consist Cache Cac sCC       Size Name
---------------------------------------------------------------
0/239 RAID1 Optl  RW     Yes     RWBD  -   ON    1.818 TB data
1/240 RAID5 Dgrd  RW     No      RWBD  -   ON    3.637 TB
---------------------------------------------------------------
";

    fn fixture() -> (Arc<ScriptedRunner>, StorcliClient, OsInventory) {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("storcli64 /c0/vall show", VD_SHOW)
                .on(
                    "storcli64 /c0/v239 show all",
                    "OS Drive Name = /dev/sdb\n",
                )
                .on("storcli64 /c0/v240 show all", "Strip Size = 64 KB\n")
                .on("mount", "/dev/sdb on /mnt/data type ext4 (rw,relatime)\n")
                .on("blkid /dev/sdb", "/dev/sdb: TYPE=\"ext4\"\n"),
        );
        let client = StorcliClient::new(
            runner.clone(),
            Arc::new(StorcliGrammar::new()),
            StorcliConfig {
                path: "storcli64".into(),
                ..StorcliConfig::default()
            },
        );
        let os = OsInventory::new(runner.clone(), OsConfig::default());
        (runner, client, os)
    }

    #[tokio::test]
    async fn test_unified_view_joins_os_facts() {
        let (_, client, os) = fixture();
        let locks = ResourceLocks::new();

        let arrays = unified_arrays(&client, &os, &locks, 2).await;
        assert_eq!(arrays.len(), 2);

        let resolved = &arrays[0];
        assert_eq!(resolved.id, "0/239");
        assert_eq!(resolved.state, DriveState::Optimal);
        assert_eq!(resolved.device, "/dev/sdb");
        assert_eq!(resolved.mount_point.as_deref(), Some("/mnt/data"));
        assert_eq!(resolved.filesystem.as_deref(), Some("ext4"));
        assert!(resolved.mounted);
        assert_eq!(resolved.name, "data");
    }

    #[tokio::test]
    async fn test_unresolved_device_yields_sentinel() {
        let (_, client, os) = fixture();
        let locks = ResourceLocks::new();

        let arrays = unified_arrays(&client, &os, &locks, 2).await;
        let unresolved = &arrays[1];
        assert_eq!(unresolved.id, "1/240");
        assert_eq!(unresolved.device, DEVICE_NOT_AVAILABLE);
        assert!(!unresolved.mounted);
        assert_eq!(unresolved.filesystem, None);
        assert_eq!(unresolved.mount_point, None);
    }

    #[tokio::test]
    async fn test_detail_query_runs_per_array() {
        let (runner, client, os) = fixture();
        let locks = ResourceLocks::new();

        unified_arrays(&client, &os, &locks, 2).await;
        unified_arrays(&client, &os, &locks, 2).await;

        // No caching between polls: the per-array detail query reruns
        assert_eq!(runner.call_count("storcli64 /c0/v239 show all"), 2);
        assert_eq!(runner.call_count("storcli64 /c0/v240 show all"), 2);
    }

    #[tokio::test]
    async fn test_array_with_inflight_mutation_is_omitted() {
        let (_, client, os) = fixture();
        let locks = ResourceLocks::new();
        let _held = locks.try_acquire(&array_key("240")).unwrap();

        let arrays = unified_arrays(&client, &os, &locks, 2).await;
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].id, "0/239");
    }
}
