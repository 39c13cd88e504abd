//! Read-side inventory facade
//!
//! The query surface consumed by the API layer. Every method re-derives
//! its view by polling the controller and the OS; nothing is cached
//! across calls.

use crate::correlate;
use crate::domain::model::{Controller, DriveHealth, PhysicalDrive, VirtualDrive};
use crate::health;
use crate::inventory::StorcliClient;
use crate::lifecycle::ResourceLocks;
use crate::osinfo::OsInventory;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default fan-out for per-array and per-slot detail queries
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 4;

/// Read models over one controller and its host OS
pub struct InventoryService {
    client: Arc<StorcliClient>,
    os: Arc<OsInventory>,
    locks: Arc<ResourceLocks>,
    detail_concurrency: usize,
}

impl InventoryService {
    pub fn new(
        client: Arc<StorcliClient>,
        os: Arc<OsInventory>,
        locks: Arc<ResourceLocks>,
        detail_concurrency: usize,
    ) -> Self {
        Self {
            client,
            os,
            locks,
            detail_concurrency,
        }
    }

    /// Controller identity and status
    pub async fn controller(&self) -> Controller {
        self.client.controller_info().await
    }

    /// Physical drives attached to the controller
    pub async fn physical_drives(&self) -> Vec<PhysicalDrive> {
        self.client.physical_drives().await
    }

    /// The unified Array view: controller arrays joined with OS facts
    pub async fn arrays(&self) -> Vec<VirtualDrive> {
        correlate::unified_arrays(&self.client, &self.os, &self.locks, self.detail_concurrency)
            .await
    }

    /// Per-drive health assessment
    pub async fn drive_health(&self) -> Vec<DriveHealth> {
        health::assess_drives(&self.client, self.detail_concurrency).await
    }

    /// Sorted, duplicate-free union of array OS devices and OS-enumerated
    /// disks; the candidate set for format and diagnostic operations.
    pub async fn candidate_devices(&self) -> Vec<String> {
        let mut devices = BTreeSet::new();

        for array in self.arrays().await {
            if array.has_device() {
                devices.insert(array.device);
            }
        }
        for disk in self.os.list_disks().await {
            devices.insert(disk);
        }

        devices.into_iter().collect()
    }
}
