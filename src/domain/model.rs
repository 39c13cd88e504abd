//! Read models for controller and OS inventory
//!
//! All types here are produced fresh on each query by polling the
//! controller and the OS; nothing is persisted across calls. Composite keys
//! (enclosure:slot for physical drives, disk-group/virtual-drive for
//! arrays) are unique within one poll.

use serde::{Deserialize, Serialize, Serializer};

/// Sentinel reported when an array has no resolvable OS device name,
/// distinct from an empty string.
pub const DEVICE_NOT_AVAILABLE: &str = "N/A";

/// Sentinel reported when a controller summary label is absent.
pub const UNKNOWN: &str = "Unknown";

// =============================================================================
// Drive / Array State
// =============================================================================

/// Normalized controller state codes.
///
/// This is an open enumeration: new firmware may emit codes this crate has
/// never seen, and those pass through verbatim as [`DriveState::Other`]
/// rather than failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveState {
    Online,
    Optimal,
    UnconfiguredGood,
    UnconfiguredBad,
    Offline,
    Degraded,
    PartiallyDegraded,
    Failed,
    Rebuilding,
    GlobalHotSpare,
    DedicatedHotSpare,
    /// Unrecognized raw code, passed through unchanged
    Other(String),
}

impl DriveState {
    /// Map a raw StorCLI state abbreviation to its normalized form.
    /// Unmatched input is carried verbatim (identity fallback).
    pub fn from_code(code: &str) -> Self {
        match code {
            "Onln" => DriveState::Online,
            "Optl" => DriveState::Optimal,
            "UGood" => DriveState::UnconfiguredGood,
            "UBad" => DriveState::UnconfiguredBad,
            "Offln" => DriveState::Offline,
            "Dgrd" => DriveState::Degraded,
            "Pdgd" => DriveState::PartiallyDegraded,
            "Failed" => DriveState::Failed,
            "Rbld" => DriveState::Rebuilding,
            "GHS" => DriveState::GlobalHotSpare,
            "DHS" => DriveState::DedicatedHotSpare,
            other => DriveState::Other(other.to_string()),
        }
    }

    /// User-friendly name for this state
    pub fn as_str(&self) -> &str {
        match self {
            DriveState::Online => "Online",
            DriveState::Optimal => "Optimal",
            DriveState::UnconfiguredGood => "Unconfigured Good",
            DriveState::UnconfiguredBad => "Unconfigured Bad",
            DriveState::Offline => "Offline",
            DriveState::Degraded => "Degraded",
            DriveState::PartiallyDegraded => "Partially Degraded",
            DriveState::Failed => "Failed",
            DriveState::Rebuilding => "Rebuilding",
            DriveState::GlobalHotSpare => "Global Hot Spare",
            DriveState::DedicatedHotSpare => "Dedicated Hot Spare",
            DriveState::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for DriveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DriveState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Identity of the management target, re-derived on every query.
#[derive(Debug, Clone, Serialize)]
pub struct Controller {
    pub model: String,
    pub serial: String,
    pub firmware: String,
    pub status: String,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            model: UNKNOWN.to_string(),
            serial: UNKNOWN.to_string(),
            firmware: UNKNOWN.to_string(),
            status: UNKNOWN.to_string(),
        }
    }
}

// =============================================================================
// Physical Drive
// =============================================================================

/// A single storage device attached to the controller,
/// identified by enclosure:slot.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalDrive {
    /// Enclosure:slot composite key, e.g. "252:0"
    pub slot: String,
    /// Controller-local device id
    pub device_id: String,
    pub state: DriveState,
    /// Disk-group membership; unconfigured drives have none
    pub disk_group: Option<String>,
    /// Capacity as reported, e.g. "1.818 TB"
    pub size: String,
    /// Interface type, e.g. "SATA"
    pub interface: String,
    /// Media type, e.g. "HDD"
    pub media: String,
    pub model: String,
}

// =============================================================================
// Virtual Drive (Array)
// =============================================================================

/// A virtual drive as listed by the controller, before correlation with
/// OS facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDriveSummary {
    /// Disk-group/virtual-drive composite key, e.g. "0/239"
    pub id: String,
    pub raid_type: String,
    pub state: DriveState,
    pub access: String,
    pub size: String,
    /// Human-assigned name, possibly empty
    pub name: String,
}

/// The unified Array view: controller identity joined with OS device,
/// mount, and filesystem facts.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualDrive {
    /// Disk-group/virtual-drive composite key, e.g. "0/239"
    pub id: String,
    pub raid_type: String,
    pub state: DriveState,
    pub access: String,
    pub size: String,
    /// OS device path, or [`DEVICE_NOT_AVAILABLE`] when unresolved
    pub device: String,
    pub mount_point: Option<String>,
    pub filesystem: Option<String>,
    /// True iff a mount point resolved for the device
    pub mounted: bool,
    pub name: String,
}

impl VirtualDrive {
    /// Whether the controller exposed this array to the OS
    pub fn has_device(&self) -> bool {
        self.device != DEVICE_NOT_AVAILABLE && !self.device.is_empty()
    }
}

// =============================================================================
// Drive Health
// =============================================================================

/// Health verdict derived from per-drive diagnostic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    NeedsAttention,
    /// The drive's detail query failed; no verdict possible
    Unknown,
}

/// Per-drive diagnostic attributes.
///
/// Counters are `None` when the drive does not report the attribute.
/// Absence is not the same as zero: only an explicitly reported `0` means
/// zero errors.
#[derive(Debug, Clone, Serialize)]
pub struct DriveHealth {
    /// Enclosure:slot composite key
    pub slot: String,
    /// Raw temperature text as reported, e.g. "30C (86.00 F)"
    pub temperature: Option<String>,
    pub power_on_hours: Option<String>,
    pub media_errors: Option<u64>,
    pub predictive_failures: Option<u64>,
    pub verdict: HealthVerdict,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl DriveHealth {
    /// Compute the verdict: a drive needs attention iff it reports a
    /// positive media-error or predictive-failure count.
    pub fn derive_verdict(
        media_errors: Option<u64>,
        predictive_failures: Option<u64>,
    ) -> HealthVerdict {
        if media_errors.unwrap_or(0) > 0 || predictive_failures.unwrap_or(0) > 0 {
            HealthVerdict::NeedsAttention
        } else {
            HealthVerdict::Healthy
        }
    }
}

// =============================================================================
// RAID Type Policy
// =============================================================================

/// Static caller-facing policy entry for one RAID level. The lifecycle
/// layer itself does not enforce minimum drive counts; the controller is
/// trusted to reject invalid combinations.
#[derive(Debug, Clone, Serialize)]
pub struct RaidTypePolicy {
    /// Value accepted by create-array, e.g. "raid5"
    pub value: &'static str,
    pub name: &'static str,
    pub min_drives: u32,
}

/// The supported RAID levels and their minimum drive counts
pub fn raid_type_policies() -> &'static [RaidTypePolicy] {
    const POLICIES: &[RaidTypePolicy] = &[
        RaidTypePolicy {
            value: "raid0",
            name: "RAID 0 (Stripe - No Redundancy)",
            min_drives: 2,
        },
        RaidTypePolicy {
            value: "raid1",
            name: "RAID 1 (Mirror - 50% Capacity)",
            min_drives: 2,
        },
        RaidTypePolicy {
            value: "raid5",
            name: "RAID 5 (Stripe + Parity)",
            min_drives: 3,
        },
        RaidTypePolicy {
            value: "raid6",
            name: "RAID 6 (Double Parity)",
            min_drives: 4,
        },
        RaidTypePolicy {
            value: "raid10",
            name: "RAID 10 (Stripe + Mirror)",
            min_drives: 4,
        },
    ];
    POLICIES
}

// =============================================================================
// Operation Outcome
// =============================================================================

/// Result of a mutating lifecycle operation. `success` reflects the
/// controller's or OS tool's own verdict; `output` carries the raw
/// diagnostic text verbatim for create/delete, `message` a short human
/// summary for mount/unmount/format.
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl OperationOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            output: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            output: None,
        }
    }

    /// Outcome judged by scanning raw controller output
    pub fn from_raw(success: bool, raw: impl Into<String>) -> Self {
        Self {
            success,
            message: None,
            output: Some(raw.into()),
        }
    }
}
