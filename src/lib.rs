//! MegaRAID Operator
//!
//! A host-local management service for a Broadcom/LSI MegaRAID controller.
//! It shells out to the vendor StorCLI tool and standard OS utilities,
//! parses their text output into typed records, and exposes a JSON API
//! for inventory, health, and array lifecycle operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         REST API (axum)                          │
//! ├───────────────────────────────┬─────────────────────────────────┤
//! │        InventoryService       │      LifecycleOrchestrator      │
//! │   (controller, drives,        │   (create/delete array,         │
//! │    arrays, health, devices)   │    mount/unmount/format)        │
//! ├───────────────┬───────────────┴───────────────┬─────────────────┤
//! │  Correlator   │        Health Assessor        │  ResourceLocks  │
//! ├───────────────┴───────────────┬───────────────┴─────────────────┤
//! │         StorcliClient         │          OsInventory            │
//! │   (grammar adapter + exec)    │   (mount, blkid, lsblk, mkfs)   │
//! ├───────────────────────────────┴─────────────────────────────────┤
//! │                    CommandRunner (sudo + timeout)                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: REST server and handlers
//! - [`correlate`]: joins controller arrays with OS mount/filesystem facts
//! - [`domain`]: core types and the ports the rest of the crate plugs into
//! - [`error`]: error types and classification
//! - [`exec`]: subprocess execution with sudo wrapping and timeouts
//! - [`health`]: per-drive health assessment
//! - [`inventory`]: StorCLI command building and output parsing
//! - [`lifecycle`]: mutating operations and per-resource locking
//! - [`osinfo`]: OS-side device facts and filesystem operations
//! - [`service`]: read-side facade consumed by the API

pub mod api;
pub mod correlate;
pub mod domain;
pub mod error;
pub mod exec;
pub mod health;
pub mod inventory;
pub mod lifecycle;
pub mod osinfo;
pub mod service;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig};
pub use domain::model::{
    Controller, DriveHealth, DriveState, HealthVerdict, OperationOutcome, PhysicalDrive,
    RaidTypePolicy, VirtualDrive, VirtualDriveSummary,
};
pub use domain::ports::{CommandOutput, CommandRunner, ControllerGrammar};
pub use error::{Error, ErrorClass, Result};
pub use exec::SudoCommandRunner;
pub use inventory::{StorcliClient, StorcliConfig, StorcliGrammar};
pub use lifecycle::{LifecycleOrchestrator, ResourceLocks};
pub use osinfo::{OsConfig, OsInventory};
pub use service::{InventoryService, DEFAULT_DETAIL_CONCURRENCY};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
