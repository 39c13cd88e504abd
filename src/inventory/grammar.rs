//! StorCLI output grammar
//!
//! One implementation of the [`ControllerGrammar`] port, covering the
//! MegaRAID StorCLI text format. All parsing is best-effort: absent labels
//! resolve to sentinel defaults and unrecognized state codes are passed
//! through verbatim.

use crate::domain::model::{
    Controller, DriveState, PhysicalDrive, VirtualDriveSummary, UNKNOWN,
};
use crate::domain::ports::{ControllerGrammar, DriveDetail};
use crate::inventory::table::table_rows;

/// Minimum split-field counts a row must meet to be accepted
const PD_MIN_FIELDS: usize = 8;
const VD_MIN_FIELDS: usize = 9;

/// Scan for `label = value` lines and return the trimmed value. Labels
/// duplicated per span in detail output resolve to the last occurrence.
/// Returns `None` when the label is absent or carries no `=` delimiter.
fn label_value(raw: &str, label: &str) -> Option<String> {
    let mut found = None;
    for line in raw.lines() {
        if line.contains(label) {
            if let Some((_, value)) = line.split_once('=') {
                let value = value.trim();
                if !value.is_empty() {
                    found = Some(value.to_string());
                }
            }
        }
    }
    found
}

/// Grammar for StorCLI's column-aligned output
#[derive(Debug, Default)]
pub struct StorcliGrammar;

impl StorcliGrammar {
    pub fn new() -> Self {
        Self
    }
}

impl ControllerGrammar for StorcliGrammar {
    fn parse_controller(&self, raw: &str) -> Controller {
        let mut info = Controller::default();

        if let Some(model) = label_value(raw, "Product Name") {
            info.model = model;
        }
        if let Some(serial) = label_value(raw, "Serial Number") {
            info.serial = serial;
        }
        if let Some(firmware) = label_value(raw, "FW Version") {
            info.firmware = firmware;
        }
        // The summary echoes the addressed controller when it responds
        if raw.lines().any(|l| l.trim().starts_with("Controller = ")) {
            info.status = "Online".to_string();
        }

        info
    }

    fn parse_physical_drives(&self, raw: &str) -> Vec<PhysicalDrive> {
        let rows = table_rows(
            raw,
            |l| l.contains("EID:Slt") && l.contains("DID"),
            PD_MIN_FIELDS,
        );

        rows.into_iter()
            .map(|f| {
                // Model strings can span two columns; shorter rows fall
                // back to whatever is present.
                let model = if f.len() > 12 {
                    f[11..13].join(" ")
                } else if f.len() > 11 {
                    f[11..].join(" ")
                } else {
                    UNKNOWN.to_string()
                };

                PhysicalDrive {
                    slot: f[0].to_string(),
                    device_id: f[1].to_string(),
                    state: DriveState::from_code(f[2]),
                    disk_group: match f[3] {
                        "-" => None,
                        dg => Some(dg.to_string()),
                    },
                    size: format!("{} {}", f[4], f[5]),
                    interface: f[6].to_string(),
                    media: f[7].to_string(),
                    model,
                }
            })
            .collect()
    }

    fn parse_virtual_drives(&self, raw: &str) -> Vec<VirtualDriveSummary> {
        let rows = table_rows(
            raw,
            |l| l.contains("DG/VD") && l.contains("TYPE"),
            VD_MIN_FIELDS,
        );

        rows.into_iter()
            .map(|f| VirtualDriveSummary {
                id: f[0].to_string(),
                raid_type: f[1].to_string(),
                state: DriveState::from_code(f[2]),
                access: f[3].to_string(),
                size: if f.len() > 9 {
                    format!("{} {}", f[8], f[9])
                } else {
                    f[8].to_string()
                },
                name: if f.len() > 10 {
                    f[10..].join(" ")
                } else {
                    String::new()
                },
            })
            .collect()
    }

    fn parse_os_device(&self, raw: &str) -> Option<String> {
        label_value(raw, "OS Drive Name")
    }

    fn parse_drive_detail(&self, raw: &str) -> DriveDetail {
        let power_on_hours =
            label_value(raw, "Power On Hours").or_else(|| label_value(raw, "Power_On_Hours"));

        DriveDetail {
            temperature: label_value(raw, "Drive Temperature"),
            power_on_hours,
            media_errors: label_value(raw, "Media Error Count").and_then(|v| v.parse().ok()),
            predictive_failures: label_value(raw, "Predictive Failure Count")
                .and_then(|v| v.parse().ok()),
        }
    }

    fn is_success(&self, raw: &str) -> bool {
        raw.contains("Success") || raw.contains("Succeeded")
    }
}
