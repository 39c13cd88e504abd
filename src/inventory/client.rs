//! StorCLI client
//!
//! Builds controller commands, runs them through the injected
//! [`CommandRunner`], and hands raw output to the grammar adapter.
//!
//! Query methods follow the degraded-result policy: a failed or timed-out
//! invocation is logged and yields an empty listing (or an all-Unknown
//! controller record) rather than aborting the caller. Mutating methods
//! propagate execution failures so the raw diagnostic text reaches the
//! caller verbatim.

use crate::domain::model::{Controller, PhysicalDrive, VirtualDriveSummary};
use crate::domain::ports::{
    CommandOutput, CommandRunnerRef, ControllerGrammarRef, DriveDetail,
};
use crate::error::Result;
use std::time::Duration;
use tracing::warn;

/// Configuration for the StorCLI client
#[derive(Debug, Clone)]
pub struct StorcliConfig {
    /// Path to the storcli binary
    pub path: String,
    /// Controller index addressed by every command
    pub controller_index: u32,
    /// Timeout for inventory and detail queries
    pub query_timeout: Duration,
    /// Timeout for create/delete commands
    pub mutate_timeout: Duration,
}

impl Default for StorcliConfig {
    fn default() -> Self {
        Self {
            path: "/opt/MegaRAID/storcli/storcli64".to_string(),
            controller_index: 0,
            query_timeout: Duration::from_secs(30),
            mutate_timeout: Duration::from_secs(60),
        }
    }
}

/// Typed access to one MegaRAID controller via StorCLI
pub struct StorcliClient {
    runner: CommandRunnerRef,
    grammar: ControllerGrammarRef,
    config: StorcliConfig,
}

impl StorcliClient {
    pub fn new(
        runner: CommandRunnerRef,
        grammar: ControllerGrammarRef,
        config: StorcliConfig,
    ) -> Self {
        Self {
            runner,
            grammar,
            config,
        }
    }

    /// The controller-local numeric id of an array: the suffix after the
    /// disk-group separator ("0/239" -> "239").
    pub fn vd_number(array_id: &str) -> &str {
        array_id.rsplit('/').next().unwrap_or(array_id)
    }

    /// Index of the controller this client addresses
    pub fn controller_index(&self) -> u32 {
        self.config.controller_index
    }

    fn target(&self) -> String {
        format!("/c{}", self.config.controller_index)
    }

    async fn query(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner
            .run(&self.config.path, args, self.config.query_timeout)
            .await
    }

    // =========================================================================
    // Queries (degraded-result policy)
    // =========================================================================

    /// Controller summary; labels that cannot be read stay "Unknown"
    pub async fn controller_info(&self) -> Controller {
        let target = self.target();
        match self.query(&[&target, "show"]).await {
            Ok(out) => self.grammar.parse_controller(&out.stdout),
            Err(e) => {
                warn!(error = %e, "controller summary query failed");
                Controller::default()
            }
        }
    }

    /// All physical drives attached to the controller
    pub async fn physical_drives(&self) -> Vec<PhysicalDrive> {
        let path = format!("{}/eall/sall", self.target());
        match self.query(&[&path, "show"]).await {
            Ok(out) => self.grammar.parse_physical_drives(&out.stdout),
            Err(e) => {
                warn!(error = %e, "physical drive listing failed");
                Vec::new()
            }
        }
    }

    /// All virtual drives, before OS correlation
    pub async fn virtual_drive_summaries(&self) -> Vec<VirtualDriveSummary> {
        let path = format!("{}/vall", self.target());
        match self.query(&[&path, "show"]).await {
            Ok(out) => self.grammar.parse_virtual_drives(&out.stdout),
            Err(e) => {
                warn!(error = %e, "virtual drive listing failed");
                Vec::new()
            }
        }
    }

    /// OS device name for one array, from the per-array detail query.
    /// A failed query or an absent label both resolve to `None`.
    pub async fn os_device(&self, array_id: &str) -> Option<String> {
        let path = format!("{}/v{}", self.target(), Self::vd_number(array_id));
        match self.query(&[&path, "show", "all"]).await {
            Ok(out) => self.grammar.parse_os_device(&out.stdout),
            Err(e) => {
                warn!(array = array_id, error = %e, "array detail query failed");
                None
            }
        }
    }

    /// Diagnostic attributes for one drive slot ("eid:slot"). Unlike the
    /// listing queries this propagates failure, so the health assessor can
    /// mark the slot Unknown while continuing with the rest.
    pub async fn drive_detail(&self, slot: &str) -> Result<DriveDetail> {
        let (eid, slt) = slot.split_once(':').unwrap_or((slot, "0"));
        let path = format!("{}/e{}/s{}", self.target(), eid, slt);
        let out = self.query(&[&path, "show", "all"]).await?;
        Ok(self.grammar.parse_drive_detail(&out.stdout))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Build a new virtual drive over the given physical drives
    pub async fn add_virtual_drive(
        &self,
        raid_type: &str,
        drives: &[String],
    ) -> Result<CommandOutput> {
        let target = self.target();
        let type_arg = format!("type={}", raid_type);
        let drives_arg = format!("drives={}", drives.join(","));
        self.runner
            .run(
                &self.config.path,
                &[&target, "add", "vd", &type_arg, &drives_arg],
                self.config.mutate_timeout,
            )
            .await
    }

    /// Forcibly delete a virtual drive by its numeric id
    pub async fn delete_virtual_drive(&self, vd_number: &str) -> Result<CommandOutput> {
        let path = format!("{}/v{}", self.target(), vd_number);
        self.runner
            .run(
                &self.config.path,
                &[&path, "del", "force"],
                self.config.mutate_timeout,
            )
            .await
    }

    /// Whether mutating-command output carries the vendor success marker
    pub fn output_indicates_success(&self, raw: &str) -> bool {
        self.grammar.is_success(raw)
    }
}
