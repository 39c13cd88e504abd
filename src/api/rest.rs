//! REST API Handlers
//!
//! Implements the JSON endpoints for inventory queries and lifecycle
//! operations. Every handler converts failures into a typed response;
//! no fault escapes this boundary unconverted.

use crate::domain::model::{raid_type_policies, OperationOutcome};
use crate::error::{Error, ErrorClass};
use crate::lifecycle::LifecycleOrchestrator;
use crate::service::InventoryService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Array creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArrayRequest {
    /// RAID type, e.g. "raid1"; passed to the controller verbatim
    #[serde(default = "default_raid_type")]
    pub raid_type: String,
    /// Physical drives as enclosure:slot ids
    #[serde(default)]
    pub drives: Vec<String>,
}

fn default_raid_type() -> String {
    "raid1".to_string()
}

/// Array deletion request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteArrayRequest {
    /// Array id in disk-group/virtual-drive form, e.g. "0/239"
    #[serde(default)]
    pub array_id: String,
}

/// Mount request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountRequest {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub mount_point: String,
    /// Optional; probed from the device when absent
    #[serde(default)]
    pub filesystem: Option<String>,
}

/// Unmount request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmountRequest {
    #[serde(default)]
    pub device: String,
}

/// Format request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRequest {
    #[serde(default)]
    pub device: String,
    #[serde(default = "default_filesystem")]
    pub filesystem: String,
}

fn default_filesystem() -> String {
    "ext4".to_string()
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    inventory: Arc<InventoryService>,
    lifecycle: Arc<LifecycleOrchestrator>,
}

impl RestRouter {
    pub fn new(inventory: Arc<InventoryService>, lifecycle: Arc<LifecycleOrchestrator>) -> Self {
        Self {
            inventory,
            lifecycle,
        }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            inventory: self.inventory,
            lifecycle: self.lifecycle,
        };

        Router::new()
            // Inventory endpoints
            .route("/v1/controller", get(get_controller))
            .route("/v1/drives", get(list_drives))
            .route("/v1/drives/health", get(list_drive_health))
            .route("/v1/arrays", get(list_arrays))
            .route("/v1/devices", get(list_devices))
            .route("/v1/raid-types", get(list_raid_types))
            // Lifecycle endpoints
            .route("/v1/arrays", post(create_array))
            .route("/v1/arrays/delete", post(delete_array))
            .route("/v1/mount", post(mount_device))
            .route("/v1/unmount", post(unmount_device))
            .route("/v1/format", post(format_device))
            // Liveness
            .route("/health", get(health_check))
            .route("/ready", get(health_check))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    inventory: Arc<InventoryService>,
    lifecycle: Arc<LifecycleOrchestrator>,
}

/// Map a typed error onto an HTTP status and error code
fn error_response(e: &Error) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match e.classify() {
        ErrorClass::InvalidInput => (StatusCode::BAD_REQUEST, "invalid_request"),
        ErrorClass::Busy => (StatusCode::CONFLICT, "operation_in_progress"),
        ErrorClass::Timeout => (StatusCode::GATEWAY_TIMEOUT, "command_timed_out"),
        ErrorClass::Unavailable => (StatusCode::BAD_GATEWAY, "exec_failed"),
        ErrorClass::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ApiErrorResponse {
            error: code.to_string(),
            message: e.to_string(),
        }),
    )
}

/// Render a lifecycle result: typed refusals become error responses, an
/// executed operation reports its own success flag with HTTP 200.
fn outcome_response(
    result: crate::error::Result<OperationOutcome>,
) -> axum::response::Response {
    match result {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!(error = %e, "lifecycle operation failed");
            error_response(&e).into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_controller(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inventory.controller().await)
}

async fn list_drives(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inventory.physical_drives().await)
}

async fn list_drive_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inventory.drive_health().await)
}

async fn list_arrays(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inventory.arrays().await)
}

async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inventory.candidate_devices().await)
}

async fn list_raid_types() -> impl IntoResponse {
    Json(raid_type_policies())
}

async fn create_array(
    State(state): State<AppState>,
    Json(request): Json<CreateArrayRequest>,
) -> impl IntoResponse {
    outcome_response(
        state
            .lifecycle
            .create_array(&request.raid_type, &request.drives)
            .await,
    )
}

async fn delete_array(
    State(state): State<AppState>,
    Json(request): Json<DeleteArrayRequest>,
) -> impl IntoResponse {
    outcome_response(state.lifecycle.delete_array(&request.array_id).await)
}

async fn mount_device(
    State(state): State<AppState>,
    Json(request): Json<MountRequest>,
) -> impl IntoResponse {
    outcome_response(
        state
            .lifecycle
            .mount_device(
                &request.device,
                &request.mount_point,
                request.filesystem.as_deref(),
            )
            .await,
    )
}

async fn unmount_device(
    State(state): State<AppState>,
    Json(request): Json<UnmountRequest>,
) -> impl IntoResponse {
    outcome_response(state.lifecycle.unmount_device(&request.device).await)
}

async fn format_device(
    State(state): State<AppState>,
    Json(request): Json<FormatRequest>,
) -> impl IntoResponse {
    outcome_response(
        state
            .lifecycle
            .format_device(&request.device, &request.filesystem)
            .await,
    )
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
