//! Drive health assessment
//!
//! Issues one detail query per physical-drive slot, extracts the
//! diagnostic attributes, and derives a verdict. A failed slot never
//! aborts the rest of the assessment: it reports an Unknown verdict with
//! absent metrics and stays in the result sequence.

use crate::domain::model::{DriveHealth, HealthVerdict};
use crate::inventory::StorcliClient;
use futures::stream::{self, StreamExt};
use tracing::warn;

/// Assess every drive attached to the controller. Detail queries run
/// through a bounded concurrent stream that preserves slot order.
pub async fn assess_drives(client: &StorcliClient, detail_concurrency: usize) -> Vec<DriveHealth> {
    let slots: Vec<String> = client
        .physical_drives()
        .await
        .into_iter()
        .map(|pd| pd.slot)
        .collect();

    stream::iter(slots.into_iter().map(|slot| async move {
        match client.drive_detail(&slot).await {
            Ok(detail) => DriveHealth {
                verdict: DriveHealth::derive_verdict(
                    detail.media_errors,
                    detail.predictive_failures,
                ),
                slot,
                temperature: detail.temperature,
                power_on_hours: detail.power_on_hours,
                media_errors: detail.media_errors,
                predictive_failures: detail.predictive_failures,
                checked_at: chrono::Utc::now(),
            },
            Err(e) => {
                warn!(slot = %slot, error = %e, "drive detail query failed");
                DriveHealth {
                    slot,
                    temperature: None,
                    power_on_hours: None,
                    media_errors: None,
                    predictive_failures: None,
                    verdict: HealthVerdict::Unknown,
                    checked_at: chrono::Utc::now(),
                }
            }
        }
    }))
    .buffered(detail_concurrency.max(1))
    .collect()
    .await
}
