// src/aggregator.rs
use serde::Serialize;
use tracing::{info, warn};

use crate::client::FraudClient;
use crate::error::DataIntegrityWarning;
use crate::models::{DashboardStats, LogEntry, StatsCounts};

/// List every way `counts` breaks `0 <= fraud <= total`
pub fn check_integrity(counts: &StatsCounts) -> Vec<DataIntegrityWarning> {
    let mut warnings = Vec::new();

    if counts.total_rows_processed < 0 {
        warnings.push(DataIntegrityWarning::NegativeTotal(counts.total_rows_processed));
    }
    if counts.fraud_count < 0 {
        warnings.push(DataIntegrityWarning::NegativeFraudCount(counts.fraud_count));
    } else if counts.fraud_count > counts.total_rows_processed.max(0) {
        warnings.push(DataIntegrityWarning::FraudExceedsTotal {
            fraud: counts.fraud_count,
            total: counts.total_rows_processed,
        });
    }

    warnings
}

/// Derive the headline numbers from freshly fetched counts.
/// Out-of-range inputs are clamped and logged, never rejected.
pub fn compute_stats(counts: &StatsCounts) -> DashboardStats {
    for warning in check_integrity(counts) {
        warn!("Stats data-integrity warning: {}", warning);
    }

    let total = counts.total_rows_processed.max(0) as u64;
    let fraud = (counts.fraud_count.max(0) as u64).min(total);

    DashboardStats {
        total_transactions: total,
        fraud_detected: fraud,
        detection_accuracy: rounded_percent(fraud, total),
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0
fn rounded_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (part as u128, whole as u128);
    ((200 * part + whole) / (2 * whole)) as u8
}

/// Everything the home page shows
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent: Vec<LogEntry>,
    pub last_upload: Option<String>,
    /// Set when either fetch failed and an empty state is shown instead
    pub degraded: bool,
}

/// Fetch stats and recent logs. Each source degrades to its empty state on
/// its own, so one outage never blanks the whole page.
pub async fn load_dashboard(client: &FraudClient, recent_limit: usize) -> Dashboard {
    let mut dashboard = Dashboard::default();

    match client.stats().await {
        Ok(counts) => {
            dashboard.stats = compute_stats(&counts);
            dashboard.last_upload = counts.last_upload;
        }
        Err(e) => {
            warn!("Stats unavailable, showing empty state: {}", e);
            dashboard.degraded = true;
        }
    }

    match crate::logs::fetch_recent(client, recent_limit).await {
        Ok(entries) => dashboard.recent = entries,
        Err(e) => {
            warn!("Logs unavailable, showing empty state: {}", e);
            dashboard.degraded = true;
        }
    }

    info!(
        "Dashboard: {} transactions, {} fraud, {}% (degraded={})",
        dashboard.stats.total_transactions,
        dashboard.stats.fraud_detected,
        dashboard.stats.detection_accuracy,
        dashboard.degraded
    );
    dashboard
}
