// src/logs.rs
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::FraudClient;
use crate::error::Result;
use crate::models::{LogEntry, LogStatus};

/// The `limit` most recent entries, in the order the backend sent them.
/// No caching: every call is a fresh fetch.
pub async fn fetch_recent(client: &FraudClient, limit: usize) -> Result<Vec<LogEntry>> {
    let entries = client.logs().await?;
    Ok(project(entries, limit))
}

/// Truncate without reordering. The source is already newest-first.
pub fn project(mut entries: Vec<LogEntry>, limit: usize) -> Vec<LogEntry> {
    entries.truncate(limit);
    entries
}

/// History-page filters, usable straight from a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
    /// Case-insensitive match on id, merchant label or amount
    pub q: Option<String>,
    pub status: Option<LogStatus>,
}

impl LogQuery {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }

        match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                entry.id.to_lowercase().contains(&needle)
                    || entry.merchant.to_lowercase().contains(&needle)
                    || entry.amount.to_string().contains(&needle)
            }
        }
    }

    /// Filter first, then cut to `limit`, so the limit counts matches
    pub fn apply(&self, entries: Vec<LogEntry>) -> Vec<LogEntry> {
        let filtered: Vec<LogEntry> = entries.into_iter().filter(|e| self.matches(e)).collect();
        match self.limit {
            Some(limit) => project(filtered, limit),
            None => filtered,
        }
    }
}

/// Logs response for the view layer; `unavailable` drives the empty state
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogsView {
    pub entries: Vec<LogEntry>,
    pub total: usize,
    pub unavailable: bool,
}

pub async fn search(client: &FraudClient, query: &LogQuery) -> LogsView {
    match client.logs().await {
        Ok(entries) => {
            let total = entries.len();
            let entries = query.apply(entries);
            info!("Showing {} of {} log entries", entries.len(), total);
            LogsView {
                entries,
                total,
                unavailable: false,
            }
        }
        Err(e) => {
            warn!("Logs unavailable: {}", e);
            LogsView {
                unavailable: true,
                ..LogsView::default()
            }
        }
    }
}
