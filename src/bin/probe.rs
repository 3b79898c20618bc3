//! Smoke probe against a live scoring backend.
//!
//! `probe` prints health, stats and recent logs. `probe <file.csv>` also
//! pre-flights and uploads a batch file.

use fraud_dashboard::{aggregator, config, logs, upload, FraudClient};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().map_err(|e| anyhow::anyhow!("{}", e))?;
    let client = FraudClient::new(cfg.backend_url.clone(), cfg.request_timeout)?;
    println!("Probing {}", client.base_url());

    let healthy = client.health().await;
    println!("Health: {}", if healthy { "OK" } else { "DOWN" });

    match client.stats().await {
        Ok(counts) => {
            let stats = aggregator::compute_stats(&counts);
            for warning in aggregator::check_integrity(&counts) {
                println!("  warning: {}", warning);
            }
            println!(
                "Stats: {} transactions | {} fraud | {} legitimate | {}% | last upload {}",
                stats.total_transactions,
                stats.fraud_detected,
                stats.legitimate(),
                stats.detection_accuracy,
                counts.last_upload.as_deref().unwrap_or("never")
            );
        }
        Err(e) => eprintln!("Stats unavailable: {}", e),
    }

    match logs::fetch_recent(&client, cfg.recent_logs_limit).await {
        Ok(entries) => {
            println!("Recent logs ({}):", entries.len());
            for entry in &entries {
                println!(
                    "  {} | {} | {} | {} | {:?} | {}",
                    entry.id,
                    entry.date,
                    entry.merchant,
                    entry.amount,
                    entry.status,
                    entry.reason.as_deref().unwrap_or("-")
                );
            }
        }
        Err(e) => eprintln!("Logs unavailable: {}", e),
    }

    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        let result = upload::upload_file(&client, &path).await?;
        println!("Upload result = {:#}", result);
    }

    Ok(())
}
