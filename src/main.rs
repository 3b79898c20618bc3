use fraud_dashboard::{api, config, FraudClient};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // RUST_LOG overrides; default is INFO to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Fraud dashboard starting...");

    let cfg = config::load()?;
    info!("  Backend URL: {}", cfg.backend_url);
    info!("  Request timeout: {:?}", cfg.request_timeout);
    info!("  Fallback enabled: {}", cfg.fallback_enabled);
    info!("  Port: {}", cfg.port);

    // One client for the whole process, shared by reference
    let client = Arc::new(FraudClient::new(
        cfg.backend_url.clone(),
        cfg.request_timeout,
    )?);

    if !client.health().await {
        warn!("Backend at {} is not reachable yet", cfg.backend_url);
    }

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        let client = Arc::clone(&client);
        async move { api::serve(cfg, client).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Fraud dashboard stopped.");
    Ok(())
}
