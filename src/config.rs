use dotenvy::dotenv;
use eyre::{eyre, Result};
use reqwest::Url;
use std::{env, time::Duration};
use tracing::info;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_RECENT_LOGS: usize = 3;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: Url,
    /// Applies to every remote call; expiry counts as the backend being unavailable
    pub request_timeout: Duration,
    pub fallback_enabled: bool,
    pub recent_logs_limit: usize,
    pub port: u16,
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // Load from .env file
    let cfg = from_lookup(|key| env::var(key).ok())?;

    info!("Loaded config: {:?}", cfg);
    Ok(cfg)
}

/// Build a config from any key lookup. Unparseable numbers fall back to defaults;
/// an unparseable backend URL is an error.
pub fn from_lookup<F>(get: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // Backend URL (alias kept for the old frontend env name)
    let backend_url = match get("FRAUD_API_URL").or_else(|| get("VITE_BACKEND_URL")) {
        Some(raw) => {
            let url = Url::parse(raw.trim())
                .map_err(|e| eyre!("invalid backend URL `{}`: {}", raw, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(eyre!("backend URL must be http(s), got `{}`", raw));
            }
            url
        }
        None => Url::parse(DEFAULT_BACKEND_URL)?,
    };

    let request_timeout = get("REQUEST_TIMEOUT_SECS")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    let fallback_enabled = get("FALLBACK_ENABLED")
        .and_then(|s| parse_flag(&s))
        .unwrap_or(true);

    let recent_logs_limit = get("RECENT_LOGS_LIMIT")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RECENT_LOGS);

    let port = get("PORT")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT);

    Ok(Config {
        backend_url,
        request_timeout,
        fallback_enabled,
        recent_logs_limit,
        port,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
