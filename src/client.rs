// src/client.rs
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::models::{
    parse_timestamp, FeatureRecord, LogEntry, RiskLevel, StatsCounts, Verdict, VerdictSource,
};

/// HTTP client for the fraud scoring backend.
///
/// Built once at startup and shared by reference. Every call is a single
/// round-trip bounded by the configured timeout; nothing is retried here.
#[derive(Debug, Clone)]
pub struct FraudClient {
    base_url: Url,
    http: Client,
}

/// `POST /predict` response body as sent by the backend
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    is_fraud: bool,
    probability: f64,
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl PredictResponse {
    /// Structural checks only; the backend owns the meaning of the fields.
    fn into_verdict(self) -> Result<Verdict> {
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(ClientError::MalformedResponse(format!(
                "probability {} outside [0, 1]",
                self.probability
            )));
        }

        let risk_level = match self.risk_level.as_deref() {
            Some(raw) => raw.parse::<RiskLevel>().map_err(ClientError::MalformedResponse)?,
            None if self.is_fraud => RiskLevel::High,
            None => RiskLevel::Low,
        };

        let raw_ts = self
            .timestamp
            .ok_or_else(|| ClientError::MalformedResponse("missing timestamp".into()))?;
        let produced_at = parse_timestamp(&raw_ts).ok_or_else(|| {
            ClientError::MalformedResponse(format!("unparseable timestamp `{}`", raw_ts))
        })?;

        Ok(Verdict {
            is_fraud: self.is_fraud,
            probability: self.probability,
            risk_level,
            produced_at,
            source: VerdictSource::Remote,
        })
    }
}

impl FraudClient {
    pub fn new(mut base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::RemoteUnavailable(format!("bad endpoint `{}`: {}", path, e)))
    }

    /// Score one transaction remotely
    pub async fn predict(&self, record: &FeatureRecord) -> Result<Verdict> {
        let url = self.endpoint("predict")?;
        info!("Sending prediction request → {}", url);
        debug!("Prediction payload: {:?}", record);

        let resp = self.http.post(url).json(record).send().await?;
        let body: PredictResponse = read_json(resp).await?;
        let verdict = body.into_verdict()?;

        info!(
            "Remote verdict: fraud={} probability={} risk={:?}",
            verdict.is_fraud, verdict.probability, verdict.risk_level
        );
        Ok(verdict)
    }

    /// Full audit history, most recent first
    pub async fn logs(&self) -> Result<Vec<LogEntry>> {
        let url = self.endpoint("logs")?;
        info!("Fetching logs → {}", url);

        let resp = self.http.get(url).send().await?;
        let entries: Vec<LogEntry> = read_json(resp).await?;
        info!("Received {} log entries", entries.len());
        Ok(entries)
    }

    pub async fn stats(&self) -> Result<StatsCounts> {
        let url = self.endpoint("stats")?;
        info!("Fetching stats → {}", url);

        let resp = self.http.get(url).send().await?;
        read_json(resp).await
    }

    /// Submit a batch file. The response shape belongs to the backend and is
    /// passed through untouched; non-JSON bodies come back as a JSON string.
    pub async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<serde_json::Value> {
        let url = self.endpoint("upload-csv")?;
        info!("Uploading {} ({} bytes) → {}", file_name, contents.len(), url);

        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);

        let resp = self.http.post(url).multipart(form).send().await?;
        let text = read_body(resp).await?;
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    /// Liveness probe. Any failure reads as "down".
    pub async fn health(&self) -> bool {
        let url = match self.endpoint("health") {
            Ok(url) => url,
            Err(e) => {
                warn!("Health check skipped: {}", e);
                return false;
            }
        };

        match self.http.get(url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                info!("Backend health OK");
                true
            }
            Ok(resp) => {
                warn!("Backend health FAILED: HTTP {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Backend health FAILED: {}", e);
                false
            }
        }
    }
}

/// Success-status body as text, or `RemoteRejected` carrying whatever the backend said.
async fn read_body(resp: Response) -> Result<String> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!("Backend returned HTTP {}: {}", status, body);
        return Err(ClientError::RemoteRejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.text().await?)
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let text = read_body(resp).await?;
    debug!("Raw response: {}", text);
    serde_json::from_str(&text).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> PredictResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn remote_verdict_passes_through() {
        let v = response(serde_json::json!({
            "isFraud": false,
            "probability": 0.31,
            "riskLevel": "Medium",
            "timestamp": "2024-05-01T12:00:00Z"
        }))
        .into_verdict()
        .unwrap();

        assert!(!v.is_fraud);
        assert_eq!(v.risk_level, RiskLevel::Medium);
        assert_eq!(v.source, VerdictSource::Remote);
    }

    #[test]
    fn missing_risk_level_follows_fraud_flag() {
        let v = response(serde_json::json!({
            "isFraud": true,
            "probability": 0.8,
            "timestamp": "2024-05-01 12:00:00"
        }))
        .into_verdict()
        .unwrap();
        assert_eq!(v.risk_level, RiskLevel::High);
    }

    #[test]
    fn out_of_range_probability_is_malformed() {
        let err = response(serde_json::json!({
            "isFraud": true,
            "probability": 1.7,
            "riskLevel": "High",
            "timestamp": "2024-05-01T12:00:00Z"
        }))
        .into_verdict()
        .unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn unknown_risk_level_is_malformed() {
        let err = response(serde_json::json!({
            "isFraud": true,
            "probability": 0.7,
            "riskLevel": "Severe",
            "timestamp": "2024-05-01T12:00:00Z"
        }))
        .into_verdict()
        .unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn base_path_is_kept_when_joining() {
        let client = FraudClient::new(
            Url::parse("http://scoring.local:5000/api").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("predict").unwrap().as_str(),
            "http://scoring.local:5000/api/predict"
        );
    }
}
