#![allow(dead_code)]

use axum::Router;
use fraud_dashboard::config::Config;
use fraud_dashboard::{FeatureForm, FeatureRecord, FraudClient};
use reqwest::Url;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_backend(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// A local address with nothing listening on it
pub async fn dead_backend() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

pub fn client_for(url: Url) -> FraudClient {
    FraudClient::new(url, Duration::from_secs(2)).unwrap()
}

pub fn config_for(url: Url, fallback_enabled: bool) -> Config {
    Config {
        backend_url: url,
        request_timeout: Duration::from_secs(2),
        fallback_enabled,
        recent_logs_limit: 3,
        port: 0,
    }
}

/// A form whose sender balance drops by exactly `amount`
pub fn form(amount: f64) -> FeatureForm {
    FeatureForm {
        step: Some(1.0),
        kind: Some("TRANSFER".into()),
        amount: Some(amount),
        origin_id: Some("C1305486145".into()),
        origin_balance_before: Some(amount),
        origin_balance_after: Some(0.0),
        dest_id: Some("C553264065".into()),
        dest_balance_before: Some(0.0),
        dest_balance_after: Some(0.0),
    }
}

pub fn record(amount: f64) -> FeatureRecord {
    FeatureRecord::try_from(form(amount)).unwrap()
}

pub fn form_json(amount: f64) -> Value {
    json!({
        "step": 1,
        "type": "TRANSFER",
        "amount": amount,
        "nameOrig": "C1305486145",
        "oldbalanceOrg": amount,
        "newbalanceOrig": 0,
        "nameDest": "C553264065",
        "oldbalanceDest": 0,
        "newbalanceDest": 0
    })
}

/// `n` log entries, newest first, every fourth one fraudulent
pub fn log_json(n: usize) -> Value {
    let entries: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("TX-{}", n - i),
                "date": format!("2024-02-{:02}", 28 - i),
                "amount": 100.0 + i as f64,
                "merchant": if i % 2 == 0 { "PAYMENT" } else { "CASH_OUT" },
                "status": if i % 4 == 0 { "Fraud" } else { "Legitimate" },
                "reason": if i % 4 == 0 { Value::from("amount spike") } else { Value::Null }
            })
        })
        .collect();
    Value::Array(entries)
}

pub fn remote_verdict_json() -> Value {
    json!({
        "isFraud": true,
        "probability": 0.87,
        "riskLevel": "Critical",
        "timestamp": "2024-06-01T08:30:00Z"
    })
}
