//! Client-side core of the fraud scoring dashboard.
//!
//! Collects transaction features, asks the remote classifier for a verdict
//! (falling back to a local heuristic when allowed), and derives the
//! dashboard numbers from the backend's audit log and counters.

pub mod aggregator;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod logs;
pub mod models;
pub mod orchestrator;
pub mod upload;

pub use client::FraudClient;
pub use error::{ClientError, DataIntegrityWarning, UploadError, ValidationError};
pub use models::{FeatureForm, FeatureRecord, LogEntry, Verdict};
pub use orchestrator::{Prediction, PredictionState, Scorer};
