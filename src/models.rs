// src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Transaction kinds the scoring model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Payment,
    Transfer,
    CashOut,
    Debit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Payment,
        TransactionType::Transfer,
        TransactionType::CashOut,
        TransactionType::Debit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::CashOut => "CASH_OUT",
            TransactionType::Debit => "DEBIT",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownType(s.to_string()))
    }
}

/// Raw transaction input as it arrives from a form or a batch row.
/// Every field is optional so that missing input is reported, not defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureForm {
    pub step: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "nameOrig")]
    pub origin_id: Option<String>,
    #[serde(rename = "oldbalanceOrg")]
    pub origin_balance_before: Option<f64>,
    #[serde(rename = "newbalanceOrig")]
    pub origin_balance_after: Option<f64>,
    #[serde(rename = "nameDest")]
    pub dest_id: Option<String>,
    #[serde(rename = "oldbalanceDest")]
    pub dest_balance_before: Option<f64>,
    #[serde(rename = "newbalanceDest")]
    pub dest_balance_after: Option<f64>,
}

/// A validated transaction, ready for scoring.
///
/// Only obtainable through `FeatureRecord::try_from(FeatureForm)`, so every
/// instance has finite, non-negative numerics and a known transaction type.
/// Serializes with the field names `POST /predict` expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    step: u32,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(rename = "nameOrig")]
    origin_id: String,
    #[serde(rename = "oldbalanceOrg", with = "rust_decimal::serde::float")]
    origin_balance_before: Decimal,
    #[serde(rename = "newbalanceOrig", with = "rust_decimal::serde::float")]
    origin_balance_after: Decimal,
    #[serde(rename = "nameDest")]
    dest_id: String,
    #[serde(rename = "oldbalanceDest", with = "rust_decimal::serde::float")]
    dest_balance_before: Decimal,
    #[serde(rename = "newbalanceDest", with = "rust_decimal::serde::float")]
    dest_balance_after: Decimal,
}

impl FeatureRecord {
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn origin_id(&self) -> &str {
        &self.origin_id
    }

    pub fn origin_balance_before(&self) -> Decimal {
        self.origin_balance_before
    }

    pub fn origin_balance_after(&self) -> Decimal {
        self.origin_balance_after
    }

    pub fn dest_id(&self) -> &str {
        &self.dest_id
    }

    pub fn dest_balance_before(&self) -> Decimal {
        self.dest_balance_before
    }

    pub fn dest_balance_after(&self) -> Decimal {
        self.dest_balance_after
    }
}

impl TryFrom<FeatureForm> for FeatureRecord {
    type Error = ValidationError;

    fn try_from(form: FeatureForm) -> Result<Self, Self::Error> {
        let kind = form
            .kind
            .as_deref()
            .ok_or(ValidationError::MissingField("type"))?
            .parse::<TransactionType>()?;

        Ok(FeatureRecord {
            step: step_value(form.step)?,
            kind,
            amount: non_negative("amount", form.amount)?,
            origin_id: identifier("nameOrig", form.origin_id)?,
            origin_balance_before: non_negative("oldbalanceOrg", form.origin_balance_before)?,
            origin_balance_after: non_negative("newbalanceOrig", form.origin_balance_after)?,
            dest_id: identifier("nameDest", form.dest_id)?,
            dest_balance_before: non_negative("oldbalanceDest", form.dest_balance_before)?,
            dest_balance_after: non_negative("newbalanceDest", form.dest_balance_after)?,
        })
    }
}

fn step_value(value: Option<f64>) -> Result<u32, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField("step"))?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite("step"));
    }
    if value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ValidationError::OutOfRange {
            field: "step",
            value: value.to_string(),
        });
    }
    Ok(value as u32)
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<Decimal, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
        });
    }

    let out_of_range = || ValidationError::OutOfRange {
        field,
        value: value.to_string(),
    };

    // Go through the shortest decimal rendering so 0.1 stays 0.1.
    // Decimal holds 28 fractional digits and magnitudes below ~7.9e28.
    let decimal = Decimal::from_str(&value.to_string()).map_err(|_| out_of_range())?;
    if decimal.is_zero() && value != 0.0 {
        return Err(out_of_range());
    }
    Ok(decimal)
}

fn identifier(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyIdentifier(field));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(format!("unknown risk level `{}`", s)),
        }
    }
}

/// Who produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    Remote,
    Fallback,
}

/// One scoring result. Built once per submission and handed out by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_fraud: bool,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub produced_at: DateTime<Utc>,
    pub source: VerdictSource,
}

impl Verdict {
    /// Probability rendered the way the result page shows it, e.g. `92.0%`
    pub fn probability_percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogStatus {
    Fraud,
    Legitimate,
}

/// A past verdict as reported by the audit endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(alias = "type")]
    pub merchant: String,
    pub status: LogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Raw counters from `GET /stats`. Signed so bad upstream data can be seen and clamped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounts {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub total_rows_processed: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub fraud_count: i64,
    #[serde(default)]
    pub last_upload: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_transactions: u64,
    pub fraud_detected: u64,
    pub detection_accuracy: u8,
}

impl DashboardStats {
    pub fn legitimate(&self) -> u64 {
        self.total_transactions.saturating_sub(self.fraud_detected)
    }
}

/// Parse the timestamp formats the backend has been seen to emit.
/// Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(&raw).map(|dt| dt.date_naive()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`", raw)))
}

/// `null` counts read as zero, the same as an absent key
fn count_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}
