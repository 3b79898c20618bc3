// src/heuristic.rs
//! Local stand-in for the remote classifier.
//!
//! Only consulted when the scoring service cannot produce a verdict. The
//! thresholds are coarse proxies for the remote model and must stay stable:
//! users see these numbers whenever the backend is down.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{FeatureRecord, RiskLevel, Verdict, VerdictSource};

/// Amounts strictly above this are treated as high risk
pub const HIGH_AMOUNT_THRESHOLD: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

pub const HIGH_RISK_PROBABILITY: f64 = 0.92;
pub const LOW_RISK_PROBABILITY: f64 = 0.15;

/// Score a record without any I/O. Never fails.
pub fn fallback_verdict(record: &FeatureRecord) -> Verdict {
    fallback_verdict_at(record, Utc::now())
}

/// Flags `amount > 50000` or a sender balance that did not drop by the amount.
/// Only the amount sets the tier: a balance mismatch alone yields
/// `is_fraud = true` with `RiskLevel::Low` and the low probability. Fallback
/// verdicts therefore do not follow the remote rule that fraud implies
/// High or Critical.
pub fn fallback_verdict_at(record: &FeatureRecord, now: DateTime<Utc>) -> Verdict {
    let large = record.amount() > HIGH_AMOUNT_THRESHOLD;

    Verdict {
        is_fraud: large || balance_mismatch(record),
        probability: if large {
            HIGH_RISK_PROBABILITY
        } else {
            LOW_RISK_PROBABILITY
        },
        risk_level: if large { RiskLevel::High } else { RiskLevel::Low },
        produced_at: now,
        source: VerdictSource::Fallback,
    }
}

/// True when the sender's balance did not drop by exactly the amount sent.
pub fn balance_mismatch(record: &FeatureRecord) -> bool {
    record.origin_balance_before() - record.origin_balance_after() != record.amount()
}
