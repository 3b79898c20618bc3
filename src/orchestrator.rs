// src/orchestrator.rs
//! One submission, one verdict.
//!
//! `Prediction` walks `Idle → Submitting → Resolved | Failed` exactly once.
//! Whether a remote failure becomes a fallback verdict or is handed back to
//! the caller is decided here and nowhere else, by `fallback_enabled`.

use std::future::Future;
use tracing::{debug, error, info, warn};

use crate::client::FraudClient;
use crate::error::ClientError;
use crate::heuristic;
use crate::models::{FeatureRecord, Verdict, VerdictSource};

/// Anything that can turn a record into a verdict with one remote call.
pub trait Scorer {
    fn score(
        &self,
        record: &FeatureRecord,
    ) -> impl Future<Output = Result<Verdict, ClientError>> + Send;
}

impl Scorer for FraudClient {
    fn score(
        &self,
        record: &FeatureRecord,
    ) -> impl Future<Output = Result<Verdict, ClientError>> + Send {
        self.predict(record)
    }
}

/// Where a submission currently stands. Terminal states carry no payload;
/// the verdict or error is returned to the caller instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionState {
    Idle,
    Submitting,
    Resolved(VerdictSource),
    Failed(&'static str),
}

impl PredictionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionState::Resolved(_) | PredictionState::Failed(_))
    }
}

/// A single-use prediction. `submit` consumes it, so an instance can never
/// be driven twice; start a new one per submission.
pub struct Prediction<'a, S> {
    scorer: &'a S,
    fallback_enabled: bool,
    state: PredictionState,
}

impl<'a, S: Scorer> Prediction<'a, S> {
    pub fn new(scorer: &'a S, fallback_enabled: bool) -> Self {
        Self {
            scorer,
            fallback_enabled,
            state: PredictionState::Idle,
        }
    }

    pub fn state(&self) -> PredictionState {
        self.state
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// Score `record`. With fallback enabled this always yields a verdict.
    pub async fn submit(mut self, record: FeatureRecord) -> Result<Verdict, ClientError> {
        self.begin();
        let outcome = self.scorer.score(&record).await;
        self.settle(&record, outcome)
    }

    fn begin(&mut self) {
        debug_assert_eq!(self.state, PredictionState::Idle);
        self.transition(PredictionState::Submitting);
    }

    fn settle(
        &mut self,
        record: &FeatureRecord,
        outcome: Result<Verdict, ClientError>,
    ) -> Result<Verdict, ClientError> {
        debug_assert_eq!(self.state, PredictionState::Submitting);

        match outcome {
            Ok(verdict) => {
                let verdict = Verdict {
                    source: VerdictSource::Remote,
                    ..verdict
                };
                self.transition(PredictionState::Resolved(VerdictSource::Remote));
                Ok(verdict)
            }
            Err(err) if self.fallback_enabled => {
                warn!(
                    "Scoring failed ({}), using fallback heuristic: {}",
                    err.kind(),
                    err
                );
                let verdict = heuristic::fallback_verdict(record);
                self.transition(PredictionState::Resolved(VerdictSource::Fallback));
                Ok(verdict)
            }
            Err(err) => {
                error!("Scoring failed ({}): {}", err.kind(), err);
                self.transition(PredictionState::Failed(err.kind()));
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: PredictionState) {
        debug!("Prediction {:?} → {:?}", self.state, next);
        if next.is_terminal() {
            info!("Prediction settled: {:?}", next);
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureForm, RiskLevel};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scorer that replays a fixed outcome and counts calls
    struct Stub {
        outcome: fn() -> Result<Verdict, ClientError>,
        calls: AtomicUsize,
    }

    impl Stub {
        fn new(outcome: fn() -> Result<Verdict, ClientError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Scorer for Stub {
        fn score(
            &self,
            _record: &FeatureRecord,
        ) -> impl Future<Output = Result<Verdict, ClientError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = (self.outcome)();
            async move { outcome }
        }
    }

    fn remote_ok() -> Result<Verdict, ClientError> {
        Ok(Verdict {
            is_fraud: true,
            probability: 0.99,
            risk_level: RiskLevel::Critical,
            produced_at: Utc::now(),
            source: VerdictSource::Fallback,
        })
    }

    fn unavailable() -> Result<Verdict, ClientError> {
        Err(ClientError::RemoteUnavailable("connection refused".into()))
    }

    fn rejected() -> Result<Verdict, ClientError> {
        Err(ClientError::RemoteRejected {
            status: 500,
            body: "boom".into(),
        })
    }

    fn malformed() -> Result<Verdict, ClientError> {
        Err(ClientError::MalformedResponse("not json".into()))
    }

    fn record(amount: f64) -> FeatureRecord {
        FeatureRecord::try_from(FeatureForm {
            step: Some(1.0),
            kind: Some("CASH_OUT".into()),
            amount: Some(amount),
            origin_id: Some("C9".into()),
            origin_balance_before: Some(amount),
            origin_balance_after: Some(0.0),
            dest_id: Some("C10".into()),
            dest_balance_before: Some(0.0),
            dest_balance_after: Some(amount),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn remote_verdict_is_tagged_remote() {
        let stub = Stub::new(remote_ok);
        let verdict = Prediction::new(&stub, true).submit(record(10.0)).await.unwrap();

        assert_eq!(verdict.source, VerdictSource::Remote);
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_failure_resolves_with_fallback_enabled() {
        for outcome in [unavailable, rejected, malformed] {
            let stub = Stub::new(outcome);
            let verdict = Prediction::new(&stub, true)
                .submit(record(60_000.0))
                .await
                .unwrap();

            assert_eq!(verdict.source, VerdictSource::Fallback);
            assert_eq!(verdict.risk_level, RiskLevel::High);
            assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn failure_propagates_with_fallback_disabled() {
        let stub = Stub::new(rejected);
        let err = Prediction::new(&stub, false)
            .submit(record(60_000.0))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::RemoteRejected { status: 500, .. }));
    }

    #[test]
    fn state_walks_idle_submitting_terminal() {
        let stub = Stub::new(unavailable);
        let mut prediction = Prediction::new(&stub, false);
        assert_eq!(prediction.state(), PredictionState::Idle);

        prediction.begin();
        assert_eq!(prediction.state(), PredictionState::Submitting);

        let result = prediction.settle(&record(5.0), unavailable());
        assert!(result.is_err());
        assert_eq!(
            prediction.state(),
            PredictionState::Failed("remote_unavailable")
        );
        assert!(prediction.state().is_terminal());
    }

    #[test]
    fn fallback_settles_resolved() {
        let stub = Stub::new(malformed);
        let mut prediction = Prediction::new(&stub, true);
        prediction.begin();

        let verdict = prediction.settle(&record(5.0), malformed()).unwrap();
        assert!(!verdict.is_fraud);
        assert_eq!(
            prediction.state(),
            PredictionState::Resolved(VerdictSource::Fallback)
        );
    }
}
