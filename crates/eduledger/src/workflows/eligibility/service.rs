use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::adapter::{DegradedSignal, SignalFetcher, DEFAULT_CREDENTIAL_PROBE_LIMIT};
use super::domain::{LedgerTerms, StudentSignals, SubjectId, SubjectIdError};
use super::evaluation::{
    EligibilityEngine, EligibilityResult, EvaluationConfig, EvaluationOutcome, ScoreBreakdown,
    ScoreComponent,
};
use super::ledger::{LedgerClient, LedgerError};
use super::phase::{EvaluationPhase, PhaseError, PhaseTrail};

/// Advisory budget for one evaluation before it is reported as slow.
pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime knobs for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSettings {
    pub advisory_timeout: Duration,
    pub credential_probe_limit: u32,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            advisory_timeout: DEFAULT_ADVISORY_TIMEOUT,
            credential_probe_limit: DEFAULT_CREDENTIAL_PROBE_LIMIT,
        }
    }
}

/// Where the reported score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Score already computed by the ledger.
    Precomputed,
    /// Bare credit score read from the ledger, without its eligibility record.
    LedgerScore,
    /// Score rebuilt locally from ledger signals.
    Recomputed,
}

/// Full answer for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub subject: SubjectId,
    pub source: ScoreSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<StudentSignals>,
    pub breakdown: ScoreBreakdown,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ScoreComponent>,
    pub result: EligibilityResult,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<DegradedSignal>,
    pub phases: Vec<EvaluationPhase>,
    pub evaluated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_updated_at: Option<DateTime<Utc>>,
    /// Terms the ledger published; `result` is always derived locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_terms: Option<LedgerTerms>,
}

impl EligibilityReport {
    pub fn summary(&self) -> String {
        if self.result.is_eligible {
            format!(
                "{} ({}): eligible at {}, up to {} {}",
                self.result.tier,
                self.result.score,
                self.result.interest_rate_text(),
                self.result.max_loan_amount,
                self.currency
            )
        } else {
            self.result.summary()
        }
    }
}

/// Error raised by the eligibility service. Sub-query failures never surface
/// here; they are recorded on the report instead.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid subject identifier: {0}")]
    InvalidInput(#[from] SubjectIdError),
    #[error("unable to calculate score at this time: {0}")]
    AdapterUnavailable(#[source] LedgerError),
    #[error("eligibility check for {subject} still running after {}s; try again shortly", .after.as_secs())]
    TimedOut { subject: SubjectId, after: Duration },
    #[error(transparent)]
    Phase(#[from] PhaseError),
}

/// Service composing the ledger adapter and the eligibility engine.
pub struct EligibilityService<L> {
    ledger: Arc<L>,
    fetcher: SignalFetcher<L>,
    engine: Arc<EligibilityEngine>,
    settings: EvaluationSettings,
}

impl<L> EligibilityService<L>
where
    L: LedgerClient + 'static,
{
    pub fn new(ledger: Arc<L>, config: EvaluationConfig) -> Self {
        Self::with_settings(ledger, config, EvaluationSettings::default())
    }

    pub fn with_settings(
        ledger: Arc<L>,
        config: EvaluationConfig,
        settings: EvaluationSettings,
    ) -> Self {
        let fetcher = SignalFetcher::with_probe_limit(ledger.clone(), settings.credential_probe_limit);
        Self {
            ledger,
            fetcher,
            engine: Arc::new(EligibilityEngine::new(config)),
            settings,
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Evaluate one subject. Malformed identifiers are rejected before any
    /// ledger call is made.
    pub async fn evaluate(&self, raw_subject: &str) -> Result<EligibilityReport, EvaluationError> {
        let subject = SubjectId::parse(raw_subject)?;
        let after = self.settings.advisory_timeout;

        match tokio::time::timeout(after, self.run(&subject)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%subject, timeout_secs = after.as_secs(), "eligibility evaluation exceeded advisory timeout");
                Err(EvaluationError::TimedOut { subject, after })
            }
        }
    }

    /// Evaluate independent subjects concurrently; results keep input order.
    pub async fn evaluate_many<S>(
        &self,
        subjects: &[S],
    ) -> Vec<Result<EligibilityReport, EvaluationError>>
    where
        S: AsRef<str>,
    {
        join_all(subjects.iter().map(|subject| self.evaluate(subject.as_ref()))).await
    }

    /// Recompute from signals the caller already holds.
    pub fn score_signals(&self, signals: &StudentSignals) -> EvaluationOutcome {
        self.engine.score(signals)
    }

    async fn run(&self, subject: &SubjectId) -> Result<EligibilityReport, EvaluationError> {
        let mut trail = PhaseTrail::default();
        trail.advance(EvaluationPhase::Fetching)?;

        if let Err(err) = self.ledger.ensure_connected().await {
            trail.advance(EvaluationPhase::Errored)?;
            warn!(%subject, error = %err, "ledger adapter unavailable");
            return Err(EvaluationError::AdapterUnavailable(err));
        }

        let report = if let Some(precomputed) = self.fetcher.precomputed(subject).await {
            trail.advance(EvaluationPhase::Computing)?;
            EligibilityReport {
                ledger_updated_at: precomputed.last_updated,
                ledger_terms: Some(precomputed.terms()),
                ..self.ledger_report(subject, ScoreSource::Precomputed, precomputed.credit_score)
            }
        } else if let Some(score) = self.fetcher.ledger_score(subject).await {
            trail.advance(EvaluationPhase::Computing)?;
            self.ledger_report(subject, ScoreSource::LedgerScore, score)
        } else {
            let fetched = self.fetcher.fetch(subject).await;
            trail.advance(EvaluationPhase::Computing)?;
            let outcome = self.engine.score(&fetched.signals);
            EligibilityReport {
                subject: subject.clone(),
                source: ScoreSource::Recomputed,
                signals: Some(fetched.signals),
                breakdown: outcome.breakdown,
                components: outcome.components,
                result: outcome.result,
                currency: self.engine.config().currency.clone(),
                degraded: fetched.degraded,
                phases: Vec::new(),
                evaluated_at: Utc::now(),
                ledger_updated_at: None,
                ledger_terms: None,
            }
        };

        trail.advance(EvaluationPhase::Done)?;
        info!(
            %subject,
            source = ?report.source,
            score = report.result.score,
            tier = %report.result.tier,
            degraded = report.degraded.len(),
            "eligibility evaluated"
        );

        Ok(EligibilityReport {
            phases: trail.into_phases(),
            ..report
        })
    }

    /// Report for a score the ledger supplied; buckets are apportioned from it.
    fn ledger_report(
        &self,
        subject: &SubjectId,
        source: ScoreSource,
        score: u16,
    ) -> EligibilityReport {
        let result = self.engine.assess(score);
        EligibilityReport {
            subject: subject.clone(),
            source,
            signals: None,
            breakdown: ScoreBreakdown::apportion(result.score),
            components: Vec::new(),
            result,
            currency: self.engine.config().currency.clone(),
            degraded: Vec::new(),
            phases: Vec::new(),
            evaluated_at: Utc::now(),
            ledger_updated_at: None,
            ledger_terms: None,
        }
    }
}
