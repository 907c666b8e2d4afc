use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{
    AdmissionStatus, PrecomputedEligibility, ProfileSnapshot, StudentSignals, SubjectId,
};
use super::ledger::{LedgerCall, LedgerClient, LedgerError};

/// Probe cap used when the ledger cannot count credentials directly.
pub const DEFAULT_CREDENTIAL_PROBE_LIMIT: u32 = 10;

/// A sub-query that failed and was replaced with its neutral value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedSignal {
    pub signal: LedgerCall,
    pub reason: String,
}

/// Signals assembled for one subject, with any substitutions made on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedSignals {
    pub signals: StudentSignals,
    pub degraded: Vec<DegradedSignal>,
}

impl FetchedSignals {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Normalizes ledger answers into [`StudentSignals`], absorbing per-query failures.
pub struct SignalFetcher<L> {
    ledger: Arc<L>,
    probe_limit: u32,
}

impl<L> SignalFetcher<L>
where
    L: LedgerClient + 'static,
{
    pub fn new(ledger: Arc<L>) -> Self {
        Self::with_probe_limit(ledger, DEFAULT_CREDENTIAL_PROBE_LIMIT)
    }

    pub fn with_probe_limit(ledger: Arc<L>, probe_limit: u32) -> Self {
        Self {
            ledger,
            probe_limit: probe_limit.max(1),
        }
    }

    pub fn probe_limit(&self) -> u32 {
        self.probe_limit
    }

    /// Ledger-computed eligibility, if the ledger has one. Lookup failures
    /// fall back to `None` so the caller recomputes locally.
    pub async fn precomputed(&self, subject: &SubjectId) -> Option<PrecomputedEligibility> {
        match self.ledger.precomputed_eligibility(subject).await {
            Ok(found) => found,
            Err(err) => {
                warn!(%subject, signal = "precomputed", error = %err, "precomputed eligibility unavailable, recomputing");
                None
            }
        }
    }

    /// Bare ledger credit score. Failures read as `None`, like [`Self::precomputed`].
    pub async fn ledger_score(&self, subject: &SubjectId) -> Option<u16> {
        match self.ledger.credit_score(subject).await {
            Ok(score) => score,
            Err(err) => {
                warn!(%subject, signal = "credit_score", error = %err, "ledger credit score unavailable, recomputing");
                None
            }
        }
    }

    /// Queries profile, credentials and admission concurrently. Each failure
    /// is replaced by the zero value for that signal.
    pub async fn fetch(&self, subject: &SubjectId) -> FetchedSignals {
        let (profile, credentials, admission) = tokio::join!(
            self.ledger.profile(subject),
            self.credential_count(subject),
            self.ledger.admission_status(subject),
        );

        let mut degraded = Vec::new();

        let profile = absorb(subject, LedgerCall::Profile, profile, &mut degraded)
            .unwrap_or_else(ProfileSnapshot::default);
        let credential_count = absorb(subject, LedgerCall::Credentials, credentials, &mut degraded)
            .unwrap_or(0);
        let admission_status = absorb(subject, LedgerCall::Admission, admission, &mut degraded)
            .unwrap_or(AdmissionStatus::None);

        let signals =
            StudentSignals::from_raw(profile.is_complete(), credential_count, admission_status);
        debug!(%subject, ?signals, degraded = degraded.len(), "signals assembled");

        FetchedSignals { signals, degraded }
    }

    async fn credential_count(&self, subject: &SubjectId) -> Result<i64, LedgerError> {
        match self.ledger.credential_count(subject).await? {
            Some(count) => Ok(count),
            None => Ok(self.probe_credentials(subject).await),
        }
    }

    /// Walks indices `0..probe_limit`. Stops at the first empty slot or probe
    /// error; slots with a zero issuer are skipped without being counted.
    async fn probe_credentials(&self, subject: &SubjectId) -> i64 {
        let mut count = 0;
        for index in 0..self.probe_limit {
            match self.ledger.credential(subject, index).await {
                Ok(Some(record)) if record.is_issued() => count += 1,
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(err) => {
                    debug!(%subject, index, error = %err, "credential probe stopped");
                    break;
                }
            }
        }
        count
    }
}

fn absorb<T>(
    subject: &SubjectId,
    signal: LedgerCall,
    result: Result<T, LedgerError>,
    degraded: &mut Vec<DegradedSignal>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%subject, signal = signal.label(), error = %err, "ledger sub-query failed, using neutral value");
            degraded.push(DegradedSignal {
                signal,
                reason: err.to_string(),
            });
            None
        }
    }
}
