use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::eligibility::domain::{
    AdmissionRecord, AdmissionStatus, CredentialRecord, PrecomputedEligibility, ProfileSnapshot,
    StudentSignals, SubjectId, ZERO_ADDRESS,
};
use crate::workflows::eligibility::ledger::{LedgerCall, LedgerClient, LedgerError};
use crate::workflows::eligibility::{
    eligibility_router, EligibilityService, EvaluationConfig, EvaluationSettings,
};
use crate::workflows::fixture::{InMemoryLedger, ProfileEntry, StudentEntry};

pub(super) const SCHOLAR: &str = "0xf6b90589c42ff5bf7a61f67174de09c45fc32338";
pub(super) const NEWCOMER: &str = "0x61b9fbf168e3447be375cd24e321bf8efa42bd68";
pub(super) const RANKED: &str = "0x9c1f3e5a7b2d4c6e8f0a1b3c5d7e9f1a2b4c6d8e";
pub(super) const LISTED: &str = "0x3d5f7a9c1e2b4d6f8a0c2e4b6d8f0a1c3e5b7d9f";
pub(super) const ISSUER: &str = "0xe87b8ac25186c16c9cda13ac8ae0f43b6cd37239";

pub(super) fn subject(raw: &str) -> SubjectId {
    SubjectId::parse(raw).expect("valid subject")
}

pub(super) fn signals(
    profile_complete: bool,
    credential_count: i64,
    admission_status: AdmissionStatus,
) -> StudentSignals {
    StudentSignals::from_raw(profile_complete, credential_count, admission_status)
}

pub(super) fn complete_profile() -> ProfileEntry {
    ProfileEntry {
        name: "Asha Rao".to_string(),
        contact_email: "asha@example.edu".to_string(),
        identification_number: "ID-2041".to_string(),
    }
}

pub(super) fn credential(kind: &str) -> CredentialRecord {
    CredentialRecord {
        issuer: ISSUER.to_string(),
        institution_name: "State Polytechnic".to_string(),
        credential_type: kind.to_string(),
        grade_or_percentage: "A".to_string(),
        issued_at: None,
    }
}

pub(super) fn empty_slot() -> CredentialRecord {
    CredentialRecord {
        issuer: ZERO_ADDRESS.to_string(),
        institution_name: String::new(),
        credential_type: String::new(),
        grade_or_percentage: String::new(),
        issued_at: None,
    }
}

pub(super) fn verified_admission() -> AdmissionRecord {
    AdmissionRecord {
        university_name: "Northfield University".to_string(),
        course_name: "Computer Science".to_string(),
        is_verified: true,
    }
}

/// Two credentials, verified admission, complete profile: 825 recomputed.
pub(super) fn scholar_entry() -> StudentEntry {
    StudentEntry {
        profile: Some(complete_profile()),
        credentials: vec![credential("Degree"), credential("Diploma")],
        admission: Some(verified_admission()),
        ..StudentEntry::default()
    }
}

/// One credential and a pending admission with a complete profile: 570.
pub(super) fn newcomer_entry() -> StudentEntry {
    StudentEntry {
        profile: Some(complete_profile()),
        credentials: vec![credential("Certificate")],
        admission: Some(AdmissionRecord {
            is_verified: false,
            ..verified_admission()
        }),
        ..StudentEntry::default()
    }
}

/// Ledger already holds a 700 score for this student.
pub(super) fn ranked_entry() -> StudentEntry {
    StudentEntry {
        precomputed: Some(PrecomputedEligibility {
            credit_score: 700,
            is_eligible: true,
            max_loan_amount: dec!(10.5),
            interest_rate_bps: 800,
            last_updated: None,
        }),
        ..scholar_entry()
    }
}

/// No eligibility record, but the ledger keeps a bare 640 score.
pub(super) fn listed_entry() -> StudentEntry {
    StudentEntry {
        credit_score: Some(640),
        ..newcomer_entry()
    }
}

pub(super) fn seeded_ledger() -> InMemoryLedger {
    let mut ledger = InMemoryLedger::default();
    ledger.insert(subject(SCHOLAR), scholar_entry());
    ledger.insert(subject(NEWCOMER), newcomer_entry());
    ledger.insert(subject(RANKED), ranked_entry());
    ledger
}

pub(super) fn build_service() -> (Arc<EligibilityService<InMemoryLedger>>, Arc<InMemoryLedger>) {
    let ledger = Arc::new(seeded_ledger());
    let service = Arc::new(EligibilityService::new(
        ledger.clone(),
        EvaluationConfig::default(),
    ));
    (service, ledger)
}

pub(super) fn eligibility_router_with_service<L>(service: Arc<EligibilityService<L>>) -> Router
where
    L: LedgerClient + 'static,
{
    eligibility_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Delegates to a seeded ledger and counts every call it receives.
#[derive(Default)]
pub(super) struct CountingLedger {
    inner: InMemoryLedger,
    calls: AtomicUsize,
}

impl CountingLedger {
    pub(super) fn new(inner: InMemoryLedger) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for CountingLedger {
    async fn ensure_connected(&self) -> Result<(), LedgerError> {
        self.tick();
        self.inner.ensure_connected().await
    }

    async fn profile(&self, subject: &SubjectId) -> Result<ProfileSnapshot, LedgerError> {
        self.tick();
        self.inner.profile(subject).await
    }

    async fn credential_count(&self, subject: &SubjectId) -> Result<Option<i64>, LedgerError> {
        self.tick();
        self.inner.credential_count(subject).await
    }

    async fn credential(
        &self,
        subject: &SubjectId,
        index: u32,
    ) -> Result<Option<CredentialRecord>, LedgerError> {
        self.tick();
        self.inner.credential(subject, index).await
    }

    async fn admission_status(&self, subject: &SubjectId) -> Result<AdmissionStatus, LedgerError> {
        self.tick();
        self.inner.admission_status(subject).await
    }

    async fn precomputed_eligibility(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<PrecomputedEligibility>, LedgerError> {
        self.tick();
        self.inner.precomputed_eligibility(subject).await
    }
}

/// Every signal query takes `delay`; connection checks answer at once.
pub(super) struct SlowLedger {
    pub(super) delay: Duration,
    pub(super) inner: InMemoryLedger,
}

impl SlowLedger {
    /// Probes credentials index by index after the delayed count call.
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: seeded_ledger(),
        }
    }

    /// Answers the credential count directly.
    pub(super) fn with_direct_count(delay: Duration) -> Self {
        Self {
            delay,
            inner: seeded_ledger().with_direct_count(true),
        }
    }
}

#[async_trait]
impl LedgerClient for SlowLedger {
    async fn ensure_connected(&self) -> Result<(), LedgerError> {
        Ok(())
    }

    async fn profile(&self, subject: &SubjectId) -> Result<ProfileSnapshot, LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.profile(subject).await
    }

    async fn credential_count(&self, subject: &SubjectId) -> Result<Option<i64>, LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.credential_count(subject).await
    }

    async fn credential(
        &self,
        subject: &SubjectId,
        index: u32,
    ) -> Result<Option<CredentialRecord>, LedgerError> {
        self.inner.credential(subject, index).await
    }

    async fn admission_status(&self, subject: &SubjectId) -> Result<AdmissionStatus, LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.admission_status(subject).await
    }

    async fn precomputed_eligibility(
        &self,
        _subject: &SubjectId,
    ) -> Result<Option<PrecomputedEligibility>, LedgerError> {
        Ok(None)
    }
}

/// Returns an unbounded run of issued credentials and counts probes.
#[derive(Default)]
pub(super) struct EndlessCredentials {
    pub(super) probes: AtomicUsize,
}

#[async_trait]
impl LedgerClient for EndlessCredentials {
    async fn ensure_connected(&self) -> Result<(), LedgerError> {
        Ok(())
    }

    async fn profile(&self, _subject: &SubjectId) -> Result<ProfileSnapshot, LedgerError> {
        Ok(ProfileSnapshot::default())
    }

    async fn credential_count(&self, _subject: &SubjectId) -> Result<Option<i64>, LedgerError> {
        Ok(None)
    }

    async fn credential(
        &self,
        _subject: &SubjectId,
        _index: u32,
    ) -> Result<Option<CredentialRecord>, LedgerError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(credential("Transcript")))
    }

    async fn admission_status(&self, _subject: &SubjectId) -> Result<AdmissionStatus, LedgerError> {
        Ok(AdmissionStatus::None)
    }

    async fn precomputed_eligibility(
        &self,
        _subject: &SubjectId,
    ) -> Result<Option<PrecomputedEligibility>, LedgerError> {
        Err(LedgerError::Query {
            call: LedgerCall::Precomputed,
            reason: "method not deployed".to_string(),
        })
    }
}

pub(super) fn short_timeout_settings(timeout: Duration) -> EvaluationSettings {
    EvaluationSettings {
        advisory_timeout: timeout,
        ..EvaluationSettings::default()
    }
}
