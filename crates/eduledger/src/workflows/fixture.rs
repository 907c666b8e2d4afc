//! JSON ledger snapshots and the in-memory ledger client built from them.
//!
//! Used by the CLI demo, local serving without a chain connection, and tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::{
    AdmissionRecord, AdmissionStatus, CredentialRecord, LedgerCall, LedgerClient, LedgerError,
    PrecomputedEligibility, ProfileSnapshot, SubjectId,
};

/// Profile fields as stored on the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub identification_number: String,
}

impl ProfileEntry {
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            exists: true,
            has_email: !self.contact_email.trim().is_empty(),
            has_id_number: !self.identification_number.trim().is_empty(),
        }
    }
}

/// Everything the ledger holds for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEntry {
    #[serde(default)]
    pub profile: Option<ProfileEntry>,
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
    #[serde(default)]
    pub admission: Option<AdmissionRecord>,
    #[serde(default)]
    pub precomputed: Option<PrecomputedEligibility>,
    /// Bare score for students without a full eligibility record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u16>,
    /// Calls that fail for this student, to rehearse degraded evaluations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreachable: Vec<LedgerCall>,
}

/// Sample ledger bundled with the crate: a precomputed student, recomputed
/// students across tiers, and one with an unreachable profile.
pub const SAMPLE_LEDGER: &str = include_str!("../../fixtures/ledger.json");

/// Serialized ledger contents keyed by student address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub students: BTreeMap<SubjectId, StudentEntry>,
}

impl LedgerSnapshot {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FixtureError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn sample() -> Result<Self, FixtureError> {
        Self::from_reader(SAMPLE_LEDGER.as_bytes())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read ledger fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ledger fixture: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ledger client over an in-process snapshot, with switchable outages.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    students: HashMap<SubjectId, StudentEntry>,
    direct_count: bool,
    offline: AtomicBool,
    failures: Mutex<HashMap<SubjectId, HashSet<LedgerCall>>>,
}

impl InMemoryLedger {
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            students: snapshot.students.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Answer `credential_count` directly instead of forcing index probes.
    pub fn with_direct_count(mut self, enabled: bool) -> Self {
        self.direct_count = enabled;
        self
    }

    pub fn insert(&mut self, subject: SubjectId, entry: StudentEntry) {
        self.students.insert(subject, entry);
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<_> = self.students.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::Release);
    }

    pub fn fail_on(&self, subject: &SubjectId, call: LedgerCall) {
        self.failures
            .lock()
            .expect("ledger mutex poisoned")
            .entry(subject.clone())
            .or_default()
            .insert(call);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().expect("ledger mutex poisoned").clear();
    }

    fn check(&self, subject: &SubjectId, call: LedgerCall) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::Acquire) {
            return Err(LedgerError::Unavailable("in-memory ledger offline".to_string()));
        }

        let injected = self
            .failures
            .lock()
            .expect("ledger mutex poisoned")
            .get(subject)
            .is_some_and(|calls| calls.contains(&call));
        let configured = self
            .students
            .get(subject)
            .is_some_and(|entry| entry.unreachable.contains(&call));

        if injected || configured {
            return Err(LedgerError::Query {
                call,
                reason: "call reverted".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn ensure_connected(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::Acquire) {
            return Err(LedgerError::Unavailable("in-memory ledger offline".to_string()));
        }
        Ok(())
    }

    async fn profile(&self, subject: &SubjectId) -> Result<ProfileSnapshot, LedgerError> {
        self.check(subject, LedgerCall::Profile)?;
        Ok(self
            .students
            .get(subject)
            .and_then(|entry| entry.profile.as_ref())
            .map(ProfileEntry::snapshot)
            .unwrap_or_default())
    }

    async fn credential_count(&self, subject: &SubjectId) -> Result<Option<i64>, LedgerError> {
        self.check(subject, LedgerCall::Credentials)?;
        if !self.direct_count {
            return Ok(None);
        }
        let count = self
            .students
            .get(subject)
            .map(|entry| entry.credentials.iter().filter(|c| c.is_issued()).count())
            .unwrap_or(0);
        Ok(Some(count as i64))
    }

    async fn credential(
        &self,
        subject: &SubjectId,
        index: u32,
    ) -> Result<Option<CredentialRecord>, LedgerError> {
        self.check(subject, LedgerCall::Credentials)?;
        Ok(self
            .students
            .get(subject)
            .and_then(|entry| entry.credentials.get(index as usize))
            .cloned())
    }

    async fn admission_status(&self, subject: &SubjectId) -> Result<AdmissionStatus, LedgerError> {
        self.check(subject, LedgerCall::Admission)?;
        Ok(self
            .students
            .get(subject)
            .and_then(|entry| entry.admission.as_ref())
            .map(AdmissionRecord::status)
            .unwrap_or_default())
    }

    async fn precomputed_eligibility(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<PrecomputedEligibility>, LedgerError> {
        self.check(subject, LedgerCall::Precomputed)?;
        Ok(self
            .students
            .get(subject)
            .and_then(|entry| entry.precomputed.clone()))
    }

    async fn credit_score(&self, subject: &SubjectId) -> Result<Option<u16>, LedgerError> {
        self.check(subject, LedgerCall::CreditScore)?;
        Ok(self.students.get(subject).and_then(|entry| entry.credit_score))
    }
}
