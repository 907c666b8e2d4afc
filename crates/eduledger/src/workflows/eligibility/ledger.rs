use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{
    AdmissionStatus, CredentialRecord, PrecomputedEligibility, ProfileSnapshot, SubjectId,
};

/// Read-only view of the credential ledger (the deployed contract).
///
/// Implementations translate whatever transport they use into these typed
/// answers. A student with no profile is `Ok(ProfileSnapshot::default())`,
/// not an error.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fails only when there is no usable connection at all.
    async fn ensure_connected(&self) -> Result<(), LedgerError>;

    async fn profile(&self, subject: &SubjectId) -> Result<ProfileSnapshot, LedgerError>;

    /// `Ok(None)` when the ledger offers no direct count call; callers then
    /// probe [`LedgerClient::credential`] index by index.
    async fn credential_count(&self, subject: &SubjectId) -> Result<Option<i64>, LedgerError>;

    /// `Ok(None)` past the last credential.
    async fn credential(
        &self,
        subject: &SubjectId,
        index: u32,
    ) -> Result<Option<CredentialRecord>, LedgerError>;

    async fn admission_status(&self, subject: &SubjectId) -> Result<AdmissionStatus, LedgerError>;

    async fn precomputed_eligibility(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<PrecomputedEligibility>, LedgerError>;

    /// Bare credit score kept by the ledger, consulted when no full
    /// eligibility record exists. `Ok(None)` when the ledger has no such call.
    async fn credit_score(&self, _subject: &SubjectId) -> Result<Option<u16>, LedgerError> {
        Ok(None)
    }
}

/// Ledger call categories, used for degraded-signal reporting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCall {
    Profile,
    Credentials,
    Admission,
    Precomputed,
    CreditScore,
}

impl LedgerCall {
    pub fn label(&self) -> &'static str {
        match self {
            LedgerCall::Profile => "profile",
            LedgerCall::Credentials => "credentials",
            LedgerCall::Admission => "admission",
            LedgerCall::Precomputed => "precomputed",
            LedgerCall::CreditScore => "credit_score",
        }
    }
}

impl fmt::Display for LedgerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failures reported by a ledger client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("{call} query failed: {reason}")]
    Query { call: LedgerCall, reason: String },
    #[error("ledger returned malformed {call} data: {reason}")]
    Malformed { call: LedgerCall, reason: String },
}
