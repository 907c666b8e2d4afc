use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Address the ledger uses for "no issuer" in empty credential slots.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

const ADDRESS_HEX_LEN: usize = 40;

/// Ledger address identifying the student being evaluated.
///
/// Stored in lowercase so lookups are insensitive to checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(raw: &str) -> Result<Self, SubjectIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubjectIdError::Empty);
        }

        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or(SubjectIdError::MissingPrefix)?;

        if hex.len() != ADDRESS_HEX_LEN {
            return Err(SubjectIdError::Length(hex.len()));
        }

        if let Some(invalid) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(SubjectIdError::NonHex(invalid));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubjectId {
    type Err = SubjectIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = SubjectIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

/// Rejections for malformed subject identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubjectIdError {
    #[error("subject identifier is empty")]
    Empty,
    #[error("subject identifier must start with 0x")]
    MissingPrefix,
    #[error("subject identifier must carry 40 hex digits, found {0}")]
    Length(usize),
    #[error("subject identifier contains non-hex character {0:?}")]
    NonHex(char),
}

/// Where a student's admission request stands on the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    #[default]
    None,
    PendingVerification,
    Verified,
}

impl AdmissionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AdmissionStatus::None => "none",
            AdmissionStatus::PendingVerification => "pending_verification",
            AdmissionStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdmissionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "pending" | "pending_verification" | "unverified" => Ok(Self::PendingVerification),
            "verified" => Ok(Self::Verified),
            other => Err(format!(
                "unknown admission status '{other}' (expected none, pending or verified)"
            )),
        }
    }
}

/// The four inputs to the score calculator, normalized at the ledger edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSignals {
    pub profile_complete: bool,
    pub credential_count: u32,
    pub admission_status: AdmissionStatus,
    pub has_any_credential: bool,
}

impl StudentSignals {
    /// Builds signals from loosely typed ledger values. Negative counts are
    /// treated as zero.
    pub fn from_raw(
        profile_complete: bool,
        raw_credential_count: i64,
        admission_status: AdmissionStatus,
    ) -> Self {
        let credential_count = u32::try_from(raw_credential_count.max(0)).unwrap_or(u32::MAX);
        Self {
            profile_complete,
            credential_count,
            admission_status,
            has_any_credential: credential_count > 0,
        }
    }
}

/// Profile facts the score needs; personal details never leave the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub exists: bool,
    pub has_email: bool,
    pub has_id_number: bool,
}

impl ProfileSnapshot {
    pub fn is_complete(&self) -> bool {
        self.exists && self.has_email && self.has_id_number
    }
}

/// Academic credential as issued on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub issuer: String,
    #[serde(default)]
    pub institution_name: String,
    #[serde(default)]
    pub credential_type: String,
    #[serde(default)]
    pub grade_or_percentage: String,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// Empty slots come back with a blank or zero issuer.
    pub fn is_issued(&self) -> bool {
        let issuer = self.issuer.trim();
        !issuer.is_empty() && !issuer.eq_ignore_ascii_case(ZERO_ADDRESS)
    }
}

/// Admission request as recorded by the university.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    #[serde(default)]
    pub university_name: String,
    #[serde(default)]
    pub course_name: String,
    pub is_verified: bool,
}

impl AdmissionRecord {
    pub fn status(&self) -> AdmissionStatus {
        if self.is_verified {
            AdmissionStatus::Verified
        } else {
            AdmissionStatus::PendingVerification
        }
    }
}

/// Eligibility figures the ledger already computed for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedEligibility {
    pub credit_score: u16,
    pub is_eligible: bool,
    #[serde(default)]
    pub max_loan_amount: Decimal,
    #[serde(default)]
    pub interest_rate_bps: u32,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PrecomputedEligibility {
    pub fn terms(&self) -> LedgerTerms {
        LedgerTerms {
            is_eligible: self.is_eligible,
            max_loan_amount: self.max_loan_amount,
            interest_rate_bps: self.interest_rate_bps,
        }
    }
}

/// Loan terms as published by the ledger, reported next to the locally derived result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTerms {
    pub is_eligible: bool,
    pub max_loan_amount: Decimal,
    pub interest_rate_bps: u32,
}
