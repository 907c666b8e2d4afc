//! Credit-score and loan-eligibility estimation for students on the credential ledger.
//!
//! The ledger's own eligibility figures are preferred when present, then its bare
//! credit score. Otherwise the score is rebuilt from four ledger signals (credentials, admission, academic
//! record, profile completeness) and mapped onto the tier table.

pub mod adapter;
pub mod domain;
pub mod evaluation;
pub mod ledger;
pub mod loan;
pub mod phase;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use adapter::{DegradedSignal, FetchedSignals, SignalFetcher};
pub use domain::{
    AdmissionRecord, AdmissionStatus, CredentialRecord, LedgerTerms, PrecomputedEligibility,
    ProfileSnapshot, StudentSignals, SubjectId, SubjectIdError, ZERO_ADDRESS,
};
pub use evaluation::{
    compute_score, evaluate, format_rate_bps, EligibilityEngine, EligibilityResult,
    EvaluationConfig, EvaluationOutcome, ScoreBreakdown, ScoreComponent, ScoreFactor, Tier,
    MAX_SCORE,
};
pub use ledger::{LedgerCall, LedgerClient, LedgerError};
pub use loan::{screen_loan_request, LoanDecision, LoanRequest, LoanRequestError};
pub use phase::{EvaluationPhase, PhaseError};
pub use router::{eligibility_router, ScoreRequest};
pub use service::{
    EligibilityReport, EligibilityService, EvaluationError, EvaluationSettings, ScoreSource,
};
