use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::service::EligibilityReport;

/// Student's request for an education loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: Decimal,
    pub purpose: String,
    pub repayment_months: u16,
}

/// Validation failures for loan requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanRequestError {
    #[error("loan amount must be greater than 0")]
    NonPositiveAmount,
    #[error("loan purpose is required")]
    MissingPurpose,
    #[error("repayment period must be greater than 0")]
    NonPositiveRepaymentPeriod,
}

impl LoanRequest {
    pub fn validate(&self) -> Result<(), LoanRequestError> {
        if self.amount <= Decimal::ZERO {
            return Err(LoanRequestError::NonPositiveAmount);
        }
        if self.purpose.trim().is_empty() {
            return Err(LoanRequestError::MissingPurpose);
        }
        if self.repayment_months == 0 {
            return Err(LoanRequestError::NonPositiveRepaymentPeriod);
        }
        Ok(())
    }
}

/// Bank-side outcome of screening a request against an eligibility report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LoanDecision {
    Approved {
        amount: Decimal,
        interest_rate_bps: u32,
        repayment_months: u16,
    },
    CounterOffer {
        requested: Decimal,
        max_amount: Decimal,
        interest_rate_bps: u32,
    },
    Rejected {
        reason: String,
    },
}

impl LoanDecision {
    pub fn summary(&self, currency: &str) -> String {
        match self {
            LoanDecision::Approved {
                amount,
                interest_rate_bps,
                repayment_months,
            } => format!(
                "approved {amount} {currency} at {} over {repayment_months} months",
                super::evaluation::format_rate_bps(*interest_rate_bps)
            ),
            LoanDecision::CounterOffer {
                requested,
                max_amount,
                interest_rate_bps,
            } => format!(
                "requested {requested} {currency} exceeds limit; up to {max_amount} {currency} at {}",
                super::evaluation::format_rate_bps(*interest_rate_bps)
            ),
            LoanDecision::Rejected { reason } => format!("rejected: {reason}"),
        }
    }
}

/// Screen a loan request. Requests above the tier limit get a counter offer
/// at the limit rather than a rejection.
pub fn screen_loan_request(
    report: &EligibilityReport,
    request: &LoanRequest,
) -> Result<LoanDecision, LoanRequestError> {
    request.validate()?;

    let result = &report.result;
    let interest_rate_bps = match result.interest_rate_bps {
        Some(rate) if result.is_eligible => rate,
        _ => {
            return Ok(LoanDecision::Rejected {
                reason: format!(
                    "credit score {} too low (minimum {} required)",
                    result.score,
                    super::evaluation::ELIGIBILITY_THRESHOLD
                ),
            })
        }
    };

    if result.max_loan_amount <= Decimal::ZERO {
        return Ok(LoanDecision::Rejected {
            reason: "no loan capacity at current score".to_string(),
        });
    }

    if request.amount <= result.max_loan_amount {
        Ok(LoanDecision::Approved {
            amount: request.amount,
            interest_rate_bps,
            repayment_months: request.repayment_months,
        })
    } else {
        Ok(LoanDecision::CounterOffer {
            requested: request.amount,
            max_amount: result.max_loan_amount,
            interest_rate_bps,
        })
    }
}
