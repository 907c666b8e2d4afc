use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DEFAULT_POINTS_PER_LOAN_UNIT: u16 = 100;
const DEFAULT_CURRENCY: &str = "ETH";

/// Loan sizing convention applied on top of the tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Score points that earn one unit of base loan currency.
    pub points_per_loan_unit: u16,
    pub currency: String,
}

impl EvaluationConfig {
    /// Base loan unit for a score (one unit per `points_per_loan_unit` points).
    pub fn base_loan_unit(&self, score: u16) -> Decimal {
        if self.points_per_loan_unit == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(score) / Decimal::from(self.points_per_loan_unit)
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            points_per_loan_unit: DEFAULT_POINTS_PER_LOAN_UNIT,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
