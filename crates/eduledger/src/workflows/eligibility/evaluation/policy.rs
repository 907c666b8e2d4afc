use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::MAX_SCORE;

/// Minimum score for any loan offer.
pub const ELIGIBILITY_THRESHOLD: u16 = 600;

/// Credit tier. Ordering follows score, so `Excellent > Good > Fair > Poor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Tier {
    pub fn for_score(score: u16) -> Self {
        match score.min(MAX_SCORE) {
            750..=u16::MAX => Tier::Excellent,
            650..=749 => Tier::Good,
            600..=649 => Tier::Fair,
            _ => Tier::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Poor => "Poor",
            Tier::Fair => "Fair",
            Tier::Good => "Good",
            Tier::Excellent => "Excellent",
        }
    }

    pub fn is_eligible(&self) -> bool {
        !matches!(self, Tier::Poor)
    }

    pub fn interest_rate_bps(&self) -> Option<u32> {
        match self {
            Tier::Excellent => Some(500),
            Tier::Good => Some(800),
            Tier::Fair => Some(1200),
            Tier::Poor => None,
        }
    }

    pub fn max_loan_multiplier(&self) -> Decimal {
        match self {
            Tier::Excellent => dec!(2.0),
            Tier::Good => dec!(1.5),
            Tier::Fair => dec!(1.0),
            Tier::Poor => Decimal::ZERO,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision derived from a score; carries no state beyond its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub score: u16,
    pub tier: Tier,
    pub is_eligible: bool,
    pub interest_rate_bps: Option<u32>,
    pub max_loan_multiplier: Decimal,
    pub max_loan_amount: Decimal,
}

impl EligibilityResult {
    pub fn interest_rate_text(&self) -> String {
        self.interest_rate_bps
            .map(format_rate_bps)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn summary(&self) -> String {
        if self.is_eligible {
            format!(
                "{} ({}): eligible at {}, up to {}x base loan",
                self.tier,
                self.score,
                self.interest_rate_text(),
                self.max_loan_multiplier.normalize()
            )
        } else {
            format!(
                "{} ({}): not eligible, minimum score is {}",
                self.tier, self.score, ELIGIBILITY_THRESHOLD
            )
        }
    }
}

/// Map a score onto its tier terms. Scores above 850 are treated as 850.
pub fn evaluate(score: u16, base_loan_unit: Decimal) -> EligibilityResult {
    let score = score.min(MAX_SCORE);
    let tier = Tier::for_score(score);
    let max_loan_multiplier = tier.max_loan_multiplier();
    let base_loan_unit = base_loan_unit.max(Decimal::ZERO);

    EligibilityResult {
        score,
        tier,
        is_eligible: tier.is_eligible(),
        interest_rate_bps: tier.interest_rate_bps(),
        max_loan_multiplier,
        max_loan_amount: (base_loan_unit * max_loan_multiplier).normalize(),
    }
}

/// Renders basis points as a percentage, e.g. `500` -> `5%`, `1250` -> `12.5%`.
pub fn format_rate_bps(bps: u32) -> String {
    format!("{}%", Decimal::new(i64::from(bps), 2).normalize())
}
