mod config;
mod policy;
mod rules;

pub use config::EvaluationConfig;
pub use policy::{evaluate, format_rate_bps, EligibilityResult, Tier, ELIGIBILITY_THRESHOLD};

use super::domain::StudentSignals;
use serde::{Deserialize, Serialize};

/// Upper bound of the credit score scale.
pub const MAX_SCORE: u16 = 850;

/// Score bucket contributing to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Credentials,
    Admission,
    AcademicPerformance,
    ProfileCompleteness,
}

impl ScoreFactor {
    pub const ALL: [ScoreFactor; 4] = [
        ScoreFactor::Credentials,
        ScoreFactor::Admission,
        ScoreFactor::AcademicPerformance,
        ScoreFactor::ProfileCompleteness,
    ];

    pub fn cap(&self) -> u16 {
        match self {
            ScoreFactor::Credentials => 340,
            ScoreFactor::Admission => 250,
            ScoreFactor::AcademicPerformance => 200,
            ScoreFactor::ProfileCompleteness => 150,
        }
    }

    /// Share of the 850 scale the bucket represents.
    pub fn weight_percent(&self) -> u16 {
        match self {
            ScoreFactor::Credentials => 40,
            ScoreFactor::Admission => 25,
            ScoreFactor::AcademicPerformance => 20,
            ScoreFactor::ProfileCompleteness => 15,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreFactor::Credentials => "Academic Credentials",
            ScoreFactor::Admission => "Admission Status",
            ScoreFactor::AcademicPerformance => "Academic Performance",
            ScoreFactor::ProfileCompleteness => "Profile Completeness",
        }
    }
}

/// Discrete contribution to a recomputed score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: u16,
    pub notes: String,
}

/// Points per bucket plus the clamped total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub credentials_points: u16,
    pub admission_points: u16,
    pub academic_points: u16,
    pub profile_points: u16,
    pub total: u16,
}

impl ScoreBreakdown {
    /// Estimates buckets for a score computed elsewhere as
    /// `min(total * weight, cap)`. `total` stays authoritative.
    pub fn apportion(total: u16) -> Self {
        let total = total.min(MAX_SCORE);
        let share = |factor: ScoreFactor| {
            let scaled = (u32::from(total) * u32::from(factor.weight_percent()) + 50) / 100;
            // scaled <= 850 * 40 / 100, always fits in u16
            (scaled as u16).min(factor.cap())
        };

        Self {
            credentials_points: share(ScoreFactor::Credentials),
            admission_points: share(ScoreFactor::Admission),
            academic_points: share(ScoreFactor::AcademicPerformance),
            profile_points: share(ScoreFactor::ProfileCompleteness),
            total,
        }
    }

    pub fn points_for(&self, factor: ScoreFactor) -> u16 {
        match factor {
            ScoreFactor::Credentials => self.credentials_points,
            ScoreFactor::Admission => self.admission_points,
            ScoreFactor::AcademicPerformance => self.academic_points,
            ScoreFactor::ProfileCompleteness => self.profile_points,
        }
    }

    /// Unclamped sum of the four buckets.
    pub fn bucket_sum(&self) -> u16 {
        ScoreFactor::ALL
            .iter()
            .map(|factor| self.points_for(*factor))
            .sum()
    }
}

/// Computes the fallback credit score from ledger signals.
pub fn compute_score(signals: &StudentSignals) -> ScoreBreakdown {
    rules::score_signals(signals).1
}

/// Stateless engine pairing the score calculator with the tier policy.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: EvaluationConfig,
}

impl EligibilityEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn score(&self, signals: &StudentSignals) -> EvaluationOutcome {
        let (components, breakdown) = rules::score_signals(signals);
        let result = self.assess(breakdown.total);

        EvaluationOutcome {
            breakdown,
            components,
            result,
        }
    }

    /// Tier terms for a score, with the base loan unit taken from config.
    pub fn assess(&self, score: u16) -> EligibilityResult {
        evaluate(score, self.config.base_loan_unit(score))
    }
}

/// Recomputed score with its audit trail and tier decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub breakdown: ScoreBreakdown,
    pub components: Vec<ScoreComponent>,
    pub result: EligibilityResult,
}
