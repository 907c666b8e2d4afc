//! Student credit-score and loan-eligibility estimation over the EduLedger
//! credential registry.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
