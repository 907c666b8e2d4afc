pub mod eligibility;
pub mod fixture;
pub mod roster;
