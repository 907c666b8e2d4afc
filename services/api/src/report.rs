use crate::cli::LedgerArgs;
use crate::infra::{build_service, load_ledger, resolve_ledger_source};
use chrono::Local;
use clap::Args;
use eduledger::config::AppConfig;
use eduledger::error::AppError;
use eduledger::telemetry;
use eduledger::workflows::eligibility::{
    format_rate_bps, AdmissionStatus, EligibilityEngine, EligibilityReport, EvaluationOutcome,
    ScoreBreakdown, ScoreFactor, ScoreSource, StudentSignals,
};
use eduledger::workflows::roster::load_roster;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Student wallet address (0x followed by 40 hex digits)
    pub(crate) subject: String,
    #[command(flatten)]
    pub(crate) ledger: LedgerArgs,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Number of issued credentials
    #[arg(long, default_value_t = 0)]
    pub(crate) credentials: u32,
    /// Admission status: none, pending or verified
    #[arg(long, default_value = "none")]
    pub(crate) admission: AdmissionStatus,
    /// Profile has both email and identification number
    #[arg(long)]
    pub(crate) profile_complete: bool,
    /// Print the outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV roster with a `subject_id` column and optional `label`
    #[arg(long)]
    pub(crate) roster: PathBuf,
    #[command(flatten)]
    pub(crate) ledger: LedgerArgs,
    /// Print results as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    subject_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a EligibilityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let source = resolve_ledger_source(&args.ledger, &config);
    let service = build_service(&config, Arc::new(load_ledger(&source)?));
    let report = service.evaluate(&args.subject).await?;

    if args.json {
        print_json(&report);
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = EligibilityEngine::new(config.eligibility.evaluation());

    let signals = StudentSignals::from_raw(
        args.profile_complete,
        i64::from(args.credentials),
        args.admission,
    );
    let outcome = engine.score(&signals);

    if args.json {
        print_json(&outcome);
    } else {
        render_outcome(&outcome, &engine.config().currency);
    }
    Ok(())
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let roster = load_roster(&args.roster)?;
    let source = resolve_ledger_source(&args.ledger, &config);
    let service = build_service(&config, Arc::new(load_ledger(&source)?));

    let subjects: Vec<&str> = roster.iter().map(|row| row.subject_id.as_str()).collect();
    let results = service.evaluate_many(&subjects).await;

    let rows: Vec<BatchRow<'_>> = roster
        .iter()
        .zip(results.iter())
        .map(|(entry, result)| BatchRow {
            subject_id: &entry.subject_id,
            label: entry.label.as_deref(),
            report: result.as_ref().ok(),
            error: result.as_ref().err().map(|err| err.to_string()),
        })
        .collect();

    if args.json {
        print_json(&rows);
        return Ok(());
    }

    let eligible = rows
        .iter()
        .filter(|row| row.report.is_some_and(|report| report.result.is_eligible))
        .count();
    println!(
        "Roster {}: {} students, {} eligible, {} failed",
        args.roster.display(),
        rows.len(),
        eligible,
        rows.iter().filter(|row| row.error.is_some()).count()
    );
    for row in &rows {
        let name = row.label.unwrap_or(row.subject_id);
        match (row.report, &row.error) {
            (Some(report), _) => println!("- {name}: {}", report.summary()),
            (None, Some(err)) => println!("- {name}: {err}"),
            (None, None) => println!("- {name}: no result"),
        }
    }
    Ok(())
}

pub(crate) fn render_report(report: &EligibilityReport) {
    println!("Subject {}", report.subject);
    let source = match report.source {
        ScoreSource::Precomputed => "ledger eligibility record",
        ScoreSource::LedgerScore => "ledger credit score",
        ScoreSource::Recomputed => "recomputed from ledger signals",
    };
    println!(
        "  Credit score {} ({}) via {}",
        report.result.score, report.result.tier, source
    );
    render_breakdown(&report.breakdown);
    if report.result.is_eligible {
        println!(
            "  Interest rate {} | max loan {} {}",
            report.result.interest_rate_text(),
            report.result.max_loan_amount,
            report.currency
        );
    } else {
        println!("  Not eligible for a loan");
    }
    if let Some(terms) = &report.ledger_terms {
        println!(
            "  Ledger terms: {} | rate {} | max loan {} {}",
            if terms.is_eligible { "eligible" } else { "not eligible" },
            format_rate_bps(terms.interest_rate_bps),
            terms.max_loan_amount,
            report.currency
        );
    }
    for degraded in &report.degraded {
        println!(
            "  Degraded signal: {} ({})",
            degraded.signal, degraded.reason
        );
    }
    if let Some(updated) = report.ledger_updated_at {
        println!("  Ledger score updated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    println!(
        "  Evaluated {}",
        report
            .evaluated_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
}

fn render_outcome(outcome: &EvaluationOutcome, currency: &str) {
    println!("Credit score {} ({})", outcome.result.score, outcome.result.tier);
    for component in &outcome.components {
        println!(
            "  - {}: {} ({})",
            component.factor.label(),
            component.points,
            component.notes
        );
    }
    if outcome.result.is_eligible {
        println!(
            "  Interest rate {} | max loan {} {}",
            outcome.result.interest_rate_text(),
            outcome.result.max_loan_amount,
            currency
        );
    } else {
        println!("  {}", outcome.result.summary());
    }
}

fn render_breakdown(breakdown: &ScoreBreakdown) {
    let parts: Vec<String> = ScoreFactor::ALL
        .iter()
        .map(|factor| format!("{} {}", factor.label(), breakdown.points_for(*factor)))
        .collect();
    println!("  Breakdown: {}", parts.join(" | "));
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("JSON output unavailable: {err}"),
    }
}
