use crate::cli::LedgerArgs;
use crate::infra::{build_service, load_ledger, resolve_ledger_source};
use crate::report::render_report;
use clap::Args;
use eduledger::config::AppConfig;
use eduledger::error::AppError;
use eduledger::telemetry;
use eduledger::workflows::eligibility::{screen_loan_request, LoanRequest};
use rust_decimal::Decimal;
use std::sync::Arc;

const RECOMPUTED_STUDENT: &str = "0xf6b90589c42ff5bf7a61f67174de09c45fc32338";
const PRECOMPUTED_STUDENT: &str = "0x9c1f3e5a7b2d4c6e8f0a1b3c5d7e9f1a2b4c6d8e";
const DEGRADED_STUDENT: &str = "0x2a4c6e8f0b1d3f5a7c9e1b3d5f7a9c1e3b5d7f9a";
const BELOW_THRESHOLD_STUDENT: &str = "0x61b9fbf168e3447be375cd24e321bf8efa42bd68";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) ledger: LedgerArgs,
    /// Loan amount requested in the screening step
    #[arg(long, default_value_t = Decimal::new(12, 0))]
    pub(crate) loan_amount: Decimal,
    /// Skip the loan screening portion of the demo.
    #[arg(long)]
    pub(crate) skip_loan: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        ledger: ledger_args,
        loan_amount,
        skip_loan,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let source = resolve_ledger_source(&ledger_args, &config);
    let ledger = Arc::new(load_ledger(&source)?);
    let service = build_service(&config, ledger.clone());

    println!("EduLedger eligibility demo ({source})");
    println!(
        "Advisory timeout {}s | {} points per {} of base loan",
        config.eligibility.advisory_timeout.as_secs(),
        config.eligibility.points_per_loan_unit,
        config.eligibility.currency
    );

    let walkthrough = [
        ("Ledger already holds a score", PRECOMPUTED_STUDENT),
        ("Score rebuilt from credentials", RECOMPUTED_STUDENT),
        ("Profile query fails mid-evaluation", DEGRADED_STUDENT),
        ("Below the eligibility threshold", BELOW_THRESHOLD_STUDENT),
        ("Malformed wallet address", "0xnot-a-wallet"),
    ];
    for (title, subject) in walkthrough {
        println!("\n{title}");
        match service.evaluate(subject).await {
            Ok(report) => render_report(&report),
            Err(err) => println!("  Rejected: {err}"),
        }
    }

    println!("\nLedger connection lost");
    ledger.set_online(false);
    match service.evaluate(RECOMPUTED_STUDENT).await {
        Ok(report) => println!("  Unexpected result: {}", report.summary()),
        Err(err) => println!("  {err}"),
    }
    ledger.set_online(true);

    if skip_loan {
        return Ok(());
    }

    println!("\nLoan screening");
    let request = LoanRequest {
        amount: loan_amount,
        purpose: "Tuition for the autumn semester".to_string(),
        repayment_months: 24,
    };
    let subjects = [RECOMPUTED_STUDENT, PRECOMPUTED_STUDENT, BELOW_THRESHOLD_STUDENT];
    for (subject, result) in subjects
        .iter()
        .zip(service.evaluate_many(&subjects).await)
    {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                println!("- {subject}: evaluation unavailable ({err})");
                continue;
            }
        };
        match screen_loan_request(&report, &request) {
            Ok(decision) => println!(
                "- {subject} [{} {}]: {}",
                report.result.tier,
                report.result.score,
                decision.summary(&report.currency)
            ),
            Err(err) => println!("- {subject}: request invalid ({err})"),
        }
    }

    Ok(())
}
