use crate::demo::{run_demo, DemoArgs};
use crate::report::{run_batch, run_evaluate, run_score, BatchArgs, EvaluateArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use eduledger::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "EduLedger Eligibility",
    about = "Estimate student credit scores and loan eligibility from ledger credentials",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one student address against the ledger
    Evaluate(EvaluateArgs),
    /// Score signals supplied on the command line without touching the ledger
    Score(ScoreArgs),
    /// Evaluate every student in a CSV roster concurrently
    Batch(BatchArgs),
    /// Walk through precomputed, recomputed, degraded and rejected evaluations
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) ledger: LedgerArgs,
}

/// Ledger source shared by commands that read student data.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct LedgerArgs {
    /// JSON ledger snapshot; falls back to LEDGER_FIXTURE, then the bundled sample
    #[arg(long = "ledger-fixture", value_name = "PATH")]
    pub(crate) fixture: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Score(args) => run_score(args),
        Command::Batch(args) => run_batch(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
