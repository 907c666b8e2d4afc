mod cli;
mod demo;
mod infra;
mod report;
mod routes;
mod server;

use eduledger::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
