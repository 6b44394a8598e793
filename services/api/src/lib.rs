mod cli;
mod infra;
mod report;
mod routes;
mod server;

use regional_gap::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
