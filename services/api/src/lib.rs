mod cli;
mod infra;
mod report;
mod routes;
mod server;

use impact_sim::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
