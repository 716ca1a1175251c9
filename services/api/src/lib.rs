mod cli;
mod infra;
mod optimize;
mod routes;
mod server;

use subsidy_optimizer::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
