use crate::optimize::{run_optimize, OptimizeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use subsidy_optimizer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Subsidy Allocation Optimizer",
    about = "Select beneficiary and scheme pairs that maximise policy impact within a subsidy budget",
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
    /// Run one allocation over the eligibility results and write the outputs
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Optimize(args) => run_optimize(args),
    }
}
