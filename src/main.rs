mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use docflow::{api, worker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Api(args) => api::run(args.address, args.ledger_path).await?,
        Commands::Worker(args) => worker::run(args.ledger_path, args.queue_path).await?,
    }

    Ok(())
}
