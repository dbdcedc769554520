use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(about = "docflow document pipeline CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingress API (accept tickets, serve job status)
    Api(ApiArgs),

    /// Run the pipeline worker pool
    Worker(WorkerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApiArgs {
    /// Address to bind the API server to
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub address: SocketAddr,

    /// Path to the Fjall ledger (result store) directory
    #[arg(long, default_value = "data/ledger")]
    pub ledger_path: String,
}

#[derive(clap::Args, Debug)]
pub struct WorkerArgs {
    /// Path to the Fjall ledger (result store) directory
    #[arg(long, default_value = "data/ledger")]
    pub ledger_path: String,

    /// Path to the Fjall queue (broker) directory
    #[arg(long, default_value = "data/queue")]
    pub queue_path: String,
}
