use clap::Parser;
use tracing_subscriber::EnvFilter;

use fuel_recon::cli::{self, Cli, Commands};
use fuel_recon::web;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("fuel_recon=debug,info")
        } else {
            EnvFilter::new("fuel_recon=warn")
        }
    });

    // Summaries go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Reconcile(args) => cli::reconcile::run(args, cli.format, cli.verbose),
        Commands::Serve(args) => web::server::run(args),
    }
}
