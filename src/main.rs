//! Secure Chain CLI entry point

use clap::Parser;
use securechain::cli::{Cli, Commands};
use securechain::i18n::localize_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_env("SECURECHAIN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let lang = cli.lang;

    let result = match cli.command {
        Commands::Serve(args) => securechain::cli::serve::run(args).await,
        Commands::Op(args) => securechain::cli::op::run(args).await,
        Commands::Package(args) => securechain::cli::package::run(args).await,
        Commands::Vex(args) => securechain::cli::vex::run(args).await,
    };

    if let Err(e) = result {
        eprintln!(
            "\x1b[31m>\x1b[0m {}",
            localize_error(lang, e.code(), &e.message())
        );
        std::process::exit(1);
    }
}
