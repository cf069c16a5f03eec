use anyhow::Result;
use byteforge::cli::Cli;
use byteforge::commands;
use clap::Parser;

fn main() -> Result<()> {
    // Parse first so --verbose can pick the default filter
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "byteforge=debug"
    } else {
        "byteforge=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    commands::execute(cli)
}
