use clap::Parser;
use trellis::app::{handle_fatal_error, init_logging, AppConfig};
use trellis::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = AppConfig::new(cli.verbose);
    init_logging(&config);

    if let Err(e) = execute_command(cli.command, config).await {
        handle_fatal_error(e, cli.verbose);
    }
}
