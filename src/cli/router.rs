//! Command routing

use anyhow::Result;

use crate::app::AppConfig;
use crate::cli::args::Commands;
use crate::cli::commands;

/// Dispatch a parsed command with the shared application config
pub async fn execute_command(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Show { file } => commands::show::run_show(&file),
        Commands::Eval {
            file,
            set,
            breakpoints,
            failpoints,
        } => {
            let config = config
                .with_assignments(&set)?
                .with_breakpoints(breakpoints)
                .with_failpoints(failpoints);
            commands::eval::run_eval(&file, &config).await
        }
        Commands::Validate { file, set, json } => {
            let config = config.with_assignments(&set)?;
            commands::validate::run_validate(&file, &config, json)
        }
    }
}
