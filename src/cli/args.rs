//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Evaluate trees of operational checks and tasks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree as an indented outline
    Show {
        /// Tree definition file (YAML)
        file: PathBuf,
    },

    /// Evaluate the tree
    Eval {
        /// Tree definition file (YAML)
        file: PathBuf,

        /// Set an initial variable
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Pause before nodes whose path ends with PATTERN
        #[arg(long = "break", value_name = "PATTERN")]
        breakpoints: Vec<String>,

        /// Pause after failures of nodes whose path ends with PATTERN
        #[arg(long = "fail", value_name = "PATTERN")]
        failpoints: Vec<String>,
    },

    /// Report variables that are required but never provided
    Validate {
        /// Tree definition file (YAML)
        file: PathBuf,

        /// Set an initial variable
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_eval_flags() {
        let cli = Cli::try_parse_from([
            "trellis", "-vv", "eval", "tree.yml", "-s", "host=a", "--set", "port=80", "--break",
            "deploy", "--fail", "health",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Eval {
                file,
                set,
                breakpoints,
                failpoints,
            } => {
                assert_eq!(file, PathBuf::from("tree.yml"));
                assert_eq!(set, vec!["host=a", "port=80"]);
                assert_eq!(breakpoints, vec!["deploy"]);
                assert_eq!(failpoints, vec!["health"]);
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["trellis", "show"]).is_err());
    }
}
