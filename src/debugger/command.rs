//! Debugger command language

use clap::{Parser, Subcommand};

/// One line typed at the debugger prompt
#[derive(Debug, Parser)]
#[command(
    name = "debugger",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Resume evaluation
    #[command(alias = "c")]
    Continue,

    /// Run the failed node again
    #[command(alias = "r")]
    Retry,

    /// Abort the evaluation
    #[command(alias = "q")]
    Quit,

    /// Inspect or clear accumulated errors
    #[command(alias = "e")]
    Errors {
        #[command(subcommand)]
        action: Option<ErrorsAction>,
    },

    /// Inspect or change variables in the current scope
    #[command(alias = "v")]
    Vars {
        #[command(subcommand)]
        action: Option<VarsAction>,
    },

    /// Manage breakpoints
    #[command(alias = "b")]
    Breakpoint {
        #[command(subcommand)]
        action: Option<PointAction>,
    },

    /// Manage failpoints
    #[command(alias = "f")]
    Failpoint {
        #[command(subcommand)]
        action: Option<PointAction>,
    },

    /// List every node path
    #[command(alias = "l")]
    List,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ErrorsAction {
    Show,
    Clear,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum VarsAction {
    List,
    /// Bind `name=value` pairs
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    Unset {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum PointAction {
    List,
    /// Add path-suffix patterns
    Add {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Remove entries by index
    Del {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
}

/// Parse a prompt line; `Ok(None)` for a blank line
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let words = shell_words::split(line).map_err(|err| err.to_string())?;
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(parse("c").unwrap(), Some(ConsoleCommand::Continue));
        assert_eq!(parse("retry").unwrap(), Some(ConsoleCommand::Retry));
        assert_eq!(parse("q").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(parse("l").unwrap(), Some(ConsoleCommand::List));
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_nested_actions() {
        assert_eq!(
            parse("v set a=1 'b=two words'").unwrap(),
            Some(ConsoleCommand::Vars {
                action: Some(VarsAction::Set {
                    assignments: vec!["a=1".to_string(), "b=two words".to_string()]
                })
            })
        );
        assert_eq!(
            parse("b del 0 2").unwrap(),
            Some(ConsoleCommand::Breakpoint {
                action: Some(PointAction::Del {
                    indices: vec![0, 2]
                })
            })
        );
        assert_eq!(
            parse("e").unwrap(),
            Some(ConsoleCommand::Errors { action: None })
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse("frobnicate").is_err());
        assert!(parse("b del notanumber").is_err());
        assert!(parse("v set").is_err());
        assert!(parse("'unterminated").is_err());
    }
}
