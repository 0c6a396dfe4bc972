//! Application configuration
//!
//! Settings collected from the command line before a tree is loaded.

use crate::error::{ErrorCode, TrellisError};
use crate::vars::Vars;

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Initial variables from `-s name=value`
    pub vars: Vars,
    /// Path suffixes to pause before
    pub breakpoints: Vec<String>,
    /// Path suffixes to pause after a failure
    pub failpoints: Vec<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Parse `name=value` assignments into the initial variables
    ///
    /// A later assignment of the same name wins.
    pub fn with_assignments<S: AsRef<str>>(mut self, entries: &[S]) -> Result<Self, TrellisError> {
        for entry in entries {
            let entry = entry.as_ref();
            let (name, value) = Vars::parse_assignment(entry).ok_or_else(|| {
                TrellisError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VAR,
                    format!("invalid variable assignment '{entry}', expected name=value"),
                )
            })?;
            self.vars.put(name, value);
        }
        Ok(self)
    }

    pub fn with_breakpoints(mut self, patterns: Vec<String>) -> Self {
        self.breakpoints = patterns;
        self
    }

    pub fn with_failpoints(mut self, patterns: Vec<String>) -> Self {
        self.failpoints = patterns;
        self
    }

    /// Whether evaluation should run under the interactive debugger
    pub fn debugging(&self) -> bool {
        !self.breakpoints.is_empty() || !self.failpoints.is_empty()
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            vars: Vars::new(),
            breakpoints: Vec::new(),
            failpoints: Vec::new(),
        }
    }
}
