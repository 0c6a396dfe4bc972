use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

use crate::exec::ExecError;
use crate::validate::Unresolved;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of evaluating a single node
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{message}")]
    Execution {
        message: String,
        detail: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("cancelled")]
    Cancelled,

    #[error("quit")]
    Quit,

    #[error("background task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            detail: None,
            source: None,
        }
    }

    /// Attach diagnostic text shown below the message
    pub fn with_detail(mut self, text: impl Into<String>) -> Self {
        if let Self::Execution { detail, .. } = &mut self {
            *detail = Some(text.into());
        }
        self
    }

    pub fn with_source(mut self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        if let Self::Execution { source, .. } = &mut self {
            *source = Some(Box::new(err));
        }
        self
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Execution { .. } => ErrorCode::EXEC_GENERIC,
            Self::Exec(err) => err.code(),
            Self::RetriesExhausted { .. } => ErrorCode::EVAL_RETRIES_EXHAUSTED,
            Self::Cancelled => ErrorCode::EVAL_CANCELLED,
            Self::Quit => ErrorCode::EVAL_QUIT,
            Self::Panicked(_) => ErrorCode::EVAL_TASK_PANICKED,
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Execution { detail, .. } => detail.clone(),
            Self::Exec(err) => err.detail(),
            _ => None,
        }
    }

    /// Cancellation is expected when a scope is asked to stop
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<TaskError>() {
            Ok(task) => return task,
            Err(err) => err,
        };
        match err.downcast::<ExecError>() {
            Ok(exec) => Self::Exec(exec),
            Err(err) => Self::Execution {
                message: format!("{err:#}"),
                detail: None,
                source: Some(err.into()),
            },
        }
    }
}

/// A [`TaskError`] attached to the path of the node that raised it
#[derive(Debug, Clone)]
pub struct EvalError {
    path: String,
    error: Arc<TaskError>,
}

impl EvalError {
    pub fn new(path: impl Into<String>, error: TaskError) -> Self {
        Self {
            path: path.into(),
            error: Arc::new(error),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn error(&self) -> &TaskError {
        &self.error
    }

    pub fn detail(&self) -> Option<String> {
        self.error.detail()
    }

    /// Message followed by the diagnostic detail block, if any
    pub fn report(&self) -> String {
        match self.detail() {
            Some(detail) => format!("{self}\n{detail}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// Application-level error surfaced by the CLI
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("[E{code:04}] Definition error: {message}")]
    Definition {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("[E5005] Evaluation failed with {} error(s)", .failures.len())]
    Evaluation { failures: Vec<EvalError> },

    #[error("[E7001] {} unresolved variable(s)", .unresolved.len())]
    Validation { unresolved: Vec<Unresolved> },

    #[error("[E9001] Interrupted")]
    Interrupted,
}

impl TrellisError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn definition_with_code(
        code: u16,
        message: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        Self::Definition {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn with_source(mut self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        match &mut self {
            Self::Config { source, .. } | Self::Definition { source, .. } => {
                *source = Some(Box::new(err));
            }
            _ => {}
        }
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Definition { .. } => 2,
            Self::Evaluation { .. } => 5,
            Self::Validation { .. } => 8,
            Self::Interrupted => 130,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. } | Self::Definition { code, .. } => *code,
            Self::Evaluation { .. } => ErrorCode::EVAL_FAILED,
            Self::Validation { .. } => ErrorCode::VALIDATION_UNRESOLVED,
            Self::Interrupted => ErrorCode::OTHER_INTERRUPTED,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {message}"),
            Self::Definition { message, path, .. } => match path {
                Some(path) => format!("Invalid definition {}: {message}", path.display()),
                None => format!("Invalid definition: {message}"),
            },
            Self::Evaluation { failures } => {
                let mut out = format!("Evaluation failed ({} error(s)):", failures.len());
                for failure in failures {
                    out.push('\n');
                    out.push_str(&failure.report());
                }
                out
            }
            Self::Validation { unresolved } => {
                let mut out = format!("{} unresolved variable(s):", unresolved.len());
                for entry in unresolved {
                    out.push_str(&format!("\n  {entry}"));
                }
                out
            }
            Self::Interrupted => "Interrupted".to_string(),
        }
    }

    /// Message plus the full source chain
    pub fn developer_message(&self) -> String {
        let mut out = format!("{self}");
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            out.push_str(&format!("\n  caused by: {cause}"));
            current = cause.source();
        }
        if let Self::Evaluation { failures } = self {
            for failure in failures {
                out.push_str(&format!(
                    "\n  [E{:04}] {}",
                    failure.error().code(),
                    failure
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anyhow_conversion_keeps_task_errors() {
        let err: TaskError = anyhow::Error::new(TaskError::Cancelled).into();
        assert!(err.is_benign());

        let err: TaskError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TaskError::Execution { ref message, .. } if message == "boom"));
        assert!(!err.is_benign());
    }

    #[test]
    fn test_eval_error_display_and_detail() {
        let err = EvalError::new(
            "/root/step",
            TaskError::execution("failed").with_detail("line one"),
        );

        assert_eq!(err.to_string(), "/root/step: failed");
        assert_eq!(err.detail().as_deref(), Some("line one"));
        assert_eq!(err.report(), "/root/step: failed\nline one");

        let cloned = err.clone();
        assert_eq!(cloned.path(), "/root/step");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(TrellisError::config("bad").exit_code(), 2);
        assert_eq!(
            TrellisError::definition_with_code(ErrorCode::DEFINITION_INVALID_NODE, "x", None)
                .exit_code(),
            2
        );
        assert_eq!(
            TrellisError::Evaluation { failures: vec![] }.exit_code(),
            5
        );
        assert_eq!(
            TrellisError::Validation { unresolved: vec![] }.exit_code(),
            8
        );
    }

    #[test]
    fn test_config_error_message_format() {
        let err = TrellisError::config_with_code(ErrorCode::CONFIG_INVALID_VAR, "bad -s entry");
        assert_eq!(
            err.to_string(),
            "[E1001] Configuration error: bad -s entry"
        );
        assert_eq!(err.user_message(), "Configuration problem: bad -s entry");
    }

    #[test]
    fn test_retries_exhausted_message() {
        let err = TaskError::RetriesExhausted { attempts: 3 };
        assert_eq!(err.to_string(), "retries exhausted after 3 attempts");
        assert_eq!(err.code(), ErrorCode::EVAL_RETRIES_EXHAUSTED);
    }
}
