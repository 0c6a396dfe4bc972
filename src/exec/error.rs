use thiserror::Error;

use crate::error::ErrorCode;

/// Failure of an external command
#[derive(Debug, Error)]
#[error("{program} {}: {message}", .args.join(" "))]
pub struct ExecError {
    code: u16,
    message: String,
    program: String,
    args: Vec<String>,
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

impl ExecError {
    pub fn spawn(program: &str, args: &[String], err: std::io::Error) -> Self {
        Self {
            code: ErrorCode::EXEC_SPAWN_FAILED,
            message: format!("can't execute: {err}"),
            program: program.to_string(),
            args: args.to_vec(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
        }
    }

    pub fn io(program: &str, args: &[String], err: std::io::Error) -> Self {
        Self {
            code: ErrorCode::EXEC_GENERIC,
            message: err.to_string(),
            ..Self::spawn(program, args, err)
        }
    }

    pub fn exit(
        program: &str,
        args: &[String],
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            code: ErrorCode::EXEC_NON_ZERO_EXIT,
            message: status.to_string(),
            program: program.to_string(),
            args: args.to_vec(),
            stdout,
            stderr,
            exit_code: status.code(),
        }
    }

    /// The command ran but its output was rejected
    pub fn output(
        program: &str,
        args: &[String],
        message: impl Into<String>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            code: ErrorCode::EXEC_OUTPUT_INVALID,
            message: message.into(),
            program: program.to_string(),
            args: args.to_vec(),
            stdout,
            stderr,
            exit_code: Some(0),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Captured output framed for display; `None` if the command never ran
    pub fn detail(&self) -> Option<String> {
        if self.code == ErrorCode::EXEC_SPAWN_FAILED {
            return None;
        }
        Some(format!(
            "-===[BEGIN STDOUT]===-\n{}\n-===[END STDOUT]===-\n\n-===[BEGIN STDERR]===-\n{}\n-===[END STDERR]===-\n",
            self.stdout, self.stderr
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_command() {
        let err = ExecError::output(
            "/bin/sh",
            &["-c".to_string(), "echo hi".to_string()],
            "invalid count have:0 want:1",
            "hi\n".to_string(),
            String::new(),
        );

        assert_eq!(err.to_string(), "/bin/sh -c echo hi: invalid count have:0 want:1");
        assert_eq!(err.code(), ErrorCode::EXEC_OUTPUT_INVALID);
    }

    #[test]
    fn test_detail_frames_output() {
        let err = ExecError::output("ls", &[], "bad", "out".to_string(), "err".to_string());
        let detail = err.detail().unwrap();

        assert!(detail.starts_with("-===[BEGIN STDOUT]===-\nout\n-===[END STDOUT]===-"));
        assert!(detail.contains("-===[BEGIN STDERR]===-\nerr\n-===[END STDERR]===-"));
    }

    #[test]
    fn test_spawn_failure_has_no_detail() {
        let err = ExecError::spawn(
            "missing",
            &[],
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.detail().is_none());
        assert!(err.to_string().contains("can't execute"));
    }
}
