//! External command leaf

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::ExecError;
use crate::component::Component;
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::{expand, expand_all, Meta};

/// Consumer of a command's captured stdout
pub type OutputFn = Arc<dyn Fn(&str, &mut Evaluator) -> Result<(), TaskError> + Send + Sync>;

/// Leaf that runs an external program
///
/// `{{name}}` tokens in the program, arguments and working directory are
/// expanded against the scope's variables at evaluation time. The child is
/// killed if the scope is cancelled while it runs.
#[derive(Clone)]
pub struct Cmd {
    name: String,
    meta: Meta,
    program: String,
    args: Vec<String>,
    dir: Option<String>,
    output: Option<OutputFn>,
}

impl Cmd {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            meta: Meta::new(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            dir: None,
            output: None,
        }
    }

    /// `/bin/sh -c` with `cmd` and `args` joined by spaces
    pub fn sh<I, S>(name: impl Into<String>, cmd: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = std::iter::once(cmd.into())
            .chain(args.into_iter().map(Into::into))
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(name, "/bin/sh", ["-c".to_string(), script])
    }

    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Feed captured stdout through `output` once the command succeeds
    pub fn with_output(mut self, output: OutputFn) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = self.meta.merge(&meta);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Debug for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmd")
            .field("name", &self.name)
            .field("program", &self.program)
            .field("args", &self.args)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

async fn drain<R>(reader: Option<R>, path: &str, is_stderr: bool) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut captured = String::new();

    // Output is not required to be UTF-8; invalid bytes are replaced
    while reader.read_until(b'\n', &mut buf).await? > 0 {
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        if is_stderr {
            warn!(path = %path, "{line}");
        } else {
            debug!(path = %path, "{line}");
        }
        captured.push_str(line);
        captured.push('\n');
        buf.clear();
    }

    Ok(captured)
}

/// Kill the child and everything it started
///
/// Commands run in their own process group, so the whole group is
/// signalled before the direct child is reaped.
async fn kill_group(child: &mut Child, path: &str) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Err(err) = kill(Pid::from_raw(-(pid as i32)), Signal::SIGKILL) {
                debug!(path = %path, pid, error = %err, "failed to signal process group");
            }
        }
    }

    if let Err(err) = child.kill().await {
        debug!(path = %path, error = %err, "failed to kill command");
    }
}

#[async_trait]
impl Component for Cmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> Meta {
        self.meta.clone()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError> {
        let program = expand(e.vars(), &self.program);
        let args = expand_all(e.vars(), &self.args);
        let dir = self.dir.as_deref().map(|dir| expand(e.vars(), dir));

        e.message(&format!("running {} {}", program, args.join(" ")));

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            command.process_group(0);
        }
        if let Some(dir) = &dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|err| ExecError::spawn(&program, &args, err))?;

        let path = e.path().to_string();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let run = async {
            tokio::join!(
                drain(stdout_pipe, &path, false),
                drain(stderr_pipe, &path, true),
                child.wait()
            )
        };

        let finished = tokio::select! {
            finished = run => Some(finished),
            _ = e.cancelled() => None,
        };
        let Some((stdout, stderr, status)) = finished else {
            debug!(path = %path, program = %program, "killing command after cancellation");
            kill_group(&mut child, &path).await;
            return Err(TaskError::Cancelled);
        };

        let stdout = stdout.map_err(|err| ExecError::io(&program, &args, err))?;
        let stderr = stderr.map_err(|err| ExecError::io(&program, &args, err))?;
        let status = status.map_err(|err| ExecError::io(&program, &args, err))?;

        if !status.success() {
            return Err(ExecError::exit(&program, &args, status, stdout, stderr).into());
        }

        if let Some(output) = &self.output {
            if let Err(err) = output(&stdout, e) {
                return Err(ExecError::output(&program, &args, err.to_string(), stdout, stderr).into());
            }
        }

        Ok(())
    }
}
