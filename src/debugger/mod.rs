//! Interactive breakpoint and failpoint debugger
//!
//! [`Debugger`] is an [`EvalHandler`]: the evaluator hands it every node
//! and it decides whether to stop and prompt before the node runs (a
//! breakpoint or a pending interrupt) or after it fails (a failpoint).
//! Patterns match path suffixes, so `b deploy` stops at `/suite/deploy`.

use async_trait::async_trait;
use ::console::style;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;
use tracing::debug;

pub mod command;

use self::command::{ConsoleCommand, ErrorsAction, PointAction, VarsAction};
use crate::component::Node;
use crate::error::TaskError;
use crate::eval::{EvalHandler, Evaluator};
use crate::traverse::paths;
use crate::vars::Vars;

type Input = Box<dyn AsyncBufRead + Send + Unpin>;
type Output = Box<dyn Write + Send>;

pub struct Debugger {
    state: Mutex<State>,
    interrupts: AtomicU32,
}

struct State {
    breakpoints: Vec<String>,
    failpoints: Vec<String>,
    input: Input,
    output: Output,
    quitting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Breakpoint,
    Interrupt,
    Failpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Continue,
    Retry,
    Quit,
}

impl Debugger {
    pub fn new(input: Input, output: Output) -> Self {
        Self {
            state: Mutex::new(State {
                breakpoints: Vec::new(),
                failpoints: Vec::new(),
                input,
                output,
                quitting: false,
            }),
            interrupts: AtomicU32::new(0),
        }
    }

    /// Prompt on stdin, print to stdout
    pub fn stdio() -> Self {
        Self::new(
            Box::new(tokio::io::BufReader::new(tokio::io::stdin())),
            Box::new(std::io::stdout()),
        )
    }

    pub fn with_breakpoints(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.state.get_mut().breakpoints.extend(patterns);
        self
    }

    pub fn with_failpoints(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.state.get_mut().failpoints.extend(patterns);
        self
    }

    /// Stop before the next node that runs
    pub fn interrupt(&self) {
        let count = self.interrupts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(count, "debugger interrupt requested");
    }

    pub async fn breakpoints(&self) -> Vec<String> {
        self.state.lock().await.breakpoints.clone()
    }

    pub async fn failpoints(&self) -> Vec<String> {
        self.state.lock().await.failpoints.clone()
    }

    async fn stop_before(&self, path: &str) -> Option<Stop> {
        let state = self.state.lock().await;
        if state.quitting {
            return None;
        }
        if self.interrupts.swap(0, Ordering::SeqCst) > 0 {
            return Some(Stop::Interrupt);
        }
        matches(&state.breakpoints, path).then_some(Stop::Breakpoint)
    }

    async fn stop_after_failure(&self, path: &str) -> bool {
        let state = self.state.lock().await;
        !state.quitting && matches(&state.failpoints, path)
    }

    async fn prompt(
        &self,
        e: &mut Evaluator,
        stop: Stop,
        failure: Option<&TaskError>,
    ) -> Resume {
        let mut state = self.state.lock().await;
        state.announce(e, stop, failure);

        loop {
            state.write(format_args!("{} ", style(">").bold()));

            let mut line = String::new();
            match state.input.read_line(&mut line).await {
                Ok(0) | Err(_) => return Resume::Continue,
                Ok(_) => {}
            }

            let command = match command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    state.write(format_args!("{message}\n"));
                    continue;
                }
            };

            match command {
                ConsoleCommand::Continue => return Resume::Continue,
                ConsoleCommand::Retry if stop == Stop::Failpoint => return Resume::Retry,
                ConsoleCommand::Retry => {
                    state.write(format_args!(
                        "{}\n",
                        style("retry is only available at a failpoint").yellow()
                    ));
                }
                ConsoleCommand::Quit => {
                    state.quitting = true;
                    return Resume::Quit;
                }
                ConsoleCommand::Errors { action } => state.errors(e, action),
                ConsoleCommand::Vars { action } => state.vars(e.vars_mut(), action),
                ConsoleCommand::Breakpoint { action } => {
                    let State {
                        breakpoints, output, ..
                    } = &mut *state;
                    edit_points(output, "breakpoint", breakpoints, action);
                }
                ConsoleCommand::Failpoint { action } => {
                    let State {
                        failpoints, output, ..
                    } = &mut *state;
                    edit_points(output, "failpoint", failpoints, action);
                }
                ConsoleCommand::List => state.list(e),
            }
        }
    }
}

fn matches(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| path.ends_with(pattern.as_str()))
}

fn edit_points(
    output: &mut Output,
    kind: &str,
    points: &mut Vec<String>,
    action: Option<PointAction>,
) {
    match action.unwrap_or(PointAction::List) {
        PointAction::List => {
            for (idx, point) in points.iter().enumerate() {
                let _ = writeln!(output, "{idx:>3} {point}");
            }
        }
        PointAction::Add { patterns } => points.extend(patterns),
        PointAction::Del { mut indices } => {
            indices.sort_unstable();
            indices.dedup();
            for idx in indices.into_iter().rev() {
                if idx < points.len() {
                    points.remove(idx);
                } else {
                    let _ = writeln!(output, "{}", style(format!("no {kind} {idx}")).yellow());
                }
            }
        }
    }
}

impl State {
    fn write(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.output.write_fmt(args);
        let _ = self.output.flush();
    }

    fn announce(&mut self, e: &Evaluator, stop: Stop, failure: Option<&TaskError>) {
        let label = match stop {
            Stop::Breakpoint => style("breakpoint").cyan(),
            Stop::Interrupt => style("interrupt").cyan(),
            Stop::Failpoint => style("failpoint").red(),
        };
        self.write(format_args!("{label} at {}\n", style(e.path()).bold()));
        if let Some(failure) = failure {
            self.write(format_args!("{}\n", style(failure).red()));
        }
    }

    fn errors(&mut self, e: &mut Evaluator, action: Option<ErrorsAction>) {
        match action.unwrap_or(ErrorsAction::Show) {
            ErrorsAction::Show => {
                let reports: Vec<String> = e.errors().iter().map(|err| err.report()).collect();
                if reports.is_empty() {
                    self.write(format_args!("no errors\n"));
                }
                for report in reports {
                    self.write(format_args!("{}\n", style(report).red()));
                }
            }
            ErrorsAction::Clear => e.clear_errors(),
        }
    }

    fn vars(&mut self, vars: &mut Vars, action: Option<VarsAction>) {
        match action.unwrap_or(VarsAction::List) {
            VarsAction::List => {
                let listing = vars.to_string();
                self.write(format_args!("{listing}"));
            }
            VarsAction::Set { assignments } => {
                for entry in assignments {
                    match Vars::parse_assignment(&entry) {
                        Some((key, value)) => vars.put(key, value),
                        None => self.write(format_args!(
                            "{}\n",
                            style(format!("invalid assignment: {entry}")).yellow()
                        )),
                    }
                }
            }
            VarsAction::Unset { names } => {
                for name in names {
                    vars.unset(&name);
                }
            }
        }
    }

    fn list(&mut self, e: &Evaluator) {
        let Some(root) = e.root() else {
            self.write(format_args!("no tree loaded\n"));
            return;
        };

        for path in paths(root) {
            let current = if path == e.path() { "=>" } else { "  " };
            let bp = if matches(&self.breakpoints, &path) { "b" } else { " " };
            let fp = if matches(&self.failpoints, &path) { "f" } else { " " };
            self.write(format_args!("{current} {bp}{fp} {path}\n"));
        }
    }
}

#[async_trait]
impl EvalHandler for Debugger {
    async fn eval(&self, e: &mut Evaluator, node: &Node) -> Result<(), TaskError> {
        if node.is_pass_through() {
            return node.eval(e).await;
        }

        let path = e.path().to_string();

        if let Some(stop) = self.stop_before(&path).await {
            if self.prompt(e, stop, None).await == Resume::Quit {
                return Err(TaskError::Quit);
            }
        }

        loop {
            let result = node.eval(e).await;
            let failed = result.is_err() || e.has_error();

            if !failed || !self.stop_after_failure(&path).await {
                return result;
            }

            let failure = result.as_ref().err();
            match self.prompt(e, Stop::Failpoint, failure).await {
                Resume::Continue => return result,
                Resume::Quit => return Err(TaskError::Quit),
                Resume::Retry => {
                    debug!(path = %path, "retrying from failpoint");
                    e.clear_errors();
                }
            }
        }
    }
}
