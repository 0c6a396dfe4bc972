//! Short constructors for assembling trees in code
//!
//! ```no_run
//! use trellis::builder::*;
//!
//! let tree = suite("deploy")
//!     .run(sh("build", "make", ["release"]))
//!     .run(retry(3).run(sh("health", "curl -sf", ["{{host}}/health"])))
//!     .with_meta(meta().require(["host"]));
//! ```

use crate::component::{Composite, Ensure, Task, Wrap};
use crate::eval::Evaluator;
use crate::exec::Cmd;
use crate::vars::Meta;

pub use crate::component::wrap::DEFAULT_RETRY_DELAY;
pub use crate::exec::{columns, kv, line_parser, text};

pub fn group(name: impl Into<String>) -> Composite {
    Composite::group(name)
}

pub fn suite(name: impl Into<String>) -> Composite {
    Composite::suite(name)
}

pub fn bg() -> Wrap {
    Wrap::background()
}

/// Retry with the default one second delay
pub fn retry(tries: u32) -> Wrap {
    Wrap::retry(tries, DEFAULT_RETRY_DELAY)
}

pub fn ignore() -> Wrap {
    Wrap::ignore()
}

pub fn ensure(name: impl Into<String>) -> Ensure {
    Ensure::new(name)
}

pub fn task<F>(name: impl Into<String>, action: F) -> Task
where
    F: Fn(&mut Evaluator) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Task::new(name, action)
}

pub fn noop(name: impl Into<String>) -> Task {
    Task::noop(name)
}

pub fn sh<I, S>(name: impl Into<String>, cmd: impl Into<String>, args: I) -> Cmd
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cmd::sh(name, cmd, args)
}

pub fn exec<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Cmd
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cmd::new(name, program, args)
}

pub fn meta() -> Meta {
    Meta::new()
}
