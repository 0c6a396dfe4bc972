//! Per-scope evaluation state
//!
//! An [`Evaluator`] is one scope: the path of the node being evaluated, a
//! private copy of the variable store, a cancellation token derived from
//! the parent scope, the errors raised so far and the background tasks
//! still outstanding. [`Evaluator::evaluate`] derives a fresh scope for
//! each node and folds it back into the parent when the node finishes:
//! exported variables are copied up, errors are appended and background
//! tasks are handed to the parent so the nearest terminal boundary can
//! drain them.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use super::handler::{DirectHandler, EvalHandler};
use crate::component::Node;
use crate::error::{EvalError, TaskError, TrellisError};
use crate::traverse::node_path;
use crate::vars::{Meta, Vars};

/// A background task and the path it was forked at
struct Fork {
    path: String,
    handle: JoinHandle<Vec<EvalError>>,
}

pub struct Evaluator {
    path: String,
    vars: Vars,
    token: CancellationToken,
    errors: Vec<EvalError>,
    tasks: Vec<Fork>,
    handler: Arc<dyn EvalHandler>,
    root: Option<Node>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            vars: Vars::new(),
            token: CancellationToken::new(),
            errors: Vec::new(),
            tasks: Vec::new(),
            handler: Arc::new(DirectHandler),
            root: None,
        }
    }

    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn EvalHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut Vars {
        &mut self.vars
    }

    /// Bind a variable in this scope
    pub fn emit(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.put(key, value);
    }

    pub fn message(&self, msg: &str) {
        info!(path = %self.path, "{msg}");
    }

    /// Root of the tree being run, if started through [`Evaluator::run`]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this scope or any ancestor is stopped
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Cancel this scope and everything derived from it
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Wait for every background task registered with this scope
    pub async fn wait(&mut self) {
        while !self.tasks.is_empty() {
            let (paths, handles): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
                .into_iter()
                .map(|fork| (fork.path, fork.handle))
                .unzip();
            let joined = futures::future::join_all(handles).await;
            for (path, joined) in paths.into_iter().zip(joined) {
                match joined {
                    Ok(errors) => self.errors.extend(errors),
                    Err(err) if err.is_cancelled() => {}
                    Err(err) => {
                        error!(path = %path, "background task panicked");
                        self.errors
                            .push(EvalError::new(path, TaskError::Panicked(err.to_string())));
                    }
                }
            }
        }
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[EvalError] {
        &self.errors
    }

    /// Whether a debugger quit has been recorded in this scope
    pub fn has_quit(&self) -> bool {
        self.errors
            .iter()
            .any(|err| matches!(err.error(), TaskError::Quit))
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Evaluate `node` in a derived scope and fold the result back in
    pub async fn evaluate(&mut self, node: &Node) -> Result<(), EvalError> {
        let meta = node.meta();
        let mut scope = self.derive(node, &meta, Arc::clone(&self.handler));
        let visible = !node.is_pass_through();

        if visible {
            debug!(path = %scope.path, "start");
        }

        let handler = Arc::clone(&scope.handler);
        let result = handler.eval(&mut scope, node).await;
        let result = scope.settle(result);

        if visible && result.is_ok() {
            debug!(path = %scope.path, "complete");
        }

        meta.export_to(&scope.vars, &mut self.vars);
        self.errors.append(&mut scope.errors);
        self.tasks.append(&mut scope.tasks);

        result
    }

    /// Evaluate `node` concurrently, registered with this scope's wait-set
    ///
    /// The forked scope always uses the direct handler and its errors only
    /// surface when an owning scope calls [`Evaluator::wait`].
    pub fn fork(&mut self, node: &Node) {
        let meta = node.meta();
        let mut scope = self.derive(node, &meta, Arc::new(DirectHandler));
        let node = Arc::clone(node);
        let path = scope.path.clone();
        let span = info_span!("background", path = %path);

        let handle = tokio::spawn(
            async move {
                debug!("forked");
                let handler = Arc::clone(&scope.handler);
                let result = handler.eval(&mut scope, &node).await;
                let _ = scope.settle(result);
                scope.wait().await;
                scope.errors
            }
            .instrument(span),
        );

        self.tasks.push(Fork { path, handle });
    }

    /// Evaluate `root`, then cancel and drain everything still running
    pub async fn run(&mut self, root: &Node) -> Result<(), TrellisError> {
        self.root = Some(Arc::clone(root));

        let _ = self.evaluate(root).await;
        self.stop();
        self.wait().await;

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(TrellisError::Evaluation {
                failures: self.errors.clone(),
            })
        }
    }

    fn derive(&self, node: &Node, meta: &Meta, handler: Arc<dyn EvalHandler>) -> Evaluator {
        let mut vars = Vars::new();
        vars.merge(&self.vars);
        meta.apply_defaults(&mut vars);

        Evaluator {
            path: node_path(&self.path, node.as_ref()),
            vars,
            token: self.token.child_token(),
            errors: Vec::new(),
            tasks: Vec::new(),
            handler,
            root: self.root.clone(),
        }
    }

    /// Attach the node's own failure to this scope unless it is benign
    fn settle(&mut self, result: Result<(), TaskError>) -> Result<(), EvalError> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let benign = err.is_benign() || self.token.is_cancelled();
        let err = EvalError::new(self.path.clone(), err);

        if benign {
            debug!(path = %self.path, error = %err.error(), "ignoring failure after cancellation");
        } else {
            error!(path = %self.path, error = %err.error(), "failed");
            self.errors.push(err.clone());
        }

        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Composite, IntoNode, Task, Wrap};
    use std::time::Duration;

    #[tokio::test]
    async fn test_paths_follow_non_pass_through_nodes() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = |name: &str| {
            let seen = Arc::clone(&seen);
            Task::new(name, move |e| {
                seen.lock().unwrap().push(e.path().to_string());
                Ok(())
            })
        };

        let node = Composite::group("root")
            .run(record("a"))
            .run(Wrap::ignore().run(record("b")))
            .run(Composite::group("inner").run(record("c")))
            .into_node();

        let mut e = Evaluator::new();
        e.evaluate(&node).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/root/a", "/root/b", "/root/inner/c"]
        );
    }

    #[tokio::test]
    async fn test_defaults_apply_without_overriding() {
        let node = Task::new("check", |e| {
            assert_eq!(e.vars().get("bound"), Some("parent"));
            assert_eq!(e.vars().get("fallback"), Some("default"));
            Ok(())
        })
        .with_meta(
            Meta::new()
                .with_default("bound", "default")
                .with_default("fallback", "default"),
        )
        .into_node();

        let mut e = Evaluator::new().with_vars(Vars::from_iter([("bound", "parent")]));
        e.evaluate(&node).await.unwrap();
        assert!(!e.vars().has("fallback"));
    }

    #[tokio::test]
    async fn test_cancelled_failure_is_benign() {
        let node = Task::from_async("wait", |e| {
            Box::pin(async move {
                e.cancelled().await;
                anyhow::bail!("interrupted")
            })
        })
        .into_node();

        let mut e = Evaluator::new();
        e.stop();
        assert!(e.evaluate(&node).await.is_err());
        assert!(!e.has_error());
    }

    #[tokio::test]
    async fn test_run_collects_background_failures() {
        let node = Composite::group("g")
            .run(Wrap::background().run(Task::new("bg", |_| anyhow::bail!("bg failed"))))
            .run(Task::from_async("pause", |_| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(())
                })
            }))
            .into_node();

        let mut e = Evaluator::new();
        let err = e.run(&node).await.unwrap_err();

        match err {
            TrellisError::Evaluation { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].path(), "/g/bg");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wait_drains_nested_forks() {
        let node = Composite::suite("s")
            .run(Wrap::background().run(
                Composite::group("outer").run(Wrap::background().run(Task::from_async(
                    "sleep",
                    |_| {
                        Box::pin(async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            anyhow::bail!("late failure")
                        })
                    },
                ))),
            ))
            .into_node();

        let mut e = Evaluator::new();
        let _ = e.evaluate(&node).await;

        assert!(e.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_panicked_fork_reported_at_its_path() {
        let node = Composite::group("g")
            .run(Wrap::background().run(Task::new("boom", |_| panic!("kaboom"))))
            .into_node();

        let mut e = Evaluator::new();
        e.evaluate(&node).await.unwrap();
        e.wait().await;

        assert_eq!(e.errors().len(), 1);
        assert_eq!(e.errors()[0].path(), "/g/boom");
        assert!(matches!(e.errors()[0].error(), TaskError::Panicked(_)));
    }
}
