use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

use super::Component;
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::Meta;

type SyncAction = dyn Fn(&mut Evaluator) -> anyhow::Result<()> + Send + Sync;
type AsyncAction =
    dyn for<'a> Fn(&'a mut Evaluator) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync;

#[derive(Clone)]
enum Action {
    Noop,
    Sync(Arc<SyncAction>),
    Async(Arc<AsyncAction>),
}

/// Leaf node wrapping a user-supplied action
#[derive(Clone)]
pub struct Task {
    name: String,
    meta: Meta,
    action: Action,
}

impl Task {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Evaluator) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            meta: Meta::new(),
            action: Action::Sync(Arc::new(action)),
        }
    }

    /// Leaf whose action suspends, e.g. on I/O or cancellation
    pub fn from_async<F>(name: impl Into<String>, action: F) -> Self
    where
        F: for<'a> Fn(&'a mut Evaluator) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            meta: Meta::new(),
            action: Action::Async(Arc::new(action)),
        }
    }

    pub fn noop(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Meta::new(),
            action: Action::Noop,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = self.meta.merge(&meta);
        self
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Component for Task {
    fn name(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> Meta {
        self.meta.clone()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError> {
        match &self.action {
            Action::Noop => Ok(()),
            Action::Sync(action) => action(e).map_err(TaskError::from),
            Action::Async(action) => action(e).await.map_err(TaskError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::IntoNode;

    #[tokio::test]
    async fn test_task_emits_into_scope() {
        let node = Task::new("emit", |e| {
            e.emit("a", "foo");
            Ok(())
        })
        .with_meta(Meta::new().export(["a"]))
        .into_node();

        let mut e = Evaluator::new();
        e.evaluate(&node).await.unwrap();

        assert_eq!(e.vars().get("a"), Some("foo"));
    }

    #[tokio::test]
    async fn test_task_error_is_recorded_with_path() {
        let node = Task::new("fail", |_| anyhow::bail!("boom")).into_node();

        let mut e = Evaluator::new();
        let err = e.evaluate(&node).await.unwrap_err();

        assert_eq!(err.to_string(), "/fail: boom");
        assert!(e.has_error());
        assert_eq!(e.errors()[0].path(), "/fail");
    }

    #[tokio::test]
    async fn test_async_task() {
        let node = Task::from_async("async", |e| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                e.emit("done", "yes");
                Ok(())
            })
        })
        .with_meta(Meta::new().export(["done"]))
        .into_node();

        let mut e = Evaluator::new();
        e.evaluate(&node).await.unwrap();

        assert_eq!(e.vars().get("done"), Some("yes"));
    }

    #[test]
    fn test_with_meta_merges() {
        let task = Task::noop("n")
            .with_meta(Meta::new().require(["a"]))
            .with_meta(Meta::new().export(["b"]));

        assert_eq!(task.meta().requires(), &["a".to_string()]);
        assert_eq!(task.meta().exports(), &["b".to_string()]);
    }
}
