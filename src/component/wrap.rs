use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Component, IntoNode, Node};
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::Meta;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How a [`Wrap`] invokes its child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapKind {
    /// Re-run the child until it succeeds, at most `tries` times
    Retry { tries: u32, delay: Duration },
    /// Fork the child and return immediately
    Background,
    /// Run the child and discard any failure
    Ignore,
}

impl WrapKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Retry { .. } => "retry",
            Self::Background => "background",
            Self::Ignore => "ignore",
        }
    }
}

/// Pass-through node around a single child
#[derive(Debug, Clone)]
pub struct Wrap {
    kind: WrapKind,
    meta: Meta,
    child: Option<Node>,
}

impl Wrap {
    pub fn new(kind: WrapKind) -> Self {
        Self {
            kind,
            meta: Meta::new(),
            child: None,
        }
    }

    /// A try count of zero is treated as one
    pub fn retry(tries: u32, delay: Duration) -> Self {
        Self::new(WrapKind::Retry {
            tries: tries.max(1),
            delay,
        })
    }

    pub fn background() -> Self {
        Self::new(WrapKind::Background)
    }

    pub fn ignore() -> Self {
        Self::new(WrapKind::Ignore)
    }

    pub fn run(mut self, child: impl IntoNode) -> Self {
        self.child = Some(child.into_node());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = self.meta.merge(&meta);
        self
    }

    pub fn kind(&self) -> WrapKind {
        self.kind
    }

    pub fn child(&self) -> Option<&Node> {
        self.child.as_ref()
    }

    async fn retry_child(
        &self,
        e: &mut Evaluator,
        child: &Node,
        tries: u32,
        delay: Duration,
    ) -> Result<(), TaskError> {
        for attempt in 1..=tries {
            if attempt > 1 {
                e.clear_errors();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = e.cancelled() => return Err(TaskError::Cancelled),
                }
            }

            let result = e.evaluate(child).await;
            if result.is_ok() && !e.has_error() {
                return Ok(());
            }
            // a recorded quit unwinds the enclosing composites
            if e.has_quit() {
                return Ok(());
            }
            if e.is_cancelled() {
                return Err(TaskError::Cancelled);
            }

            debug!(path = %e.path(), attempt, tries, "retrying after failure");
        }

        Err(TaskError::RetriesExhausted { attempts: tries })
    }
}

#[async_trait]
impl Component for Wrap {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn is_pass_through(&self) -> bool {
        true
    }

    fn meta(&self) -> Meta {
        match &self.child {
            Some(child) => self.meta.merge(&child.meta()),
            None => self.meta.clone(),
        }
    }

    fn children(&self) -> Vec<Node> {
        self.child.iter().cloned().collect()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError> {
        let Some(child) = &self.child else {
            return Ok(());
        };

        match self.kind {
            WrapKind::Retry { tries, delay } => self.retry_child(e, child, tries, delay).await,
            WrapKind::Background => {
                e.fork(child);
                Ok(())
            }
            WrapKind::Ignore => {
                let _ = e.evaluate(child).await;
                if !e.has_quit() {
                    e.clear_errors();
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Task;

    #[test]
    fn test_wrap_meta_includes_child() {
        let wrap = Wrap::ignore()
            .with_meta(Meta::new().require(["outer"]))
            .run(Task::noop("n").with_meta(Meta::new().export(["inner"])));

        let meta = wrap.meta();
        assert_eq!(meta.requires(), &["outer".to_string()]);
        assert_eq!(meta.exports(), &["inner".to_string()]);
    }

    #[test]
    fn test_retry_clamps_tries() {
        assert_eq!(
            Wrap::retry(0, Duration::ZERO).kind(),
            WrapKind::Retry {
                tries: 1,
                delay: Duration::ZERO
            }
        );
    }

    #[tokio::test]
    async fn test_ignore_swallows_failure() {
        let node = Wrap::ignore()
            .run(Task::new("fail", |_| anyhow::bail!("nope")))
            .into_node();

        let mut e = Evaluator::new();
        assert!(e.evaluate(&node).await.is_ok());
        assert!(!e.has_error());
    }

    #[tokio::test]
    async fn test_wrap_without_child_succeeds() {
        let node = Wrap::background().into_node();
        let mut e = Evaluator::new();
        assert!(e.evaluate(&node).await.is_ok());
        assert!(node.children().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_retry_delay() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let node = Wrap::retry(3, Duration::from_secs(10))
            .run(Task::new("down", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("unreachable")
            }))
            .into_node();

        let mut e = Evaluator::new();
        let token = e.cancellation_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let started = std::time::Instant::now();
        let err = e.evaluate(&node).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err.error(), TaskError::Cancelled));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!e.has_error(), "errors: {:?}", e.errors());
    }
}
