use async_trait::async_trait;

use super::{Component, IntoNode, Node};
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::Meta;

/// Ordered sequence of children
///
/// A group only scopes and sequences its children. A suite is terminal: once
/// its children are done it cancels its subtree and drains every background
/// task forked beneath it before returning.
#[derive(Debug, Clone)]
pub struct Composite {
    name: String,
    meta: Meta,
    children: Vec<Node>,
    terminal: bool,
}

impl Composite {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Meta::new(),
            children: Vec::new(),
            terminal: false,
        }
    }

    pub fn suite(name: impl Into<String>) -> Self {
        Self {
            terminal: true,
            ..Self::group(name)
        }
    }

    pub fn run(mut self, child: impl IntoNode) -> Self {
        self.children.push(child.into_node());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = self.meta.merge(&meta);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[async_trait]
impl Component for Composite {
    fn name(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> Meta {
        self.meta.clone()
    }

    fn children(&self) -> Vec<Node> {
        self.children.clone()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError> {
        for child in &self.children {
            if e.evaluate(child).await.is_err() || e.has_error() {
                break;
            }
        }

        if self.terminal {
            e.stop();
            e.wait().await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Task;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(name: &str, counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Task::new(name, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_group_stops_at_first_failure() {
        let a = Arc::new(AtomicUsize::new(0));
        let c = Arc::new(AtomicUsize::new(0));

        let node = Composite::group("g")
            .run(counting("a", &a))
            .run(Task::new("b", |_| anyhow::bail!("b failed")))
            .run(counting("c", &c))
            .into_node();

        let mut e = Evaluator::new();
        let _ = e.evaluate(&node).await;

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(c.load(Ordering::SeqCst), 0);
        assert_eq!(e.errors().len(), 1);
        assert_eq!(e.errors()[0].path(), "/g/b");
    }

    #[tokio::test]
    async fn test_suite_is_terminal() {
        assert!(Composite::suite("s").is_terminal());
        assert!(!Composite::group("g").is_terminal());

        let node = Composite::suite("s").run(Task::noop("n")).into_node();
        let mut e = Evaluator::new();
        e.evaluate(&node).await.unwrap();
        assert!(!e.has_error());
        assert!(!e.is_cancelled());
    }
}
