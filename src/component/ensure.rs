use async_trait::async_trait;

use super::{Component, IntoNode, Node};
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::Meta;

/// Setup, body and guaranteed cleanup
///
/// `first` gates everything: when it fails nothing else runs. Otherwise the
/// `run` steps execute in order up to the first failure and `finally` runs
/// regardless of how they went.
#[derive(Debug, Clone)]
pub struct Ensure {
    name: String,
    meta: Meta,
    first: Option<Node>,
    run: Vec<Node>,
    finally: Option<Node>,
}

impl Ensure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Meta::new(),
            first: None,
            run: Vec::new(),
            finally: None,
        }
    }

    pub fn first(mut self, step: impl IntoNode) -> Self {
        self.first = Some(step.into_node());
        self
    }

    pub fn run(mut self, step: impl IntoNode) -> Self {
        self.run.push(step.into_node());
        self
    }

    pub fn finally(mut self, step: impl IntoNode) -> Self {
        self.finally = Some(step.into_node());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = self.meta.merge(&meta);
        self
    }
}

#[async_trait]
impl Component for Ensure {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_pass_through(&self) -> bool {
        true
    }

    fn meta(&self) -> Meta {
        let metas: Vec<Meta> = self.children().iter().map(|c| c.meta()).collect();
        self.meta.merge(&Meta::sequence(&metas))
    }

    fn children(&self) -> Vec<Node> {
        self.first
            .iter()
            .chain(self.run.iter())
            .chain(self.finally.iter())
            .cloned()
            .collect()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError> {
        if let Some(first) = &self.first {
            if e.evaluate(first).await.is_err() || e.has_error() {
                return Ok(());
            }
        }

        for step in &self.run {
            if e.evaluate(step).await.is_err() || e.has_error() {
                break;
            }
        }

        if let Some(finally) = &self.finally {
            let _ = e.evaluate(finally).await;
        }

        Ok(())
    }
}
