use async_trait::async_trait;

use super::Evaluator;
use crate::component::Node;
use crate::error::TaskError;

/// Strategy the evaluator delegates each node invocation to
///
/// The default strategy calls the node directly. An interactive debugger
/// plugs in here to pause before or after a node runs.
#[async_trait]
pub trait EvalHandler: Send + Sync {
    async fn eval(&self, e: &mut Evaluator, node: &Node) -> Result<(), TaskError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DirectHandler;

#[async_trait]
impl EvalHandler for DirectHandler {
    async fn eval(&self, e: &mut Evaluator, node: &Node) -> Result<(), TaskError> {
        node.eval(e).await
    }
}
