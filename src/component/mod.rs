//! Component tree
//!
//! Every node in a task tree implements [`Component`]. Leaves run a single
//! action, composites run an ordered list of children, and wrappers decide
//! how and whether to run the steps they hold. Wrappers are pass-through:
//! they never add a segment to the evaluation path.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::Meta;

pub mod composite;
pub mod ensure;
pub mod leaf;
pub mod wrap;

pub use composite::Composite;
pub use ensure::Ensure;
pub use leaf::Task;
pub use wrap::{Wrap, WrapKind};

/// Shared handle to a node in a task tree
pub type Node = Arc<dyn Component>;

#[async_trait]
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    /// Pass-through nodes reuse their parent's path
    fn is_pass_through(&self) -> bool {
        false
    }

    /// Variable contract, including whatever a wrapper inherits from its children
    fn meta(&self) -> Meta;

    /// Children in evaluation order
    fn children(&self) -> Vec<Node> {
        Vec::new()
    }

    async fn eval(&self, e: &mut Evaluator) -> Result<(), TaskError>;
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("pass_through", &self.is_pass_through())
            .finish()
    }
}

/// Conversion into a shared [`Node`]
pub trait IntoNode {
    fn into_node(self) -> Node;
}

impl<C: Component + 'static> IntoNode for C {
    fn into_node(self) -> Node {
        Arc::new(self)
    }
}

impl IntoNode for Node {
    fn into_node(self) -> Node {
        self
    }
}
