//! Depth-first tree walks
//!
//! The dumper, the validator and path listing all walk the tree here, using
//! the same path rule as the evaluator.

use crate::component::{Component, Node};

/// Path of `node` when evaluated beneath `base`
pub fn node_path(base: &str, node: &dyn Component) -> String {
    if node.is_pass_through() {
        base.to_string()
    } else {
        format!("{base}/{}", node.name())
    }
}

/// Visitor notified on entering and leaving each node
pub trait Traverser {
    fn push(&mut self, path: &str, node: &dyn Component);
    fn pop(&mut self, path: &str, node: &dyn Component);
}

pub fn traverse<T: Traverser + ?Sized>(root: &Node, visitor: &mut T) {
    walk(root, "", visitor);
}

fn walk<T: Traverser + ?Sized>(node: &Node, base: &str, visitor: &mut T) {
    let path = node_path(base, node.as_ref());
    visitor.push(&path, node.as_ref());
    for child in node.children() {
        walk(&child, &path, visitor);
    }
    visitor.pop(&path, node.as_ref());
}

#[derive(Default)]
struct Dumper {
    depth: usize,
    out: String,
}

impl Traverser for Dumper {
    fn push(&mut self, _path: &str, node: &dyn Component) {
        let indent = self.depth * 2 + 1;
        self.out
            .push_str(&format!("{:indent$}- {}\n", "", node.name()));
        self.depth += 1;
    }

    fn pop(&mut self, _path: &str, _node: &dyn Component) {
        self.depth -= 1;
    }
}

/// Indented outline of the tree, one node per line
pub fn dump(root: &Node) -> String {
    let mut dumper = Dumper::default();
    traverse(root, &mut dumper);
    dumper.out
}

struct PathLister(Vec<String>);

impl Traverser for PathLister {
    fn push(&mut self, path: &str, node: &dyn Component) {
        if !node.is_pass_through() {
            self.0.push(path.to_string());
        }
    }

    fn pop(&mut self, _path: &str, _node: &dyn Component) {}
}

/// Paths of every node that contributes a path segment, in walk order
pub fn paths(root: &Node) -> Vec<String> {
    let mut lister = PathLister(Vec::new());
    traverse(root, &mut lister);
    lister.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Composite, Ensure, IntoNode, Task, Wrap};
    use std::time::Duration;

    fn sample() -> Node {
        Composite::suite("root")
            .run(Task::noop("a"))
            .run(Wrap::retry(3, Duration::ZERO).run(Task::noop("b")))
            .run(
                Ensure::new("cleanup")
                    .first(Task::noop("up"))
                    .finally(Task::noop("down")),
            )
            .into_node()
    }

    #[test]
    fn test_dump() {
        let expected = concat!(
            " - root\n",
            "   - a\n",
            "   - retry\n",
            "     - b\n",
            "   - cleanup\n",
            "     - up\n",
            "     - down\n",
        );
        assert_eq!(dump(&sample()), expected);
    }

    #[test]
    fn test_dump_is_idempotent() {
        let root = sample();
        assert_eq!(dump(&root), dump(&root));
    }

    #[test]
    fn test_paths_skip_pass_through() {
        assert_eq!(
            paths(&sample()),
            vec!["/root", "/root/a", "/root/b", "/root/up", "/root/down"]
        );
    }
}
