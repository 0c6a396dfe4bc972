//! Static variable-availability check
//!
//! Walks the tree without running it and reports every required variable
//! that nothing earlier in the walk produces. Scoping mirrors the
//! evaluator: a subtree sees everything resolved above it, defaults are
//! always available, and only exports flow back to the parent once a node
//! has been left.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::component::{Component, Node};
use crate::traverse::{traverse, Traverser};
use crate::vars::Vars;

/// A required variable with no producer earlier in the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub path: String,
    pub name: String,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.path, self.name)
    }
}

pub fn validate(root: &Node) -> Vec<Unresolved> {
    validate_with(root, &Vars::new())
}

pub fn validate_with(root: &Node, vars: &Vars) -> Vec<Unresolved> {
    let mut validator = Validator {
        top: vars.keys().map(str::to_string).collect(),
        stack: Vec::new(),
        unresolved: Vec::new(),
    };
    traverse(root, &mut validator);
    validator.unresolved
}

struct Validator {
    top: BTreeSet<String>,
    stack: Vec<BTreeSet<String>>,
    unresolved: Vec<Unresolved>,
}

impl Traverser for Validator {
    fn push(&mut self, path: &str, node: &dyn Component) {
        let meta = node.meta();
        let mut resolved = self.top.clone();

        resolved.extend(meta.defaults().keys().cloned());

        for name in meta.requires() {
            if !resolved.contains(name) {
                self.unresolved.push(Unresolved {
                    path: path.to_string(),
                    name: name.clone(),
                });
                resolved.insert(name.clone());
            }
        }

        let parent = std::mem::replace(&mut self.top, resolved);
        self.stack.push(parent);
    }

    fn pop(&mut self, _path: &str, node: &dyn Component) {
        if let Some(parent) = self.stack.pop() {
            self.top = parent;
        }
        self.top.extend(node.meta().exports().iter().cloned());
    }
}
