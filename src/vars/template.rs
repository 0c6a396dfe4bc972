//! `{{name}}` substitution
//!
//! A single flat token form. Unknown names and unterminated braces are
//! left in place verbatim.

use super::Vars;
use std::fmt;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Expand every `{{name}}` token bound in `vars`
pub fn expand(vars: &Vars, template: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut current = template;

    while let Some(lidx) = current.find(OPEN) {
        result.push_str(&current[..lidx]);
        current = &current[lidx + OPEN.len()..];

        if let Some(ridx) = current.find(CLOSE).filter(|idx| *idx > 0) {
            if let Some(value) = vars.get(&current[..ridx]) {
                result.push_str(value);
                current = &current[ridx + CLOSE.len()..];
                continue;
            }
        }

        result.push_str(OPEN);
    }

    result.push_str(current);
    result
}

pub fn expand_all<S: AsRef<str>>(vars: &Vars, templates: &[S]) -> Vec<String> {
    templates
        .iter()
        .map(|template| expand(vars, template.as_ref()))
        .collect()
}

/// Names referenced by `{{name}}` tokens, in order of appearance
pub fn extract(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = template;

    while let Some(lidx) = current.find(OPEN) {
        current = &current[lidx + OPEN.len()..];
        if let Some(ridx) = current.find(CLOSE).filter(|idx| *idx > 0) {
            names.push(current[..ridx].to_string());
            current = &current[ridx + CLOSE.len()..];
        }
    }

    names
}

/// Named reference to a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef(String);

impl VarRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The `{{name}}` token for this variable
    pub fn var(&self) -> String {
        format!("{OPEN}{}{CLOSE}", self.0)
    }

    pub fn expand(&self, vars: &Vars) -> String {
        expand(vars, &self.var())
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
