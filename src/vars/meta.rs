//! Per-node variable contracts
//!
//! A [`Meta`] names the variables a node needs on entry, the variables it
//! hands back to its parent on exit, and the defaults it can supply itself.
//! It never holds runtime values.

use super::Vars;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Variable contract attached to a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    exports: Vec<String>,
    #[serde(default)]
    defaults: BTreeMap<String, String>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn export<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    pub fn is_empty(&self) -> bool {
        self.requires.is_empty() && self.exports.is_empty() && self.defaults.is_empty()
    }

    /// Concatenate requires and exports; defaults overlay with `other` winning
    pub fn merge(&self, other: &Meta) -> Meta {
        let mut defaults = self.defaults.clone();
        defaults.extend(
            other
                .defaults
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        Meta {
            requires: self
                .requires
                .iter()
                .chain(other.requires.iter())
                .cloned()
                .collect(),
            exports: self
                .exports
                .iter()
                .chain(other.exports.iter())
                .cloned()
                .collect(),
            defaults,
        }
    }

    /// Combine the contracts of steps that run one after another.
    ///
    /// A requirement satisfied by an earlier step's export is dropped, so a
    /// wrapper around `[producer, consumer]` only asks its parent for what
    /// the sequence cannot provide itself. For a single step this is the
    /// same as [`Meta::merge`].
    pub fn sequence<'a>(metas: impl IntoIterator<Item = &'a Meta>) -> Meta {
        let mut produced = BTreeSet::new();
        let mut combined = Meta::new();

        for meta in metas {
            let pending = meta
                .requires
                .iter()
                .filter(|key| !produced.contains(key.as_str()))
                .cloned();
            combined.requires.extend(pending);
            combined.exports.extend(meta.exports.iter().cloned());
            combined.defaults.extend(
                meta.defaults
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            produced.extend(meta.exports.iter().map(String::as_str));
        }

        combined
    }

    /// Fill in defaults for keys the store does not already bind
    pub fn apply_defaults(&self, vars: &mut Vars) {
        for (key, value) in &self.defaults {
            if !vars.has(key) {
                vars.put(key.clone(), value.clone());
            }
        }
    }

    /// Copy every exported key present in `from` into `to`
    pub fn export_to(&self, from: &Vars, to: &mut Vars) {
        for key in &self.exports {
            if let Some(value) = from.get(key) {
                to.put(key.clone(), value);
            }
        }
    }
}
