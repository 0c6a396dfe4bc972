use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::DefinitionError;
use crate::component::{Composite, Ensure, IntoNode, Node, Task, Wrap};
use crate::exec::{columns, kv, Cmd, ObjectPipe, OutputFn};
use crate::vars::Meta;

fn default_tries() -> u32 {
    3
}

fn default_delay() -> Duration {
    crate::component::wrap::DEFAULT_RETRY_DELAY
}

/// One node of a tree definition, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDef {
    Suite {
        name: String,
        #[serde(default)]
        meta: Meta,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    Group {
        name: String,
        #[serde(default)]
        meta: Meta,
        #[serde(default)]
        children: Vec<NodeDef>,
    },
    Noop {
        name: String,
        #[serde(default)]
        meta: Meta,
    },
    Sh {
        name: String,
        cmd: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        meta: Meta,
        capture: Option<CaptureDef>,
    },
    Exec {
        name: String,
        path: String,
        #[serde(default)]
        args: Vec<String>,
        dir: Option<String>,
        #[serde(default)]
        meta: Meta,
        capture: Option<CaptureDef>,
    },
    Retry {
        #[serde(default = "default_tries")]
        tries: u32,
        #[serde(default = "default_delay", with = "humantime_serde")]
        delay: Duration,
        #[serde(default)]
        meta: Meta,
        child: Box<NodeDef>,
    },
    Background {
        #[serde(default)]
        meta: Meta,
        child: Box<NodeDef>,
    },
    Ignore {
        #[serde(default)]
        meta: Meta,
        child: Box<NodeDef>,
    },
    Ensure {
        name: String,
        #[serde(default)]
        meta: Meta,
        first: Option<Box<NodeDef>>,
        #[serde(default)]
        run: Vec<NodeDef>,
        finally: Option<Box<NodeDef>>,
    },
}

/// Output pipeline attached to `sh` and `exec` nodes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureDef {
    #[serde(default)]
    pub columns: Vec<String>,
    pub kv: Option<KvDef>,
    #[serde(default)]
    pub grep: BTreeMap<String, String>,
    pub count: Option<usize>,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KvDef {
    #[serde(default = "KvDef::default_sep")]
    pub sep: String,
    #[serde(default = "KvDef::default_key")]
    pub key: String,
    #[serde(default = "KvDef::default_value")]
    pub value: String,
}

impl KvDef {
    fn default_sep() -> String {
        "=".to_string()
    }

    fn default_key() -> String {
        "key".to_string()
    }

    fn default_value() -> String {
        "value".to_string()
    }
}

impl CaptureDef {
    fn build(&self) -> Result<OutputFn, DefinitionError> {
        let mut pipe: ObjectPipe = match (&self.kv, self.columns.is_empty()) {
            (Some(kv_def), true) => kv(&kv_def.sep, &kv_def.key, &kv_def.value),
            (None, false) => columns(&self.columns),
            (Some(_), false) => {
                return Err(DefinitionError::Invalid(
                    "capture takes either columns or kv, not both".to_string(),
                ))
            }
            (None, true) => {
                return Err(DefinitionError::Invalid(
                    "capture needs columns or kv".to_string(),
                ))
            }
        };

        for (field, value) in &self.grep {
            pipe = pipe.grep_field(field, value);
        }
        if let Some(count) = self.count {
            pipe = pipe.ensure_count(count);
        }

        if self.all {
            Ok(pipe.capture_all())
        } else if self.keys.is_empty() {
            Err(DefinitionError::Invalid(
                "capture needs keys or all: true".to_string(),
            ))
        } else {
            Ok(pipe.capture(&self.keys))
        }
    }
}

fn named(name: &str) -> Result<(), DefinitionError> {
    if name.trim().is_empty() {
        return Err(DefinitionError::Invalid("node name must not be empty".to_string()));
    }
    Ok(())
}

fn with_capture(cmd: Cmd, capture: &Option<CaptureDef>) -> Result<Cmd, DefinitionError> {
    match capture {
        Some(capture) => Ok(cmd.with_output(capture.build()?)),
        None => Ok(cmd),
    }
}

impl NodeDef {
    /// Turn the definition into a runnable tree
    pub fn build(&self) -> Result<Node, DefinitionError> {
        let node = match self {
            Self::Suite {
                name,
                meta,
                children,
            }
            | Self::Group {
                name,
                meta,
                children,
            } => {
                named(name)?;
                let mut composite = if matches!(self, Self::Suite { .. }) {
                    Composite::suite(name)
                } else {
                    Composite::group(name)
                };
                for child in children {
                    composite = composite.run(child.build()?);
                }
                composite.with_meta(meta.clone()).into_node()
            }
            Self::Noop { name, meta } => {
                named(name)?;
                Task::noop(name).with_meta(meta.clone()).into_node()
            }
            Self::Sh {
                name,
                cmd,
                args,
                meta,
                capture,
            } => {
                named(name)?;
                with_capture(Cmd::sh(name, cmd, args), capture)?
                    .with_meta(meta.clone())
                    .into_node()
            }
            Self::Exec {
                name,
                path,
                args,
                dir,
                meta,
                capture,
            } => {
                named(name)?;
                let mut cmd = Cmd::new(name, path, args);
                if let Some(dir) = dir {
                    cmd = cmd.dir(dir);
                }
                with_capture(cmd, capture)?
                    .with_meta(meta.clone())
                    .into_node()
            }
            Self::Retry {
                tries,
                delay,
                meta,
                child,
            } => Wrap::retry(*tries, *delay)
                .run(child.build()?)
                .with_meta(meta.clone())
                .into_node(),
            Self::Background { meta, child } => Wrap::background()
                .run(child.build()?)
                .with_meta(meta.clone())
                .into_node(),
            Self::Ignore { meta, child } => Wrap::ignore()
                .run(child.build()?)
                .with_meta(meta.clone())
                .into_node(),
            Self::Ensure {
                name,
                meta,
                first,
                run,
                finally,
            } => {
                named(name)?;
                let mut ensure = Ensure::new(name).with_meta(meta.clone());
                if let Some(first) = first {
                    ensure = ensure.first(first.build()?);
                }
                for step in run {
                    ensure = ensure.run(step.build()?);
                }
                if let Some(finally) = finally {
                    ensure = ensure.finally(finally.build()?);
                }
                ensure.into_node()
            }
        };

        Ok(node)
    }
}
