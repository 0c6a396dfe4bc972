//! Record pipelines over captured stdout
//!
//! A pipeline parses output into records, runs filter and assertion
//! stages over them, and finishes by binding fields as variables:
//!
//! ```ignore
//! Cmd::sh("list", "docker ps", ["--format", "'{{.Names}} {{.Status}}'"])
//!     .with_output(columns(["name", "status"]).grep_field("name", "{{app}}").ensure_count(1).capture(["status"]))
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::OutputFn;
use crate::error::TaskError;
use crate::eval::Evaluator;
use crate::vars::expand;

/// One parsed line of output
pub type Record = BTreeMap<String, String>;

type ParseFn = Arc<dyn Fn(&str, &Evaluator) -> Result<Vec<Record>, TaskError> + Send + Sync>;
type StageFn =
    Arc<dyn Fn(Vec<Record>, &Evaluator) -> Result<Vec<Record>, TaskError> + Send + Sync>;

#[derive(Clone)]
pub struct ObjectPipe {
    parse: ParseFn,
    stages: Vec<StageFn>,
}

/// Split each line on whitespace and name the fields positionally
pub fn columns<I, S>(names: I) -> ObjectPipe
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    line_parser(move |line, _| {
        Ok(names
            .iter()
            .zip(line.split_whitespace())
            .map(|(name, field)| (name.clone(), field.to_string()))
            .collect())
    })
}

/// Split each line once on `sep` into a `key` and a `value` field
///
/// Lines without the separator are skipped.
pub fn kv(sep: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> ObjectPipe {
    let (sep, key, value) = (sep.into(), key.into(), value.into());
    ObjectPipe {
        parse: Arc::new(move |text: &str, _: &Evaluator| -> Result<Vec<Record>, TaskError> {
            Ok(text
                .lines()
                .filter_map(|line| line.split_once(sep.as_str()))
                .map(|(k, v)| {
                    Record::from([
                        (key.clone(), k.trim().to_string()),
                        (value.clone(), v.trim().to_string()),
                    ])
                })
                .collect())
        }),
        stages: Vec::new(),
    }
}

/// Parse each line with `parse`
pub fn line_parser<F>(parse: F) -> ObjectPipe
where
    F: Fn(&str, &Evaluator) -> Result<Record, TaskError> + Send + Sync + 'static,
{
    ObjectPipe {
        parse: Arc::new(move |text: &str, e: &Evaluator| -> Result<Vec<Record>, TaskError> {
            text.lines().map(|line| parse(line, e)).collect()
        }),
        stages: Vec::new(),
    }
}

impl ObjectPipe {
    fn then<F>(mut self, stage: F) -> Self
    where
        F: Fn(Vec<Record>, &Evaluator) -> Result<Vec<Record>, TaskError> + Send + Sync + 'static,
    {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Keep records whose `field` equals `value` after variable expansion
    pub fn grep_field(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let (field, value) = (field.into(), value.into());
        self.grep_with(move |record, e| {
            record
                .get(&field)
                .is_some_and(|v| *v == expand(e.vars(), &value))
        })
    }

    pub fn grep_with<F>(self, keep: F) -> Self
    where
        F: Fn(&Record, &Evaluator) -> bool + Send + Sync + 'static,
    {
        self.then(move |records, e| Ok(records.into_iter().filter(|r| keep(r, e)).collect()))
    }

    pub fn ensure_count(self, count: usize) -> Self {
        self.ensure_with(move |records| {
            if records.len() != count {
                return Err(TaskError::execution(format!(
                    "invalid count have:{} want:{}",
                    records.len(),
                    count
                )));
            }
            Ok(())
        })
    }

    pub fn ensure_with<F>(self, check: F) -> Self
    where
        F: Fn(&[Record]) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        self.then(move |records, _| {
            check(&records)?;
            Ok(records)
        })
    }

    pub fn process(&self, text: &str, e: &Evaluator) -> Result<Vec<Record>, TaskError> {
        let mut records = (self.parse)(text, e)?;
        for stage in &self.stages {
            records = stage(records, e)?;
        }
        Ok(records)
    }

    /// Bind the listed fields of every surviving record
    pub fn capture<I, S>(self, keys: I) -> OutputFn
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Arc::new(move |text: &str, e: &mut Evaluator| -> Result<(), TaskError> {
            for record in self.process(text, e)? {
                for key in &keys {
                    if let Some(value) = record.get(key) {
                        e.emit(key.clone(), value.clone());
                    }
                }
            }
            Ok(())
        })
    }

    /// Bind every field of every surviving record
    pub fn capture_all(self) -> OutputFn {
        Arc::new(move |text: &str, e: &mut Evaluator| -> Result<(), TaskError> {
            for record in self.process(text, e)? {
                for (key, value) in record {
                    e.emit(key, value);
                }
            }
            Ok(())
        })
    }
}
