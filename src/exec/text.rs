use std::sync::Arc;

use super::OutputFn;
use crate::error::TaskError;
use crate::eval::Evaluator;

type TextStage = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Plain-text pipeline that binds the first line's fields positionally
#[derive(Clone, Default)]
pub struct TextPipe {
    stages: Vec<TextStage>,
}

pub fn text() -> TextPipe {
    TextPipe::default()
}

impl TextPipe {
    /// Keep only the first line
    pub fn head(mut self) -> Self {
        self.stages.push(Arc::new(|text: &str| {
            text.lines().next().unwrap_or_default().to_string()
        }));
        self
    }

    pub fn process(&self, text: &str) -> String {
        self.stages
            .iter()
            .fold(text.to_string(), |acc, stage| stage(&acc))
    }

    /// Bind whitespace-separated fields of the first line to `keys` in order;
    /// a key named `_` skips its field
    pub fn capture<I, S>(self, keys: I) -> OutputFn
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Arc::new(move |output: &str, e: &mut Evaluator| -> Result<(), TaskError> {
            let processed = self.process(output);
            let line = processed.lines().next().unwrap_or_default();
            for (key, field) in keys.iter().zip(line.split_whitespace()) {
                if key != "_" {
                    e.emit(key.clone(), field);
                }
            }
            Ok(())
        })
    }
}
