//! Running external commands as tree leaves

pub mod command;
pub mod error;
pub mod pipeline;
pub mod text;

pub use command::{Cmd, OutputFn};
pub use error::ExecError;
pub use pipeline::{columns, kv, line_parser, ObjectPipe, Record};
pub use text::{text, TextPipe};
