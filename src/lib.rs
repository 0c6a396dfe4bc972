//! # Trellis
//!
//! Build trees of operational checks and tasks, validate their variable
//! contracts, and evaluate them with scoped variables, retries,
//! background work and an interactive debugger.
//!
//! ## Usage
//!
//! ```bash
//! trellis validate deploy.yml -s host=example.com
//! trellis eval deploy.yml -s host=example.com --fail health
//! ```
//!
//! ## Modules
//!
//! - `vars` - Variable store, meta contracts and `{{name}}` templates
//! - `component` - The node trait plus composite, wrapper and leaf nodes
//! - `eval` - Scoped evaluator and the handler seam
//! - `exec` - External commands and output pipelines
//! - `traverse` - Tree walking, paths and outline dumps
//! - `validate` - Static check that every required variable is provided
//! - `debugger` - Breakpoints, failpoints and the command console
//! - `definition` - YAML tree definitions
//! - `builder` - Short constructors for trees built in code
pub mod app;
pub mod builder;
pub mod cli;
pub mod component;
pub mod debugger;
pub mod definition;
pub mod error;
pub mod eval;
pub mod exec;
pub mod traverse;
pub mod util;
pub mod validate;
pub mod vars;

pub use component::{Component, IntoNode, Node};
pub use error::{EvalError, TaskError, TrellisError};
pub use eval::Evaluator;
pub use vars::{Meta, Vars};
