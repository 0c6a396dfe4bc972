//! Scoped tree evaluation

pub mod evaluator;
pub mod handler;

pub use evaluator::Evaluator;
pub use handler::{DirectHandler, EvalHandler};
