//! Command handlers

pub mod eval;
pub mod show;
pub mod validate;
