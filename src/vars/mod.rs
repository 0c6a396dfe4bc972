//! Variables, contracts and `{{name}}` templates

pub mod meta;
pub mod store;
pub mod template;

pub use meta::Meta;
pub use store::Vars;
pub use template::{expand, expand_all, extract, VarRef};
