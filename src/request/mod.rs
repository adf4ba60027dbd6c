//! Scope resolution and update request assembly.

mod assembler;
mod scope;

pub use assembler::UpdateRequestAssembler;
pub use scope::{resolve_scope, ResolvedScope, Scope, DEFAULT_PRODUCT, SCOPE_DELIMITER};
