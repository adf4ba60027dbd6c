//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.

mod import;

pub use import::{debug_requested, env_vars, first_env, run_import};
