//! Application-level utilities for the Ephemera CLI.
//!
//! This module provides:
//! - Path resolution for config and database files
//! - Server key loading and key file management
//! - The per-invocation context that opens the engines

mod context;
mod key;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use key::{read_key_file, write_key_file};
pub use resolver::resolve_config_path;
