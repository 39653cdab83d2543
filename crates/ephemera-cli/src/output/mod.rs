//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying notes
//! as JSON or as human-readable text.

mod json;
mod text;

// Re-export public API
pub use json::print_json;
pub use text::{
    print_account_stats, print_disclosed, print_note_list, print_status, print_summary,
};
