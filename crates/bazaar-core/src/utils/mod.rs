//! Utility functions for display formatting.

pub mod format;

pub use format::{format_bytes, format_date, format_money, truncate_string};
