//! Utility functions for string comparison and formatting.

pub mod format;

pub use format::{contains_ignore_case, truncate};
