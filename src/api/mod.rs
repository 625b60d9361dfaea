//! HTTP client module for the remote user directory.
//!
//! This module provides the `ApiClient` for fetching the user list from
//! the fixed remote endpoint, plus the pure client-side name filter.

pub mod client;
pub mod error;

pub use client::{filter_by_name, ApiClient};
pub use error::ApiError;
