//! Local snapshot cache.
//!
//! This module provides the `SnapshotCache` for storing the most recent
//! successfully fetched user list as a single JSON blob under one fixed
//! key. Writing replaces the prior snapshot entirely; there is no expiry
//! and no partial update.

pub mod snapshot;

pub use snapshot::{CacheError, CachedData, SnapshotCache};
