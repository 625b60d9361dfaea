use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::User;

/// Application name used for the cache directory path
const APP_NAME: &str = "profilecache";

/// The one file the snapshot lives in. Writing replaces it whole; there is
/// no versioning and no second key.
const SNAPSHOT_FILE: &str = "users.json";

#[derive(Error, Debug)]
pub enum CacheError {
    /// The snapshot could not be serialized or written to disk.
    #[error("failed to write snapshot: {0}")]
    Write(String),

    /// A snapshot file exists but could not be read back or parsed.
    /// A snapshot that was never written is not an error; `load` returns
    /// `Ok(None)` for that case.
    #[error("corrupt snapshot: {0}")]
    Read(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 0 {
            // Handle clock skew gracefully
            "just now".to_string()
        } else if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                // Round up: 1d 12h+ becomes 2d
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Persists the most recent successfully fetched user list as one
/// overwritten JSON snapshot under a fixed key.
pub struct SnapshotCache {
    cache_dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| CacheError::Write(e.to_string()))?;
        Ok(Self { cache_dir })
    }

    /// Platform cache directory for this application.
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    /// Serialize the full sequence and overwrite the stored snapshot.
    pub fn save(&self, users: &[User]) -> Result<(), CacheError> {
        let cached = CachedData::new(users);
        let contents =
            serde_json::to_string_pretty(&cached).map_err(|e| CacheError::Write(e.to_string()))?;
        std::fs::write(self.snapshot_path(), contents)
            .map_err(|e| CacheError::Write(e.to_string()))?;
        debug!(count = users.len(), "Snapshot written");
        Ok(())
    }

    /// Read back the stored snapshot, or `None` if one was never written.
    pub fn load(&self) -> Result<Option<CachedData<Vec<User>>>, CacheError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|e| CacheError::Read(e.to_string()))?;
        let cached: CachedData<Vec<User>> =
            serde_json::from_str(&contents).map_err(|e| CacheError::Read(e.to_string()))?;

        Ok(Some(cached))
    }

    /// Age of the stored snapshot for the status bar, if one exists and is
    /// readable.
    pub fn age(&self) -> Option<String> {
        match self.load() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Failed to load snapshot for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_cache() -> SnapshotCache {
        let dir = std::env::temp_dir().join(format!(
            "profilecache-test-{}-{}",
            std::process::id(),
            TEST_DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        SnapshotCache::new(dir).expect("Failed to create test cache dir")
    }

    fn sample_users() -> Vec<User> {
        vec![
            User {
                id: 1,
                name: "Leanne Graham".to_string(),
                email: "Sincere@april.biz".to_string(),
            },
            User {
                id: 2,
                name: "Ervin Howell".to_string(),
                email: "Shanna@melissa.tv".to_string(),
            },
        ]
    }

    #[test]
    fn test_save_load_round_trip_preserves_order() {
        let cache = test_cache();
        let users = sample_users();

        cache.save(&users).expect("Failed to save snapshot");
        let loaded = cache
            .load()
            .expect("Failed to load snapshot")
            .expect("Snapshot should exist after save");

        assert_eq!(loaded.data, users);
    }

    #[test]
    fn test_load_absent_is_none_not_error() {
        let cache = test_cache();
        let loaded = cache.load().expect("Absent snapshot should not error");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_overwrites_prior_snapshot() {
        let cache = test_cache();
        cache.save(&sample_users()).expect("Failed to save snapshot");

        let replacement = vec![User {
            id: 9,
            name: "Glenna Reichert".to_string(),
            email: "Chaim_McDermott@dana.io".to_string(),
        }];
        cache.save(&replacement).expect("Failed to overwrite snapshot");

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.data, replacement);
    }

    #[test]
    fn test_load_corrupt_is_read_error() {
        let cache = test_cache();
        std::fs::write(cache.snapshot_path(), "{not valid json").unwrap();

        match cache.load() {
            Err(CacheError::Read(_)) => {}
            Err(e) => panic!("expected Read error, got {:?}", e),
            Ok(v) => panic!("expected Read error, got Ok (present: {})", v.is_some()),
        }
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_minutes() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
    }

    #[test]
    fn test_cached_data_age_display_hours_rounding() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Utc::now() - Duration::minutes(95);
        // 1h 35m rounds up to 2h
        assert_eq!(cached.age_display(), "2h ago");
    }
}
