//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::Result;

/// Default HTTP port, same as the browser client expects.
pub const DEFAULT_PORT: u16 = 5000;

/// Bearer tokens expire after a fixed 24 hours unless overridden.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Paths to all FoodDel data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Database directory (`data/db/`).
    pub db: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.db)?;
        Ok(())
    }
}

/// Top-level FoodDel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDelConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Lifetime of an issued bearer token, in hours.
    pub token_ttl_hours: i64,
}

impl FoodDelConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = env_or("PORT", DEFAULT_PORT);
        let token_ttl_hours = clamp_ttl(env_or("FOODDEL_TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS));

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir)?,
            token_ttl_hours,
        })
    }

    /// Token lifetime as a chrono duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(clamp_ttl(self.token_ttl_hours))
    }
}

fn clamp_ttl(hours: i64) -> i64 {
    let clamped = hours.clamp(1, MAX_TOKEN_TTL_HOURS);
    if clamped != hours {
        warn!("Token lifetime {}h out of range, using {}h", hours, clamped);
    }
    clamped
}

fn env_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_paths_creates_db_dir() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path().join("data")).unwrap();
        assert!(paths.db.is_dir());
        assert_eq!(paths.db, dir.path().join("data").join("db"));
    }

    #[test]
    fn test_token_ttl_defaults_to_a_day() {
        let dir = TempDir::new().unwrap();
        let config = FoodDelConfig {
            port: DEFAULT_PORT,
            data_paths: DataPaths::new(dir.path()).unwrap(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        };
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_token_ttl_is_clamped() {
        let dir = TempDir::new().unwrap();
        let mut config = FoodDelConfig {
            port: DEFAULT_PORT,
            data_paths: DataPaths::new(dir.path()).unwrap(),
            token_ttl_hours: 10_000_000_000,
        };
        assert_eq!(config.token_ttl(), chrono::Duration::hours(MAX_TOKEN_TTL_HOURS));

        config.token_ttl_hours = -5;
        assert_eq!(config.token_ttl(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_data_dir_under_a_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let err = DataPaths::new(&file).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
