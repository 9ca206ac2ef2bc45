mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://itunes.apple.com/us/rss/topalbums/limit=100/json";
pub const DEFAULT_FETCH_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub feed_url: Option<String>,
    pub fetch_timeout_sec: u64,
    pub read_pool_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            feed_url: None,
            fetch_timeout_sec: DEFAULT_FETCH_TIMEOUT_SEC,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub feed_url: String,
    pub fetch_timeout_sec: u64,
    pub read_pool_size: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let feed_url = file
            .feed_url
            .or_else(|| cli.feed_url.clone())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        let fetch_timeout_sec = file.fetch_timeout_sec.unwrap_or(cli.fetch_timeout_sec);
        if fetch_timeout_sec == 0 {
            bail!("fetch_timeout_sec must be greater than zero");
        }

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        Ok(Self {
            db_path,
            feed_url,
            fetch_timeout_sec,
            read_pool_size,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_db(temp_dir: &TempDir) -> CliConfig {
        CliConfig {
            db_path: Some(temp_dir.path().join("albums.db")),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            feed_url: Some("https://feed.example/top.json".to_string()),
            fetch_timeout_sec: 10,
            read_pool_size: 2,
            ..cli_with_db(&temp_dir)
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("albums.db"));
        assert_eq!(config.feed_url, "https://feed.example/top.json");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_pool_size, 2);
    }

    #[test]
    fn test_resolve_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db(&temp_dir), None).unwrap();

        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.fetch_timeout_sec, DEFAULT_FETCH_TIMEOUT_SEC);
        assert_eq!(config.read_pool_size, DEFAULT_READ_POOL_SIZE);
    }

    #[test]
    fn test_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let file_db = temp_dir.path().join("from_file.db");
        let file = FileConfig {
            db_path: Some(file_db.to_string_lossy().to_string()),
            feed_url: Some("https://other.example/feed".to_string()),
            fetch_timeout_sec: Some(3),
            read_pool_size: None,
        };
        let cli = CliConfig {
            read_pool_size: 8,
            ..cli_with_db(&temp_dir)
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();

        assert_eq!(config.db_path, file_db);
        assert_eq!(config.feed_url, "https://other.example/feed");
        assert_eq!(config.fetch_timeout_sec, 3);
        assert_eq!(config.read_pool_size, 8);
    }

    #[test]
    fn test_missing_db_path_fails() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("db_path"));
    }

    #[test]
    fn test_invalid_values_fail() {
        let temp_dir = TempDir::new().unwrap();

        let dir_as_db = CliConfig {
            db_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&dir_as_db, None).is_err());

        let missing_parent = CliConfig {
            db_path: Some(temp_dir.path().join("nope").join("albums.db")),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&missing_parent, None).is_err());

        let zero_pool = CliConfig {
            read_pool_size: 0,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&zero_pool, None).is_err());

        let zero_timeout = FileConfig {
            fetch_timeout_sec: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli_with_db(&temp_dir), Some(zero_timeout)).is_err());
    }
}
