use std::path::PathBuf;

use serde::Deserialize;

/// Which backend persists per-user snapshots
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON file per user under `snapshot_dir`
    Fs,
    /// One key per user in Redis
    Redis,
    /// Kept in process memory, lost on exit
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Order history dataset ingested at startup
    #[serde(default = "default_orders_csv")]
    pub orders_csv: PathBuf,

    /// Snapshot backend
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Directory holding per-user snapshots for the filesystem backend
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Redis connection URL for the redis backend
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_orders_csv() -> PathBuf {
    PathBuf::from("food_order.csv")
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Fs
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        let vars: Vec<(String, String)> = vec![];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.orders_csv, PathBuf::from("food_order.csv"));
        assert_eq!(config.store_backend, StoreBackend::Fs);
        assert_eq!(config.snapshot_dir, PathBuf::from("snapshots"));
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("STORE_BACKEND".to_string(), "redis".to_string()),
            ("REDIS_URL".to_string(), "redis://cache:6380".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.redis_url, "redis://cache:6380");
        assert_eq!(config.port, 8080);
    }
}
