use serde::Deserialize;
use std::{fs, path::PathBuf};

use energy_client::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn store(&self) -> Store {
        Store::new(self.path.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_http_bind_addr")]
    pub http_bind_addr: String,
    /// Lookback used on first load and after a zoom reset.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            http_bind_addr: default_http_bind_addr(),
            default_lookback_days: default_lookback_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub metrics: Option<MetricsConfig>,
}

fn default_batch_size() -> usize {
    1000
}

fn default_http_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_lookback_days() -> u32 {
    30
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("ENERGY_CONFIG").unwrap_or_else(|_| "energy-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        if cfg.dashboard.default_lookback_days == 0 {
            anyhow::bail!("dashboard.default_lookback_days must be at least 1");
        }
        Ok(cfg)
    }
}
