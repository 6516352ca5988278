//! Runtime configuration, layered from `recall.toml` and `RECALL__*`
//! environment variables.

use std::{path::{Path, PathBuf}, time::Duration};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use recall_remote::{EmailJsConfig, leetcode};
use recall_store_sqlite::PoolConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "RECALL";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Shared secret every token-checked route compares against. Left empty,
  /// every such request is rejected.
  #[serde(default)]
  pub secret_token: String,
  /// Questions per scheduled batch.
  #[serde(default = "default_batch_size")]
  pub batch_size:   usize,
  #[serde(default)]
  pub pool:         PoolSettings,
  #[serde(default)]
  pub ingest:       IngestSettings,
  /// Without this section batches are only logged.
  #[serde(default)]
  pub email:        Option<EmailJsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
  pub min_size:           usize,
  pub max_size:           usize,
  pub acquire_timeout_ms: u64,
  pub connect_attempts:   u32,
  pub retry_delay_ms:     u64,
  pub busy_timeout_ms:    u64,
}

impl Default for PoolSettings {
  fn default() -> Self {
    let pool = PoolConfig::default();
    Self {
      min_size:           pool.min_size,
      max_size:           pool.max_size,
      acquire_timeout_ms: pool.acquire_timeout.as_millis() as u64,
      connect_attempts:   pool.connect_attempts,
      retry_delay_ms:     pool.retry_delay.as_millis() as u64,
      busy_timeout_ms:    5_000,
    }
  }
}

impl PoolSettings {
  pub fn pool_config(&self) -> PoolConfig {
    PoolConfig::default()
      .with_min_size(self.min_size)
      .with_max_size(self.max_size)
      .with_acquire_timeout(Duration::from_millis(self.acquire_timeout_ms))
      .with_connect_attempts(self.connect_attempts)
      .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
  }

  pub fn busy_timeout(&self) -> Duration { Duration::from_millis(self.busy_timeout_ms) }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
  /// Seconds between background ingestion passes; `0` disables them.
  pub interval_secs: u64,
  /// Whose accepted submissions to track. Without it there is no source.
  pub username:      Option<String>,
  pub limit:         u32,
  pub endpoint:      String,
}

impl Default for IngestSettings {
  fn default() -> Self {
    Self {
      interval_secs: 86_400,
      username:      None,
      limit:         leetcode::DEFAULT_LIMIT,
      endpoint:      leetcode::DEFAULT_ENDPOINT.to_string(),
    }
  }
}

impl IngestSettings {
  pub fn interval(&self) -> Option<Duration> {
    (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
  }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/recall/recall.db") }
fn default_batch_size() -> usize { 2 }

impl ServerConfig {
  /// Read `path` if it exists, then apply `RECALL__*` overrides
  /// (e.g. `RECALL__POOL__MAX_SIZE=8`).
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::build(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
          Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
        ),
    )
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    let cfg: Self = builder.build()?.try_deserialize()?;
    if cfg.batch_size == 0 {
      return Err(ConfigError::Message("batch_size must be at least 1".into()));
    }
    Ok(cfg)
  }
}
