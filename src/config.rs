//! Loading service configuration from TOML.
//!
//! See `AppConfig` for the expected schema. Every field is optional.
//!
//! ```toml
//! [store]
//! data_dir = "./data"
//!
//! [analytics]
//! max_error_records = 100
//! max_session_records = 50
//! recent_errors_default = 20
//!
//! [sessions]
//! max_live = 1000
//! ttl_minutes = 60
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub analytics: AnalyticsConfig,
  #[serde(default)]
  pub sessions: SessionsConfig,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StoreConfig {
  /// Directory for JSON records. `None` keeps everything in memory.
  #[serde(default)]
  pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
  pub max_error_records: usize,
  pub max_session_records: usize,
  pub recent_errors_default: usize,
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      max_error_records: 100,
      max_session_records: 50,
      recent_errors_default: 20,
    }
  }
}

/// Bounds on in-flight sessions. Abandoned sessions expire; the oldest go first at the cap.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
  pub max_live: usize,
  pub ttl_minutes: i64,
}

impl Default for SessionsConfig {
  fn default() -> Self {
    Self { max_live: 1000, ttl_minutes: 60 }
  }
}

impl AppConfig {
  pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }
}

/// Load from TALENTIA_CONFIG_PATH (defaults on any IO/parse error), then apply
/// the TALENTIA_DATA_DIR override.
pub fn load_config_from_env() -> AppConfig {
  let mut cfg = match std::env::var("TALENTIA_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match AppConfig::from_toml(&s) {
        Ok(cfg) => {
          info!(target: "talentia_backend", %path, "Loaded config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "talentia_backend", %path, error = %e, "Failed to parse TOML config");
          AppConfig::default()
        }
      },
      Err(e) => {
        error!(target: "talentia_backend", %path, error = %e, "Failed to read TOML config file");
        AppConfig::default()
      }
    },
    Err(_) => AppConfig::default(),
  };

  if let Ok(dir) = std::env::var("TALENTIA_DATA_DIR") {
    if !dir.trim().is_empty() {
      cfg.store.data_dir = Some(PathBuf::from(dir));
    }
  }
  cfg
}
