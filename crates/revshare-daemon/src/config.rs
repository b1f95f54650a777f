//! Daemon configuration, read from `config.toml` in the data directory.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/revshare"
//!
//! [revenue]
//! dedupe_orders = true
//!
//! [advanced]
//! log_level = "debug"
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use revshare_engine::distributor::DistributorOptions;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";
const DATA_DIR_ENV: &str = "REVSHARE_DATA_DIR";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub revenue: RevenueConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Where the ledger database and the RPC socket live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Empty means the platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Database file name inside `data_dir`.
    #[serde(default = "default_db_file")]
    pub db_file: String,
    /// Socket file name inside `data_dir`.
    #[serde(default = "default_socket_file")]
    pub socket_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueConfig {
    /// Pay each `orderId` at most once.
    #[serde(default = "default_true")]
    pub dedupe_orders: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Default `revshare` log directive; `RUST_LOG` still applies on top.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_db_file() -> String {
    "revshare.db".to_string()
}

fn default_socket_file() -> String {
    "revshare.sock".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            db_file: default_db_file(),
            socket_file: default_socket_file(),
        }
    }
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            dedupe_orders: default_true(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load `config.toml` from the default data directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&default_data_dir().join(CONFIG_FILE))
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DaemonConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let level = self.advanced.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "advanced.log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.advanced.log_level
            );
        }
        for (key, name) in [
            ("storage.db_file", &self.storage.db_file),
            ("storage.socket_file", &self.storage.socket_file),
        ] {
            if name.is_empty() || name.contains(std::path::MAIN_SEPARATOR) {
                anyhow::bail!("{key} must be a plain file name, got '{name}'");
            }
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.db_file)
    }

    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.socket_file)
    }

    /// The `EnvFilter` directive for this crate family.
    pub fn log_directive(&self) -> String {
        format!("revshare={}", self.advanced.log_level.to_ascii_lowercase())
    }

    /// Options handed to every distribution call.
    pub fn distributor_options(&self) -> DistributorOptions {
        DistributorOptions {
            dedupe_orders: self.revenue.dedupe_orders,
        }
    }
}

/// `$REVSHARE_DATA_DIR`, else a per-user directory under `$HOME`.
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let subdir = if cfg!(target_os = "macos") {
        "Library/Application Support/Revshare"
    } else {
        ".revshare"
    };
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(subdir))
        .unwrap_or_else(|_| std::env::temp_dir().join("revshare"))
}
