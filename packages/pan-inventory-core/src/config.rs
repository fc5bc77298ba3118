//! Runtime configuration for the inventory poller.
//!
//! Every component receives the [`InventoryConfig`] it needs at construction;
//! nothing reads configuration from process-wide state after loading.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable pointing at an alternative config file
const ENV_CONFIG_PATH: &str = "PAN_INVENTORY_CONFIG";

/// Comma-separated management peer addresses
const ENV_HOSTS: &str = "PAN_INVENTORY_HOSTS";

/// API key override
const ENV_API_KEY: &str = "PAN_INVENTORY_API_KEY";

/// Document store path override
const ENV_STORE: &str = "PAN_INVENTORY_STORE";

/// Default request timeout applied by the API client
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const STORE_FILE: &str = "inventory.json";

/// Configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    panorama: Option<PanoramaConfig>,
    store: Option<StoreConfig>,
    poll: Option<PollConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct PanoramaConfig {
    /// Management peer addresses, in preference order
    hosts: Option<Vec<String>>,
    api_key: Option<String>,
    verify_tls: Option<bool>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct StoreConfig {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct PollConfig {
    on_device_error: Option<FailurePolicy>,
}

/// What a pass does when a single device cannot be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole pass on the first failed device
    #[default]
    Abort,
    /// Log the failure and continue with the next device
    Skip,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Runtime inventory configuration
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Management plane peers (Panorama), in preference order
    pub hosts: Vec<String>,
    /// API key, if configured directly rather than through stored credentials
    pub api_key: Option<String>,
    pub verify_tls: bool,
    pub timeout: Duration,
    /// Location of the JSON document store
    pub store_path: PathBuf,
    pub on_device_error: FailurePolicy,
    /// Source of the peer list (for display)
    pub source: ConfigSource,
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Using default values
    Default,
    /// Loaded from environment variable
    Environment,
    /// Loaded from config file
    ConfigFile,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Get the path to the configuration file
fn get_config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path.trim()));
        }
    }

    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("pan-inventory").join("config.toml"))
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .map(|d| d.join("pan-inventory").join(STORE_FILE))
        .unwrap_or_else(|| PathBuf::from(STORE_FILE))
}

/// Parse config file content
pub fn parse_config_file(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(content)
}

/// Load configuration from the config file
fn load_config_file() -> Option<ConfigFile> {
    let path = get_config_file_path()?;

    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}", path, e);
            None
        }
    }
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Load inventory configuration with priority:
/// 1. Environment variables (PAN_INVENTORY_HOSTS, PAN_INVENTORY_API_KEY, PAN_INVENTORY_STORE)
/// 2. Config file (PAN_INVENTORY_CONFIG or ~/.config/pan-inventory/config.toml)
/// 3. Default values
pub fn load_config() -> InventoryConfig {
    resolve_config(|name| std::env::var(name).ok(), load_config_file())
}

fn resolve_config<F>(env: F, file: Option<ConfigFile>) -> InventoryConfig
where
    F: Fn(&str) -> Option<String>,
{
    let file = file.unwrap_or_default();
    let panorama = file.panorama.unwrap_or_default();

    let env_hosts = env(ENV_HOSTS)
        .map(|raw| split_hosts(&raw))
        .filter(|hosts| !hosts.is_empty());
    let file_hosts = panorama.hosts.filter(|hosts| !hosts.is_empty());

    let (hosts, source) = match (env_hosts, file_hosts) {
        (Some(hosts), _) => {
            tracing::info!("Using management peers from environment variable: {:?}", hosts);
            (hosts, ConfigSource::Environment)
        }
        (None, Some(hosts)) => {
            tracing::info!("Using management peers from config file: {:?}", hosts);
            (hosts, ConfigSource::ConfigFile)
        }
        (None, None) => {
            tracing::debug!("No management peers configured");
            (Vec::new(), ConfigSource::Default)
        }
    };

    let api_key = non_empty(env(ENV_API_KEY)).or_else(|| non_empty(panorama.api_key));

    let store_path = non_empty(env(ENV_STORE))
        .map(PathBuf::from)
        .or(file.store.and_then(|s| s.path))
        .unwrap_or_else(default_store_path);

    InventoryConfig {
        hosts,
        api_key,
        verify_tls: panorama.verify_tls.unwrap_or(false),
        timeout: Duration::from_secs(panorama.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        store_path,
        on_device_error: file
            .poll
            .and_then(|p| p.on_device_error)
            .unwrap_or_default(),
        source,
    }
}

/// Get the path to the config file for documentation purposes
pub fn get_config_file_path_string() -> String {
    get_config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/pan-inventory/config.toml".to_string())
}

/// Generate example config file content
pub fn generate_example_config() -> String {
    r#"# PAN Inventory Configuration
# Place this file at: ~/.config/pan-inventory/config.toml

[panorama]
# Management peers; with more than one, the HA-active peer is used
hosts = ["10.0.0.10", "10.0.0.11"]

# API key (optional, `pan-inventory connect` stores one securely instead)
# api_key = "LUFRPT..."

# PAN-OS ships with a self-signed certificate
verify_tls = false
timeout_secs = 30

[store]
# path = "/var/lib/pan-inventory/inventory.json"

[poll]
# "abort" stops the pass on the first unreachable device, "skip" moves on
on_device_error = "abort"
"#
    .to_string()
}
