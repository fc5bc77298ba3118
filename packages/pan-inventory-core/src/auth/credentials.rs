//! API key storage with platform keyring and file-based fallback.
//!
//! Storage priority:
//! 1. Platform keyring (if `keyring-storage` feature enabled and available)
//! 2. File-based storage (`0600` JSON file in the config directory)

use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result as InventoryResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "keyring-storage")]
use keyring::Entry;

/// Service name used for keyring storage
#[cfg(feature = "keyring-storage")]
const KEYRING_SERVICE: &str = "pan-inventory";
/// Username used for keyring entry
#[cfg(feature = "keyring-storage")]
const KEYRING_USER: &str = "api-key";

/// An API key and the management peer that issued it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub api_key: String,
    pub host: String,
    pub created_at: DateTime<Utc>,
}

impl ApiCredentials {
    pub fn new(host: &str, api_key: String) -> Self {
        Self {
            api_key,
            host: host.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub connected: bool,
    pub host: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .context("Failed to find config directory")?;
    Ok(config_dir.join("pan-inventory"))
}

fn get_credentials_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(".credentials"))
}

// ============================================================================
// File-based credential storage (always available)
// ============================================================================

fn write_credentials_file(path: &Path, creds: &ApiCredentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let json = serde_json::to_string(creds).context("Failed to serialize credentials")?;

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .context("Failed to create credentials file")?;
        let mut file = std::io::BufWriter::new(file);
        file.write_all(json.as_bytes())
            .context("Failed to write credentials")?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, &json).context("Failed to write credentials file")?;
    }

    tracing::debug!("Credentials saved to file: {:?}", path);
    Ok(())
}

fn read_credentials_file(path: &Path) -> Result<Option<ApiCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).context("Failed to read credentials file")?;
    let creds: ApiCredentials =
        serde_json::from_str(&content).context("Failed to parse credentials file")?;
    tracing::debug!("Credentials loaded from file");
    Ok(Some(creds))
}

fn remove_credentials_file(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete credentials file: {}", e);
        }
    }
}

fn save_credentials_to_file(creds: &ApiCredentials) -> Result<()> {
    write_credentials_file(&get_credentials_file_path()?, creds)
}

fn load_credentials_from_file() -> Result<Option<ApiCredentials>> {
    read_credentials_file(&get_credentials_file_path()?)
}

fn delete_credentials_from_file() {
    if let Ok(path) = get_credentials_file_path() {
        remove_credentials_file(&path);
    }
}

// ============================================================================
// Keyring-based credential storage (optional, platform-specific)
// ============================================================================

#[cfg(feature = "keyring-storage")]
fn get_keyring_entry() -> Result<Entry> {
    Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(|e| {
        tracing::error!(
            "Failed to create keyring entry (service='{}', user='{}'): {}",
            KEYRING_SERVICE,
            KEYRING_USER,
            e
        );
        anyhow::anyhow!("Failed to create keyring entry: {}", e)
    })
}

#[cfg(feature = "keyring-storage")]
fn save_credentials_to_keyring(creds: &ApiCredentials) -> Result<()> {
    let entry = match get_keyring_entry() {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("{}, using file storage", e);
            return save_credentials_to_file(creds);
        }
    };

    let json = serde_json::to_string(creds).context("Failed to serialize credentials")?;

    if let Err(e) = entry.set_password(&json) {
        tracing::warn!("Failed to save API key to keyring: {}, using file storage", e);
        return save_credentials_to_file(creds);
    }

    match entry.get_password() {
        Ok(stored) if stored == json => {
            tracing::debug!("API key verified in keyring after save");
            if let Err(e) = save_credentials_to_file(creds) {
                tracing::debug!("Failed to save backup credentials to file: {}", e);
            }
            Ok(())
        }
        Ok(_) | Err(keyring::Error::NoEntry) => {
            tracing::warn!("API key not readable back from keyring, using file storage");
            save_credentials_to_file(creds)
        }
        Err(e) => {
            tracing::warn!("Could not verify API key after save: {}", e);
            save_credentials_to_file(creds)
        }
    }
}

#[cfg(feature = "keyring-storage")]
fn load_credentials_from_keyring() -> Result<Option<ApiCredentials>> {
    let entry = match get_keyring_entry() {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("{}, trying file fallback", e);
            return load_credentials_from_file();
        }
    };

    match entry.get_password() {
        Ok(json) => {
            tracing::debug!("API key loaded from keyring");
            let creds: ApiCredentials =
                serde_json::from_str(&json).context("Failed to parse credentials from keyring")?;
            Ok(Some(creds))
        }
        Err(keyring::Error::NoEntry) => {
            tracing::debug!("No API key in keyring, trying file fallback");
            load_credentials_from_file()
        }
        Err(e) => {
            tracing::warn!("Failed to load API key from keyring: {}, trying file fallback", e);
            load_credentials_from_file()
        }
    }
}

#[cfg(feature = "keyring-storage")]
fn delete_credentials_from_keyring() -> Result<()> {
    delete_credentials_from_file();

    let entry = get_keyring_entry()?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("Failed to delete API key from keyring: {}", e)),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Load the stored API key, if any.
pub async fn load_credentials() -> Result<Option<ApiCredentials>> {
    #[cfg(feature = "keyring-storage")]
    let creds = load_credentials_from_keyring()?;

    #[cfg(not(feature = "keyring-storage"))]
    let creds = load_credentials_from_file()?;

    Ok(creds)
}

pub async fn save_credentials(creds: &ApiCredentials) -> Result<()> {
    #[cfg(feature = "keyring-storage")]
    save_credentials_to_keyring(creds)?;

    #[cfg(not(feature = "keyring-storage"))]
    save_credentials_to_file(creds)?;

    tracing::info!("API key for {} saved securely", creds.host);
    Ok(())
}

/// Delete the API key from all storage locations.
pub async fn delete_credentials() -> Result<()> {
    #[cfg(feature = "keyring-storage")]
    delete_credentials_from_keyring()?;

    #[cfg(not(feature = "keyring-storage"))]
    delete_credentials_from_file();

    Ok(())
}

pub async fn credential_status() -> Result<CredentialStatus> {
    Ok(match load_credentials().await? {
        Some(creds) => CredentialStatus {
            connected: true,
            host: Some(creds.host),
            created_at: Some(creds.created_at),
        },
        None => CredentialStatus {
            connected: false,
            host: None,
            created_at: None,
        },
    })
}

/// API key to poll with: the configured one, else the stored one.
pub async fn resolve_api_key(config: &InventoryConfig) -> InventoryResult<String> {
    if let Some(key) = &config.api_key {
        tracing::debug!("Using API key from configuration");
        return Ok(key.clone());
    }

    match load_credentials().await {
        Ok(Some(creds)) => {
            tracing::debug!("Using stored API key issued by {}", creds.host);
            Ok(creds.api_key)
        }
        Ok(None) => Err(InventoryError::Config(
            "no API key configured; run `pan-inventory connect` or set PAN_INVENTORY_API_KEY"
                .to_string(),
        )),
        Err(e) => Err(InventoryError::Config(format!(
            "failed to load stored API key: {:#}",
            e
        ))),
    }
}

/// Get information about credential storage location (for documentation/debugging)
pub fn get_credential_storage_info() -> String {
    #[cfg(all(feature = "keyring-storage", target_os = "windows"))]
    {
        "Windows Credential Manager (with file fallback)".to_string()
    }
    #[cfg(all(feature = "keyring-storage", target_os = "macos"))]
    {
        "macOS Keychain (with file fallback)".to_string()
    }
    #[cfg(all(feature = "keyring-storage", target_os = "linux"))]
    {
        "Linux Secret Service (GNOME Keyring/KWallet, with file fallback)".to_string()
    }
    #[cfg(all(
        feature = "keyring-storage",
        not(any(target_os = "windows", target_os = "macos", target_os = "linux"))
    ))]
    {
        "Platform keyring (with file fallback)".to_string()
    }
    #[cfg(not(feature = "keyring-storage"))]
    {
        let path = get_credentials_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "~/.config/pan-inventory/.credentials".to_string());
        format!("File-based storage: {}", path)
    }
}
