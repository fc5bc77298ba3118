//! Error taxonomy for inventory polling and reconciliation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// Transport, HTTP or PAN-OS API level failure. Never retried.
    #[error("query to {host} failed: {message}")]
    RemoteQuery { host: String, message: String },

    /// A structured (XML) response did not have the expected shape.
    #[error("failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// A component write found no device document to attach to.
    #[error("no device record for {ip_address}, cannot update {collection}")]
    MissingPrerequisiteRecord {
        ip_address: String,
        collection: String,
    },

    #[error("unrecognized HA state: {0:?}")]
    UnrecognizedHaState(String),

    #[error("no active management peer among {peers:?}")]
    NoActivePeer { peers: Vec<String> },

    #[error("unsupported chassis model: {0}")]
    UnsupportedChassisModel(String),

    #[error("document store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl InventoryError {
    pub(crate) fn remote(host: &str, message: impl std::fmt::Display) -> Self {
        InventoryError::RemoteQuery {
            host: host.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(context: &str, message: impl std::fmt::Display) -> Self {
        InventoryError::Parse {
            context: context.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the failure is scoped to a single device, so a pass may
    /// continue with the next one when skipping is enabled.
    pub fn is_device_scoped(&self) -> bool {
        matches!(
            self,
            InventoryError::RemoteQuery { .. }
                | InventoryError::Parse { .. }
                | InventoryError::UnsupportedChassisModel(_)
        )
    }
}

impl From<std::io::Error> for InventoryError {
    fn from(e: std::io::Error) -> Self {
        InventoryError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(e: serde_json::Error) -> Self {
        InventoryError::Store(e.to_string())
    }
}
