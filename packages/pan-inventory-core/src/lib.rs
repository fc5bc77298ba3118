//! PAN Inventory Core Library
//!
//! Polls Palo Alto Networks management planes (Panorama) and the firewalls
//! connected to them for hardware and software inventory, and reconciles
//! every observed fact into a document store with the fewest possible
//! writes:
//! - Device query adapter over the PAN-OS XML API ([`api`])
//! - Fact extraction from XML and state-filter text ([`facts`])
//! - Reconciliation engine and document store ([`inventory`])
//! - Device enumeration and HA peer selection ([`enumerator`])
//! - Sequential poll pass ([`poller`]) and tabular report ([`report`])
//! - API key storage (keyring with file fallback) ([`auth`])
//!
//! # Features
//!
//! - `keyring-storage` (default): Use platform keyring for API key storage
//! - `file-storage`: Use file-based API key storage (for headless Linux)
//!
//! # Example
//!
//! ```no_run
//! use pan_inventory_core::{api::PanClientFactory, auth, config, inventory::JsonDocumentStore, poller::Poller};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = config::load_config();
//!     let api_key = auth::resolve_api_key(&config).await?;
//!
//!     let factory = PanClientFactory::new(&config, api_key);
//!     let store = JsonDocumentStore::open(&config.store_path)?;
//!
//!     let mut poller = Poller::from_config(&config, factory, store);
//!     let summary = poller.run(None).await?;
//!     println!("{} inserted, {} updated", summary.inserted, summary.updated);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod facts;
pub mod inventory;
pub mod poller;
pub mod report;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ConfigSource, FailurePolicy, InventoryConfig};
pub use error::{InventoryError, Result};
pub use inventory::{DeviceRecord, InventoryStore, JsonDocumentStore, ReconcileOutcome, Reconciler};
pub use poller::{PollProgress, PollStage, PollSummary, Poller};
pub use report::{InventoryReport, build_report};
