//! Device query adapter.
//!
//! Issues operational commands against firewalls and management peers over
//! the PAN-OS XML API and hands back the raw response text.

mod client;
pub mod commands;

pub use client::{PanClient, PanClientFactory};

use crate::error::Result;
use async_trait::async_trait;

/// A management endpoint that accepts operational commands.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Address the endpoint was opened with
    fn host(&self) -> &str;

    /// Run one operational command and return the raw response body.
    ///
    /// Transport failures and API error envelopes are reported as
    /// [`crate::InventoryError::RemoteQuery`].
    async fn op(&self, cmd: &str) -> Result<String>;
}

/// Opens [`DeviceApi`] handles by address.
pub trait ApiFactory {
    fn connect(&self, host: &str) -> Result<Box<dyn DeviceApi>>;
}
