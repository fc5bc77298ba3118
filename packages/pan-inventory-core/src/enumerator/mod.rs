//! Device discovery through a management plane.
//!
//! - [`ha`]: which management peer is active
//! - [`topology`]: chassis layout for the modular family
//! - [`connected_devices`] / [`system_identity`]: identity facts straight
//!   from the device API

pub mod ha;
pub mod topology;

pub use ha::{HaStatus, ha_status, parse_ha_state, peer_statuses, select_active_peer};
pub use topology::ChassisLayout;

use crate::api::{DeviceApi, commands};
use crate::error::Result;
use crate::facts::{self, DeviceIdentity};

/// Hardware family whose chassis components are inventoried
pub const DISTINGUISHED_FAMILY: &str = "7000";

pub fn is_chassis_family(identity: &DeviceIdentity) -> bool {
    identity.family == DISTINGUISHED_FAMILY
}

/// Devices registered to a management peer
pub async fn connected_devices(api: &dyn DeviceApi) -> Result<Vec<DeviceIdentity>> {
    let body = api.op(commands::SHOW_DEVICES_CONNECTED).await?;
    let devices = facts::parse_connected_devices(&body)?;
    tracing::info!("{} reports {} connected devices", api.host(), devices.len());
    Ok(devices)
}

/// Identity of the queried endpoint itself
pub async fn system_identity(api: &dyn DeviceApi) -> Result<DeviceIdentity> {
    let body = api.op(commands::SHOW_SYSTEM_INFO).await?;
    facts::parse_system_info(&body)
}
