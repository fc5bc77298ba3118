//! Typed facts extracted from PAN-OS operational command responses.
//!
//! Two response shapes are handled:
//! - XML trees from `show devices connected` / `show system info` ([`system`])
//! - `path: { 'key': value, ... }` text from `show system state filter` ([`state`])
//!
//! Everything here is pure: no I/O, no store access.

pub mod state;
pub mod system;

pub use state::{
    parse_chassis_card, parse_disk_carrier, parse_fan_tray, parse_power_supply, parse_presence,
    state_value,
};
pub use system::{parse_api_key, parse_connected_devices, parse_system_info, response_error};

use crate::inventory::ComponentRecord;
use serde::{Deserialize, Serialize};

/// Literal the device reports for an unoccupied chassis slot
pub const EMPTY_SLOT_TYPE: &str = "Empty";

/// Literal the device reports for a present power supply or fan tray
pub const PRESENT: &str = "True";

/// Identity of a firewall or management peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub serial: String,
    pub hostname: String,
    pub ip_address: String,
    pub family: String,
    pub model: String,
    pub software_version: String,
}

/// A line card in a chassis slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChassisCard {
    pub model: String,
    pub serial: String,
    pub slot: String,
    pub card_type: String,
}

impl ChassisCard {
    pub fn is_empty(&self) -> bool {
        self.card_type == EMPTY_SLOT_TYPE
    }

    /// Slot label used to tell cards apart within a chassis
    pub fn description(&self) -> String {
        format!("Slot {}", self.slot)
    }
}

impl From<ChassisCard> for ComponentRecord {
    fn from(card: ChassisCard) -> Self {
        ComponentRecord {
            description: card.description(),
            serial: card.serial,
            model: Some(card.model),
            slot: Some(card.slot),
            card_type: Some(card.card_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerSupply {
    pub description: String,
    pub model: String,
    /// Presence flag exactly as printed by the device ("True"/"False")
    pub present: String,
    pub serial: String,
}

impl PowerSupply {
    pub fn is_present(&self) -> bool {
        self.present == PRESENT
    }
}

impl From<PowerSupply> for ComponentRecord {
    fn from(ps: PowerSupply) -> Self {
        ComponentRecord {
            description: ps.description,
            serial: ps.serial,
            model: Some(ps.model),
            slot: None,
            card_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanTray {
    pub description: String,
    pub model: String,
    pub serial: String,
}

impl From<FanTray> for ComponentRecord {
    fn from(tray: FanTray) -> Self {
        ComponentRecord {
            description: tray.description,
            serial: tray.serial,
            model: Some(tray.model),
            slot: None,
            card_type: None,
        }
    }
}

/// A log-card disk carrier (AMC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCarrier {
    pub description: String,
    pub serial: String,
}

impl From<DiskCarrier> for ComponentRecord {
    fn from(disk: DiskCarrier) -> Self {
        ComponentRecord {
            description: disk.description,
            serial: disk.serial,
            model: None,
            slot: None,
            card_type: None,
        }
    }
}
