//! Chassis layouts of the modular 7000-series firewalls.

use crate::error::{InventoryError, Result};
use serde::Serialize;

/// Fan trays per chassis, both supported models
const FAN_TRAYS: u32 = 2;

/// Disk carriers on the log processing card
const DISK_CARRIERS: u32 = 4;

/// Where a chassis keeps its management and logging cards and how many
/// replaceable parts it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChassisLayout {
    /// Switch management card slot; environment sensors hang off it
    pub smc_slot: u32,
    /// Log processing card slot; holds the disk carriers
    pub lpc_slot: u32,
    pub power_supplies: u32,
    pub slots: u32,
    pub fan_trays: u32,
    pub disk_carriers: u32,
}

impl ChassisLayout {
    pub fn for_model(model: &str) -> Result<Self> {
        match model {
            "PA-7080" => Ok(Self {
                smc_slot: 6,
                lpc_slot: 7,
                power_supplies: 8,
                slots: 12,
                fan_trays: FAN_TRAYS,
                disk_carriers: DISK_CARRIERS,
            }),
            "PA-7050" => Ok(Self {
                smc_slot: 4,
                lpc_slot: 8,
                power_supplies: 4,
                slots: 8,
                fan_trays: FAN_TRAYS,
                disk_carriers: DISK_CARRIERS,
            }),
            other => Err(InventoryError::UnsupportedChassisModel(other.to_string())),
        }
    }
}
