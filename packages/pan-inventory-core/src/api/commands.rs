//! Operational command payloads for the PAN-OS XML API.

pub const SHOW_DEVICES_CONNECTED: &str = "<show><devices><connected></connected></devices></show>";

pub const SHOW_SYSTEM_INFO: &str = "<show><system><info></info></system></show>";

/// State path holding the HA prompt, e.g. `primary-active`
pub const HA_STATE_PROMPT: &str = "ha.app.cli.state-prompt";

/// `show system state filter <path>`
pub fn state_filter(path: &str) -> String {
    format!(
        "<show><system><state><filter>{}</filter></state></system></show>",
        path
    )
}

pub fn ha_state() -> String {
    state_filter(HA_STATE_PROMPT)
}

pub fn chassis_info(slot: u32) -> String {
    state_filter(&format!("chassis.s{}.info", slot))
}

pub fn power_supply(smc_slot: u32, index: u32) -> String {
    state_filter(&format!("env.s{}.power-supply.{}", smc_slot, index))
}

pub fn fan_tray_present(smc_slot: u32, index: u32) -> String {
    state_filter(&format!("env.s{}.fantray-present.{}", smc_slot, index))
}

pub fn fan_tray(smc_slot: u32, index: u32) -> String {
    state_filter(&format!("env.s{}.fantray.{}", smc_slot, index))
}

pub fn disk_carrier(lpc_slot: u32, index: u32) -> String {
    state_filter(&format!("env.s{}.raid.{}", lpc_slot, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_filter_paths() {
        assert_eq!(
            chassis_info(12),
            "<show><system><state><filter>chassis.s12.info</filter></state></system></show>"
        );
        assert!(power_supply(6, 7).contains("<filter>env.s6.power-supply.7</filter>"));
        assert!(fan_tray_present(4, 0).contains("<filter>env.s4.fantray-present.0</filter>"));
        assert!(fan_tray(4, 1).contains("<filter>env.s4.fantray.1</filter>"));
        assert!(disk_carrier(8, 3).contains("<filter>env.s8.raid.3</filter>"));
        assert!(ha_state().contains("<filter>ha.app.cli.state-prompt</filter>"));
    }
}
