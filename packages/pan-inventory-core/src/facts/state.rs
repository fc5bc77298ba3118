//! Parsing of `show system state filter <path>` output.
//!
//! The device echoes the filter path followed by a loosely formatted value:
//!
//! ```text
//! <response status="success"><result>env.s4.fantray-present.0: True
//! </result></response>
//! ```
//!
//! Record values look like a brace-delimited map with unquoted values. Each record
//! type is matched with an anchored pattern; a response that does not match
//! yields `None`, which callers treat as "nothing in this slot".

use super::{ChassisCard, DiskCarrier, FanTray, PRESENT, PowerSupply};
use regex::Regex;
use std::sync::LazyLock;

static CHASSIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"'model':\s([^,]*),\s'port_cnt':.*'serial':\s([^,]*),\s'slot':\s([^,]*),\s'type':\s([^,]*),\s'version'",
    )
    .expect("chassis pattern is valid")
});

static POWER_SUPPLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"'desc':\s([^,]*),\s'max-pwr':.*'model-no':\s([^,]*),\s'present':\s([^,]*),\s'serial-no':\s([^,]*),\s'version'",
    )
    .expect("power supply pattern is valid")
});

static FAN_TRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"'desc':\s([^,]*),\s'min':.*'pan-model-no':\s([^,]*),\s'pan-serial-no':\s([^,]*),\s'power'",
    )
    .expect("fan tray pattern is valid")
});

static DISK_CARRIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'desc':\s([^,]*?)\sstatus,\s'min':.*'serial-no':\s([^,]*),")
        .expect("disk carrier pattern is valid")
});

/// Value part of a state filter response, with the XML envelope and the
/// echoed filter path removed.
pub fn state_value(raw: &str) -> Option<&str> {
    let body = match (raw.find("<result>"), raw.rfind("</result>")) {
        (Some(start), Some(end)) if start + "<result>".len() <= end => {
            &raw[start + "<result>".len()..end]
        }
        _ => raw,
    };

    let (_path, value) = body.split_once(": ")?;
    Some(value.trim())
}

fn field(captures: &regex::Captures<'_>, index: usize) -> String {
    captures
        .get(index)
        .map(|m| m.as_str().trim().trim_matches('\'').to_string())
        .unwrap_or_default()
}

fn record_text(raw: &str) -> &str {
    state_value(raw).unwrap_or(raw)
}

/// `chassis.s<N>.info`
pub fn parse_chassis_card(raw: &str) -> Option<ChassisCard> {
    let caps = CHASSIS_RE.captures(record_text(raw))?;
    Some(ChassisCard {
        model: field(&caps, 1),
        serial: field(&caps, 2),
        slot: field(&caps, 3),
        card_type: field(&caps, 4),
    })
}

/// `env.s<SMC>.power-supply.<N>`
pub fn parse_power_supply(raw: &str) -> Option<PowerSupply> {
    let caps = POWER_SUPPLY_RE.captures(record_text(raw))?;
    Some(PowerSupply {
        description: field(&caps, 1),
        model: field(&caps, 2),
        present: field(&caps, 3),
        serial: field(&caps, 4),
    })
}

/// `env.s<SMC>.fantray.<N>`
pub fn parse_fan_tray(raw: &str) -> Option<FanTray> {
    let caps = FAN_TRAY_RE.captures(record_text(raw))?;
    Some(FanTray {
        description: field(&caps, 1),
        model: field(&caps, 2),
        serial: field(&caps, 3),
    })
}

/// `env.s<LPC>.raid.<N>`
pub fn parse_disk_carrier(raw: &str) -> Option<DiskCarrier> {
    let caps = DISK_CARRIER_RE.captures(record_text(raw))?;
    Some(DiskCarrier {
        description: field(&caps, 1),
        serial: field(&caps, 2),
    })
}

/// `env.s<SMC>.fantray-present.<N>`: present only on the literal "True"
pub fn parse_presence(raw: &str) -> bool {
    state_value(raw) == Some(PRESENT)
}
