//! Persisted inventory documents and the reconciliation that keeps them current.
//!
//! Document keys are hyphenated (`ip-address`, `sw-version`, `power-supply`,
//! `fantray`, `amc`, ...) as PAN-OS reports them.

mod executor;
pub mod reconcile;
pub mod store;

pub use executor::{ReconcileOutcome, Reconciler};
pub use reconcile::{Decision, FieldPath, reconcile_component, reconcile_identity};
pub use store::{InventoryStore, JsonDocumentStore, StoredIdentity, UpdateResult};

use serde::{Deserialize, Serialize};

/// One physical device, keyed by its management address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub serial: String,
    pub hostname: String,
    #[serde(rename = "ip-address")]
    pub ip_address: String,
    pub family: String,
    pub model: String,
    #[serde(rename = "sw-version")]
    pub software_version: String,
    #[serde(flatten)]
    pub components: ComponentSet,
}

/// Per-device component collections. Only populated for chassis devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chassis: Vec<ComponentRecord>,
    #[serde(rename = "power-supply", default, skip_serializing_if = "Vec::is_empty")]
    pub power_supplies: Vec<ComponentRecord>,
    #[serde(rename = "fantray", default, skip_serializing_if = "Vec::is_empty")]
    pub fan_trays: Vec<ComponentRecord>,
    #[serde(rename = "amc", default, skip_serializing_if = "Vec::is_empty")]
    pub disk_carriers: Vec<ComponentRecord>,
}

impl ComponentSet {
    pub fn collection(&self, kind: ComponentKind) -> &Vec<ComponentRecord> {
        match kind {
            ComponentKind::Chassis => &self.chassis,
            ComponentKind::PowerSupply => &self.power_supplies,
            ComponentKind::FanTray => &self.fan_trays,
            ComponentKind::DiskCarrier => &self.disk_carriers,
        }
    }

    pub fn collection_mut(&mut self, kind: ComponentKind) -> &mut Vec<ComponentRecord> {
        match kind {
            ComponentKind::Chassis => &mut self.chassis,
            ComponentKind::PowerSupply => &mut self.power_supplies,
            ComponentKind::FanTray => &mut self.fan_trays,
            ComponentKind::DiskCarrier => &mut self.disk_carriers,
        }
    }

    pub fn is_empty(&self) -> bool {
        ComponentKind::ALL
            .iter()
            .all(|kind| self.collection(*kind).is_empty())
    }
}

/// A field-replaceable part. `description` is unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "desc")]
    pub description: String,
    pub serial: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    /// Card type, chassis cards only
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Chassis,
    PowerSupply,
    FanTray,
    DiskCarrier,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Chassis,
        ComponentKind::PowerSupply,
        ComponentKind::FanTray,
        ComponentKind::DiskCarrier,
    ];

    /// Name of the array field holding this collection in a device document
    pub fn field_name(&self) -> &'static str {
        match self {
            ComponentKind::Chassis => "chassis",
            ComponentKind::PowerSupply => "power-supply",
            ComponentKind::FanTray => "fantray",
            ComponentKind::DiskCarrier => "amc",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Chassis => write!(f, "chassis card"),
            ComponentKind::PowerSupply => write!(f, "power supply"),
            ComponentKind::FanTray => write!(f, "fan tray"),
            ComponentKind::DiskCarrier => write!(f, "disk carrier"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keys_match_collection_layout() {
        let record = DeviceRecord {
            serial: "0071".to_string(),
            hostname: "fw-core-1".to_string(),
            ip_address: "10.0.0.1".to_string(),
            family: "7000".to_string(),
            model: "PA-7050".to_string(),
            software_version: "10.1.6".to_string(),
            components: ComponentSet {
                power_supplies: vec![ComponentRecord {
                    description: "Power Supply #1 (left)".to_string(),
                    serial: "PS1".to_string(),
                    model: Some("PAN-PWR-2500-AC".to_string()),
                    slot: None,
                    card_type: None,
                }],
                ..Default::default()
            },
        };

        let doc = serde_json::to_value(&record).unwrap();
        assert_eq!(doc["ip-address"], "10.0.0.1");
        assert_eq!(doc["sw-version"], "10.1.6");
        assert_eq!(doc["power-supply"][0]["desc"], "Power Supply #1 (left)");
        assert!(doc.get("chassis").is_none());
        assert!(doc["power-supply"][0].get("slot").is_none());
    }

    #[test]
    fn test_hyphenated_document_loads() {
        let doc = r#"{
            "serial": "0071", "hostname": "fw", "ip-address": "10.0.0.1",
            "family": "7000", "model": "PA-7080", "sw-version": "9.1.3",
            "chassis": [{"model": "PA-7000-20G-NPC", "serial": "N1", "slot": "1", "type": "NPC", "desc": "Slot 1"}],
            "amc": [{"serial": "D1", "desc": "Disk Carrier 1"}]
        }"#;
        let record: DeviceRecord = serde_json::from_str(doc).unwrap();
        assert_eq!(record.components.chassis[0].card_type.as_deref(), Some("NPC"));
        assert_eq!(record.components.disk_carriers[0].serial, "D1");
        assert!(record.components.fan_trays.is_empty());
        assert!(!record.components.is_empty());
    }
}
