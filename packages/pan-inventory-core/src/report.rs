//! Read-only tabular view of the stored inventory.

use crate::error::Result;
use crate::inventory::{ComponentKind, ComponentRecord, DeviceRecord, InventoryStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder for fields a component kind does not carry
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRow {
    pub hostname: String,
    pub ip_address: String,
    pub serial: String,
    pub model: String,
    pub software_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRow {
    pub hostname: String,
    pub description: String,
    pub serial: String,
    pub model: String,
    pub slot: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub devices: Vec<DeviceRow>,
    pub parts: Vec<PartRow>,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(device: &DeviceRecord) -> Self {
        DeviceRow {
            hostname: device.hostname.clone(),
            ip_address: device.ip_address.clone(),
            serial: device.serial.clone(),
            model: device.model.clone(),
            software_version: device.software_version.clone(),
        }
    }
}

fn part_row(hostname: &str, kind: ComponentKind, part: &ComponentRecord) -> PartRow {
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_APPLICABLE.to_string());

    // Chassis cards are listed by card type, their slot has its own column
    let description = match (kind, &part.card_type) {
        (ComponentKind::Chassis, Some(card_type)) => card_type.clone(),
        _ => part.description.clone(),
    };

    PartRow {
        hostname: hostname.to_string(),
        description,
        serial: part.serial.clone(),
        model: or_na(&part.model),
        slot: or_na(&part.slot),
    }
}

/// Scan the whole store into device and part rows.
///
/// Parts are grouped by device, then by kind (chassis, power supplies, fan
/// trays, disk carriers), each in insertion order.
pub fn build_report<S: InventoryStore + ?Sized>(store: &S) -> Result<InventoryReport> {
    let documents = store.all_devices()?;

    let devices = documents.iter().map(DeviceRow::from).collect();
    let parts = documents
        .iter()
        .flat_map(|device| {
            ComponentKind::ALL.into_iter().flat_map(move |kind| {
                device
                    .components
                    .collection(kind)
                    .iter()
                    .map(move |part| part_row(&device.hostname, kind, part))
            })
        })
        .collect();

    Ok(InventoryReport {
        generated_at: Utc::now(),
        devices,
        parts,
    })
}

impl InventoryReport {
    pub fn device_table(&self) -> String {
        let rows: Vec<Vec<&str>> = self
            .devices
            .iter()
            .map(|d| {
                vec![
                    d.hostname.as_str(),
                    d.ip_address.as_str(),
                    d.serial.as_str(),
                    d.model.as_str(),
                    d.software_version.as_str(),
                ]
            })
            .collect();
        format_table(
            &["Hostname", "IP Address", "Serial Number", "Model", "Software Version"],
            &rows,
        )
    }

    pub fn parts_table(&self) -> String {
        let rows: Vec<Vec<&str>> = self
            .parts
            .iter()
            .map(|p| {
                vec![
                    p.hostname.as_str(),
                    p.description.as_str(),
                    p.serial.as_str(),
                    p.model.as_str(),
                    p.slot.as_str(),
                ]
            })
            .collect();
        format_table(
            &["Hostname", "Description", "Serial Number", "Model", "Slot"],
            &rows,
        )
    }
}

/// Left-aligned plain text table with a dashed rule under the header.
pub fn format_table(headers: &[&str], rows: &[Vec<&str>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&line(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ComponentSet, JsonDocumentStore};

    fn part(description: &str, serial: &str, model: Option<&str>) -> ComponentRecord {
        ComponentRecord {
            description: description.to_string(),
            serial: serial.to_string(),
            model: model.map(str::to_string),
            slot: None,
            card_type: None,
        }
    }

    fn chassis_device() -> DeviceRecord {
        DeviceRecord {
            serial: "013201000001".to_string(),
            hostname: "fw-dc1-core".to_string(),
            ip_address: "10.20.0.5".to_string(),
            family: "7000".to_string(),
            model: "PA-7050".to_string(),
            software_version: "10.1.9".to_string(),
            components: ComponentSet {
                chassis: vec![ComponentRecord {
                    description: "Slot 1".to_string(),
                    serial: "012201000111".to_string(),
                    model: Some("PA-7000-20GQXM-NPC".to_string()),
                    slot: Some("1".to_string()),
                    card_type: Some("NPC".to_string()),
                }],
                power_supplies: vec![part("Power Supply #1", "PS0001", Some("PAN-PWR-2500-AC"))],
                fan_trays: vec![part("Fan Tray #1", "FT1234", Some("PAN-PA-7050-FANTRAY"))],
                disk_carriers: vec![part("Disk Carrier 1", "DC1000", None)],
            },
        }
    }

    fn peer_device() -> DeviceRecord {
        DeviceRecord {
            serial: "000710001234".to_string(),
            hostname: "pano-a".to_string(),
            ip_address: "10.0.0.10".to_string(),
            family: "m".to_string(),
            model: "M-600".to_string(),
            software_version: "10.1.9".to_string(),
            components: ComponentSet::default(),
        }
    }

    fn store() -> JsonDocumentStore {
        let mut store = JsonDocumentStore::in_memory();
        store.insert_device(chassis_device()).unwrap();
        store.insert_device(peer_device()).unwrap();
        store
    }

    #[test]
    fn test_build_report_rows() {
        let report = build_report(&store()).unwrap();

        assert_eq!(report.devices.len(), 2);
        assert_eq!(report.devices[1].hostname, "pano-a");
        assert_eq!(report.devices[1].software_version, "10.1.9");

        let descriptions: Vec<&str> = report.parts.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["NPC", "Power Supply #1", "Fan Tray #1", "Disk Carrier 1"]
        );
        assert!(report.parts.iter().all(|p| p.hostname == "fw-dc1-core"));
    }

    #[test]
    fn test_missing_fields_are_not_applicable() {
        let report = build_report(&store()).unwrap();

        assert_eq!(report.parts[0].slot, "1");
        assert_eq!(report.parts[1].slot, NOT_APPLICABLE);
        assert_eq!(report.parts[3].model, NOT_APPLICABLE);
        assert_eq!(report.parts[3].slot, NOT_APPLICABLE);
    }

    #[test]
    fn test_empty_store() {
        let report = build_report(&JsonDocumentStore::in_memory()).unwrap();
        assert!(report.devices.is_empty());
        assert!(report.parts.is_empty());
        assert_eq!(
            report.device_table(),
            "Hostname  IP Address  Serial Number  Model  Software Version\n\
             --------  ----------  -------------  -----  ----------------"
        );
    }

    #[test]
    fn test_format_table_alignment() {
        let table = format_table(
            &["Name", "IP"],
            &[vec!["fw-dc1-core", "10.20.0.5"], vec!["pano", "10.0.0.10"]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Name         IP");
        assert_eq!(lines[1], "-----------  ---------");
        assert_eq!(lines[2], "fw-dc1-core  10.20.0.5");
        assert_eq!(lines[3], "pano         10.0.0.10");
    }
}
