//! Document store for inventory records.
//!
//! The store is a collection of device documents keyed by `ip-address`,
//! exposing only the point lookups and field-level writes reconciliation
//! needs. [`JsonDocumentStore`] keeps the collection in a JSON file and
//! rewrites it after every write, so each write commits on its own.

use super::reconcile::FieldPath;
use super::{ComponentKind, ComponentRecord, DeviceRecord};
use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Projection of a device document: just the fields identity
/// reconciliation compares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIdentity {
    pub serial: Option<String>,
    #[serde(rename = "sw-version")]
    pub software_version: Option<String>,
}

/// Outcome of a single-document write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    fn unmatched() -> Self {
        Self::default()
    }

    fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }
}

/// Point-query and field-update primitives keyed by device address.
pub trait InventoryStore {
    /// Stored serial and software version for the device at `ip_address`
    fn find_identity(&self, ip_address: &str) -> Result<Option<StoredIdentity>>;

    /// Insert a new device document. Fails if one already exists for the address.
    fn insert_device(&mut self, record: DeviceRecord) -> Result<()>;

    /// Set a single field, addressing component elements by description
    fn update_field(
        &mut self,
        ip_address: &str,
        field: &FieldPath,
        value: &str,
    ) -> Result<UpdateResult>;

    /// The element of `kind` whose description matches, if any
    fn find_component(
        &self,
        ip_address: &str,
        kind: ComponentKind,
        description: &str,
    ) -> Result<Option<ComponentRecord>>;

    /// Add `record` to the collection unless an identical element is present
    fn add_component(
        &mut self,
        ip_address: &str,
        kind: ComponentKind,
        record: ComponentRecord,
    ) -> Result<UpdateResult>;

    /// Full collection scan, for presentation
    fn all_devices(&self) -> Result<Vec<DeviceRecord>>;
}

#[derive(Debug, Default)]
pub struct JsonDocumentStore {
    path: Option<PathBuf>,
    documents: Vec<DeviceRecord>,
}

impl JsonDocumentStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let documents = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<DeviceRecord>>(&content)?
            }
        } else {
            tracing::debug!("No store file at {:?}, starting empty", path);
            Vec::new()
        };

        tracing::info!("Opened inventory store {:?}: {} devices", path, documents.len());

        Ok(Self {
            path: Some(path.to_path_buf()),
            documents,
        })
    }

    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn device(&self, ip_address: &str) -> Option<&DeviceRecord> {
        self.documents.iter().find(|d| d.ip_address == ip_address)
    }

    fn device_mut(&mut self, ip_address: &str) -> Option<&mut DeviceRecord> {
        self.documents.iter_mut().find(|d| d.ip_address == ip_address)
    }

    /// Write the whole collection back to disk
    fn commit(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&self.documents)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;

        tracing::trace!("Committed {} devices to {:?}", self.documents.len(), path);
        Ok(())
    }
}

impl InventoryStore for JsonDocumentStore {
    fn find_identity(&self, ip_address: &str) -> Result<Option<StoredIdentity>> {
        Ok(self.device(ip_address).map(|d| StoredIdentity {
            serial: Some(d.serial.clone()),
            software_version: Some(d.software_version.clone()),
        }))
    }

    fn insert_device(&mut self, record: DeviceRecord) -> Result<()> {
        if self.device(&record.ip_address).is_some() {
            return Err(InventoryError::Store(format!(
                "duplicate key: ip-address {} already exists",
                record.ip_address
            )));
        }
        self.documents.push(record);
        self.commit()
    }

    fn update_field(
        &mut self,
        ip_address: &str,
        field: &FieldPath,
        value: &str,
    ) -> Result<UpdateResult> {
        let Some(device) = self.device_mut(ip_address) else {
            return Ok(UpdateResult::unmatched());
        };

        let slot = match field {
            FieldPath::Serial => &mut device.serial,
            FieldPath::SoftwareVersion => &mut device.software_version,
            FieldPath::ComponentSerial { kind, description } => {
                match device
                    .components
                    .collection_mut(*kind)
                    .iter_mut()
                    .find(|c| &c.description == description)
                {
                    Some(component) => &mut component.serial,
                    None => return Ok(UpdateResult::unmatched()),
                }
            }
        };

        if slot.as_str() == value {
            return Ok(UpdateResult::matched(false));
        }
        *slot = value.to_string();
        self.commit()?;
        Ok(UpdateResult::matched(true))
    }

    fn find_component(
        &self,
        ip_address: &str,
        kind: ComponentKind,
        description: &str,
    ) -> Result<Option<ComponentRecord>> {
        Ok(self.device(ip_address).and_then(|d| {
            d.components
                .collection(kind)
                .iter()
                .find(|c| c.description == description)
                .cloned()
        }))
    }

    fn add_component(
        &mut self,
        ip_address: &str,
        kind: ComponentKind,
        record: ComponentRecord,
    ) -> Result<UpdateResult> {
        let Some(device) = self.device_mut(ip_address) else {
            return Ok(UpdateResult::unmatched());
        };

        let collection = device.components.collection_mut(kind);
        if collection.contains(&record) {
            return Ok(UpdateResult::matched(false));
        }
        collection.push(record);
        self.commit()?;
        Ok(UpdateResult::matched(true))
    }

    fn all_devices(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ComponentSet;

    fn device(ip: &str, serial: &str) -> DeviceRecord {
        DeviceRecord {
            serial: serial.to_string(),
            hostname: format!("fw-{}", serial),
            ip_address: ip.to_string(),
            family: "7000".to_string(),
            model: "PA-7050".to_string(),
            software_version: "10.1.0".to_string(),
            components: ComponentSet::default(),
        }
    }

    fn fan_tray(description: &str, serial: &str) -> ComponentRecord {
        ComponentRecord {
            description: description.to_string(),
            serial: serial.to_string(),
            model: Some("PAN-PA-7050-FANTRAY".to_string()),
            slot: None,
            card_type: None,
        }
    }

    #[test]
    fn test_find_identity_projection() {
        let mut store = JsonDocumentStore::in_memory();
        assert_eq!(store.find_identity("10.0.0.1").unwrap(), None);

        store.insert_device(device("10.0.0.1", "S1")).unwrap();
        let found = store.find_identity("10.0.0.1").unwrap().unwrap();
        assert_eq!(found.serial.as_deref(), Some("S1"));
        assert_eq!(found.software_version.as_deref(), Some("10.1.0"));
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let mut store = JsonDocumentStore::in_memory();
        store.insert_device(device("10.0.0.1", "S1")).unwrap();
        let err = store.insert_device(device("10.0.0.1", "S2")).unwrap_err();
        assert!(matches!(err, InventoryError::Store(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_field_counts() {
        let mut store = JsonDocumentStore::in_memory();
        store.insert_device(device("10.0.0.1", "S1")).unwrap();

        let result = store.update_field("10.0.0.1", &FieldPath::Serial, "S2").unwrap();
        assert_eq!(result, UpdateResult { matched_count: 1, modified_count: 1 });

        let result = store.update_field("10.0.0.1", &FieldPath::Serial, "S2").unwrap();
        assert_eq!(result, UpdateResult { matched_count: 1, modified_count: 0 });

        let result = store.update_field("10.9.9.9", &FieldPath::Serial, "S2").unwrap();
        assert_eq!(result.matched_count, 0);
    }

    #[test]
    fn test_add_component_has_set_semantics() {
        let mut store = JsonDocumentStore::in_memory();
        store.insert_device(device("10.0.0.1", "S1")).unwrap();

        let first = store
            .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #1", "F1"))
            .unwrap();
        let second = store
            .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #1", "F1"))
            .unwrap();
        assert_eq!(first.modified_count, 1);
        assert_eq!(second, UpdateResult { matched_count: 1, modified_count: 0 });

        let all = store.all_devices().unwrap();
        assert_eq!(all[0].components.fan_trays.len(), 1);
    }

    #[test]
    fn test_add_component_without_device_matches_nothing() {
        let mut store = JsonDocumentStore::in_memory();
        let result = store
            .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #1", "F1"))
            .unwrap();
        assert_eq!(result.matched_count, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_component_serial_update_by_description() {
        let mut store = JsonDocumentStore::in_memory();
        store.insert_device(device("10.0.0.1", "S1")).unwrap();
        store
            .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #1", "F1"))
            .unwrap();
        store
            .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #2", "F2"))
            .unwrap();

        let field = FieldPath::ComponentSerial {
            kind: ComponentKind::FanTray,
            description: "Fan Tray #2".to_string(),
        };
        let result = store.update_field("10.0.0.1", &field, "F9").unwrap();
        assert_eq!(result.modified_count, 1);

        let first = store
            .find_component("10.0.0.1", ComponentKind::FanTray, "Fan Tray #1")
            .unwrap()
            .unwrap();
        let second = store
            .find_component("10.0.0.1", ComponentKind::FanTray, "Fan Tray #2")
            .unwrap()
            .unwrap();
        assert_eq!(first.serial, "F1");
        assert_eq!(second.serial, "F9");

        let missing = FieldPath::ComponentSerial {
            kind: ComponentKind::FanTray,
            description: "Fan Tray #3".to_string(),
        };
        assert_eq!(store.update_field("10.0.0.1", &missing, "X").unwrap().matched_count, 0);
    }

    #[test]
    fn test_writes_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.json");

        {
            let mut store = JsonDocumentStore::open(&path).unwrap();
            store.insert_device(device("10.0.0.1", "S1")).unwrap();
            store
                .add_component("10.0.0.1", ComponentKind::FanTray, fan_tray("Fan Tray #1", "F1"))
                .unwrap();
            store
                .update_field("10.0.0.1", &FieldPath::SoftwareVersion, "11.0.1")
                .unwrap();
        }

        let store = JsonDocumentStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        let identity = store.find_identity("10.0.0.1").unwrap().unwrap();
        assert_eq!(identity.software_version.as_deref(), Some("11.0.1"));
        assert!(store
            .find_component("10.0.0.1", ComponentKind::FanTray, "Fan Tray #1")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_corrupt_store_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonDocumentStore::open(&path),
            Err(InventoryError::Store(_))
        ));
    }
}
