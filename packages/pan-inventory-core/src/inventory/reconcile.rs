//! Decision rules for applying observed facts to stored inventory.
//!
//! These functions never touch the store. They compare an observation with the
//! narrow slice of stored state the caller fetched and return the minimal set
//! of writes; [`super::Reconciler`] fetches that slice and applies the result.

use super::store::StoredIdentity;
use super::{ComponentKind, ComponentRecord, ComponentSet, DeviceRecord};
use crate::facts::DeviceIdentity;

/// A single field that reconciliation may rewrite in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Serial,
    SoftwareVersion,
    /// `serial` of the element of `kind` whose description matches
    ComponentSerial {
        kind: ComponentKind,
        description: String,
    },
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPath::Serial => write!(f, "serial"),
            FieldPath::SoftwareVersion => write!(f, "sw-version"),
            FieldPath::ComponentSerial { kind, .. } => write!(f, "{}.$.serial", kind.field_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    NoOp,
    /// Create the device document
    Insert(DeviceRecord),
    UpdateField { field: FieldPath, value: String },
    /// Add a component to its collection unless an identical one is present
    AppendElement {
        kind: ComponentKind,
        record: ComponentRecord,
    },
}

impl Decision {
    pub fn is_write(&self) -> bool {
        !matches!(self, Decision::NoOp)
    }
}

impl From<&DeviceIdentity> for DeviceRecord {
    fn from(identity: &DeviceIdentity) -> Self {
        DeviceRecord {
            serial: identity.serial.clone(),
            hostname: identity.hostname.clone(),
            ip_address: identity.ip_address.clone(),
            family: identity.family.clone(),
            model: identity.model.clone(),
            software_version: identity.software_version.clone(),
            components: ComponentSet::default(),
        }
    }
}

/// Decide how to bring a device's identity up to date.
///
/// Only `serial` and `sw-version` are compared. Hostname, model and family
/// are written on insert and never revisited.
pub fn reconcile_identity(
    stored: Option<&StoredIdentity>,
    observed: &DeviceIdentity,
) -> Vec<Decision> {
    let Some(stored) = stored else {
        return vec![Decision::Insert(DeviceRecord::from(observed))];
    };

    let mut decisions = Vec::with_capacity(2);

    // Same address, different chassis: hardware was swapped (RMA)
    if stored.serial.as_deref() != Some(observed.serial.as_str()) {
        decisions.push(Decision::UpdateField {
            field: FieldPath::Serial,
            value: observed.serial.clone(),
        });
    }

    if stored.software_version.as_deref() != Some(observed.software_version.as_str()) {
        decisions.push(Decision::UpdateField {
            field: FieldPath::SoftwareVersion,
            value: observed.software_version.clone(),
        });
    }

    if decisions.is_empty() {
        decisions.push(Decision::NoOp);
    }
    decisions
}

/// Decide how to merge one observed component into its collection.
///
/// `stored` is the element whose description matched, if any. Only the
/// serial of an existing element is ever rewritten.
pub fn reconcile_component(
    stored: Option<&ComponentRecord>,
    kind: ComponentKind,
    observed: ComponentRecord,
) -> Decision {
    match stored {
        None => Decision::AppendElement {
            kind,
            record: observed,
        },
        Some(existing)
            if existing.description == observed.description
                && existing.serial != observed.serial =>
        {
            Decision::UpdateField {
                field: FieldPath::ComponentSerial {
                    kind,
                    description: observed.description,
                },
                value: observed.serial,
            }
        }
        Some(_) => Decision::NoOp,
    }
}
