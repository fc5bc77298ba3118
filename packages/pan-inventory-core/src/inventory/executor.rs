use super::reconcile::{self, Decision, FieldPath};
use super::store::InventoryStore;
use super::{ComponentKind, ComponentRecord};
use crate::error::{InventoryError, Result};
use crate::facts::DeviceIdentity;
use serde::Serialize;

/// What reconciliation did, summed over any number of calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Devices or components created
    pub inserted: usize,
    /// Fields rewritten in place
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileOutcome {
    pub fn merge(&mut self, other: ReconcileOutcome) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
    }

    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Applies observed facts to an [`InventoryStore`]: point query, decide,
/// then execute the decision with single-field writes.
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: InventoryStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Insert the device if it is new, otherwise refresh its serial and
    /// software version.
    pub fn reconcile_identity(&mut self, observed: &DeviceIdentity) -> Result<ReconcileOutcome> {
        let stored = self.store.find_identity(&observed.ip_address)?;
        tracing::debug!("{}: stored identity {:?}", observed.ip_address, stored);

        let mut outcome = ReconcileOutcome::default();
        for decision in reconcile::reconcile_identity(stored.as_ref(), observed) {
            outcome.merge(self.apply(&observed.ip_address, decision)?);
        }
        Ok(outcome)
    }

    /// Merge one observed component into the device's `kind` collection.
    pub fn reconcile_component(
        &mut self,
        ip_address: &str,
        kind: ComponentKind,
        observed: ComponentRecord,
    ) -> Result<ReconcileOutcome> {
        let stored = self
            .store
            .find_component(ip_address, kind, &observed.description)?;
        tracing::debug!(
            "{}: stored {} {:?}: {:?}",
            ip_address,
            kind,
            observed.description,
            stored
        );

        let decision = reconcile::reconcile_component(stored.as_ref(), kind, observed);
        self.apply(ip_address, decision)
    }

    /// Execute one decision against the store.
    pub fn apply(&mut self, ip_address: &str, decision: Decision) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        match decision {
            Decision::NoOp => outcome.unchanged += 1,
            Decision::Insert(record) => {
                tracing::info!(
                    "New device {} ({}, {})",
                    record.ip_address,
                    record.hostname,
                    record.model
                );
                self.store.insert_device(record)?;
                outcome.inserted += 1;
            }
            Decision::UpdateField { field, value } => {
                let result = self.store.update_field(ip_address, &field, &value)?;
                tracing::debug!(
                    "Update {} on {} -- Matched: {} -- Modified: {}",
                    field,
                    ip_address,
                    result.matched_count,
                    result.modified_count
                );
                if result.matched_count == 0 {
                    return Err(missing_record(ip_address, &field));
                }
                if result.modified_count > 0 {
                    tracing::info!("{}: {} is now {}", ip_address, field, value);
                    outcome.updated += 1;
                } else {
                    outcome.unchanged += 1;
                }
            }
            Decision::AppendElement { kind, record } => {
                let description = record.description.clone();
                let result = self.store.add_component(ip_address, kind, record)?;
                tracing::debug!(
                    "Add {} {:?} on {} -- Matched: {} -- Modified: {}",
                    kind,
                    description,
                    ip_address,
                    result.matched_count,
                    result.modified_count
                );
                if result.matched_count == 0 {
                    return Err(InventoryError::MissingPrerequisiteRecord {
                        ip_address: ip_address.to_string(),
                        collection: kind.field_name().to_string(),
                    });
                }
                if result.modified_count > 0 {
                    outcome.inserted += 1;
                } else {
                    outcome.unchanged += 1;
                }
            }
        }

        Ok(outcome)
    }
}

fn missing_record(ip_address: &str, field: &FieldPath) -> InventoryError {
    let collection = match field {
        FieldPath::Serial | FieldPath::SoftwareVersion => "device",
        FieldPath::ComponentSerial { kind, .. } => kind.field_name(),
    };
    InventoryError::MissingPrerequisiteRecord {
        ip_address: ip_address.to_string(),
        collection: collection.to_string(),
    }
}
