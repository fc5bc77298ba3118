//! One sequential inventory pass.
//!
//! The active management peer lists its connected devices; each device is
//! fully processed (identity, then every component category of a chassis)
//! before the next one starts. Finally every configured management peer's
//! own identity is reconciled.

use crate::api::{ApiFactory, DeviceApi, commands};
use crate::config::{FailurePolicy, InventoryConfig};
use crate::enumerator::{self, ChassisLayout, ha};
use crate::error::{InventoryError, Result};
use crate::facts::{self, DeviceIdentity};
use crate::inventory::{
    ComponentKind, ComponentRecord, InventoryStore, ReconcileOutcome, Reconciler,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Progress updates during a pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollProgress {
    pub stage: PollStage,
    pub message: String,
    pub devices_processed: usize,
    pub elapsed_secs: f64,
}

/// Stages of an inventory pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PollStage {
    SelectingPeer,
    EnumeratingDevices,
    ReconcilingComponents,
    ReconcilingPeers,
    Complete,
}

/// Callback type for poll progress updates
pub type ProgressCallback = Box<dyn Fn(PollProgress) + Send + Sync>;

/// A device left out of the pass under [`FailurePolicy::Skip`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDevice {
    pub ip_address: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub active_peer: String,
    pub devices_seen: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_devices: Vec<SkippedDevice>,
}

impl PollSummary {
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

pub struct Poller<F, S> {
    hosts: Vec<String>,
    on_device_error: FailurePolicy,
    factory: F,
    reconciler: Reconciler<S>,
}

impl<F: ApiFactory, S: InventoryStore> Poller<F, S> {
    pub fn new(hosts: Vec<String>, factory: F, store: S) -> Self {
        Self {
            hosts,
            on_device_error: FailurePolicy::default(),
            factory,
            reconciler: Reconciler::new(store),
        }
    }

    pub fn from_config(config: &InventoryConfig, factory: F, store: S) -> Self {
        Self::new(config.hosts.clone(), factory, store).with_failure_policy(config.on_device_error)
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_device_error = policy;
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    pub fn into_store(self) -> S {
        self.reconciler.into_store()
    }

    /// Run one pass. Store failures always abort; device failures abort or
    /// skip the device according to the failure policy.
    pub async fn run(&mut self, on_progress: Option<ProgressCallback>) -> Result<PollSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let emit_progress = |stage: PollStage, message: &str, devices_processed: usize| {
            let progress = PollProgress {
                stage,
                message: message.to_string(),
                devices_processed,
                elapsed_secs: clock.elapsed().as_secs_f64(),
            };
            tracing::info!("[Poll] {}", message);
            if let Some(ref callback) = on_progress {
                callback(progress);
            }
        };

        emit_progress(PollStage::SelectingPeer, "Selecting active management peer...", 0);
        let active = ha::select_active_peer(&self.factory, &self.hosts).await?;
        let active_peer = active.host().to_string();

        emit_progress(
            PollStage::EnumeratingDevices,
            &format!("Listing devices connected to {}...", active_peer),
            0,
        );
        let devices = enumerator::connected_devices(active.as_ref()).await?;

        let mut totals = ReconcileOutcome::default();
        let mut skipped_devices = Vec::new();

        for (processed, device) in devices.iter().enumerate() {
            totals.merge(self.reconciler.reconcile_identity(device)?);

            if !enumerator::is_chassis_family(device) {
                continue;
            }

            emit_progress(
                PollStage::ReconcilingComponents,
                &format!(
                    "Reading chassis components of {} ({})...",
                    device.hostname, device.ip_address
                ),
                processed,
            );
            if let Err(e) = self.reconcile_chassis(device, &mut totals).await {
                self.device_failed(&device.ip_address, e, &mut skipped_devices)?;
            }
        }

        emit_progress(
            PollStage::ReconcilingPeers,
            "Reading management peer identities...",
            devices.len(),
        );
        for host in self.hosts.clone() {
            match self.peer_identity(&host).await {
                Ok(identity) => totals.merge(self.reconciler.reconcile_identity(&identity)?),
                Err(e) => self.device_failed(&host, e, &mut skipped_devices)?,
            }
        }

        let summary = PollSummary {
            started_at,
            finished_at: Utc::now(),
            active_peer,
            devices_seen: devices.len(),
            inserted: totals.inserted,
            updated: totals.updated,
            unchanged: totals.unchanged,
            skipped_devices,
        };

        emit_progress(
            PollStage::Complete,
            &format!(
                "Pass complete: {} inserted, {} updated, {} unchanged, {} skipped",
                summary.inserted,
                summary.updated,
                summary.unchanged,
                summary.skipped_devices.len()
            ),
            devices.len(),
        );

        Ok(summary)
    }

    async fn peer_identity(&self, host: &str) -> Result<DeviceIdentity> {
        let api = self.factory.connect(host)?;
        enumerator::system_identity(api.as_ref()).await
    }

    fn device_failed(
        &self,
        ip_address: &str,
        error: InventoryError,
        skipped: &mut Vec<SkippedDevice>,
    ) -> Result<()> {
        if self.on_device_error == FailurePolicy::Abort || !error.is_device_scoped() {
            tracing::error!("Aborting pass at {}: {}", ip_address, error);
            return Err(error);
        }

        tracing::warn!("Skipping {}: {}", ip_address, error);
        skipped.push(SkippedDevice {
            ip_address: ip_address.to_string(),
            reason: error.to_string(),
        });
        Ok(())
    }

    /// Walk every slot, power supply, fan tray and disk carrier of a chassis
    /// firewall in fixed order.
    async fn reconcile_chassis(
        &mut self,
        device: &DeviceIdentity,
        totals: &mut ReconcileOutcome,
    ) -> Result<()> {
        let layout = ChassisLayout::for_model(&device.model)?;
        let api = self.factory.connect(&device.ip_address)?;
        let api = api.as_ref();
        let ip = device.ip_address.as_str();

        tracing::debug!("{}: {} layout {:?}", ip, device.model, layout);

        for slot in 1..=layout.slots {
            let raw = api.op(&commands::chassis_info(slot)).await?;
            match facts::parse_chassis_card(&raw) {
                Some(card) if card.is_empty() => {
                    tracing::debug!("{}: slot {} is empty", ip, slot);
                }
                Some(card) => self.merge_component(ip, ComponentKind::Chassis, card.into(), totals)?,
                None => tracing::debug!("{}: no card reported in slot {}", ip, slot),
            }
        }

        for index in 0..layout.power_supplies {
            let raw = api.op(&commands::power_supply(layout.smc_slot, index)).await?;
            match facts::parse_power_supply(&raw) {
                Some(ps) if ps.is_present() => {
                    self.merge_component(ip, ComponentKind::PowerSupply, ps.into(), totals)?
                }
                _ => tracing::debug!("{}: power supply {} not present", ip, index),
            }
        }

        for index in 0..layout.fan_trays {
            if !fan_tray_present(api, layout.smc_slot, index).await? {
                tracing::debug!("{}: fan tray {} not present", ip, index);
                continue;
            }
            let raw = api.op(&commands::fan_tray(layout.smc_slot, index)).await?;
            if let Some(tray) = facts::parse_fan_tray(&raw) {
                self.merge_component(ip, ComponentKind::FanTray, tray.into(), totals)?;
            }
        }

        for index in 0..layout.disk_carriers {
            let raw = api.op(&commands::disk_carrier(layout.lpc_slot, index)).await?;
            if let Some(disk) = facts::parse_disk_carrier(&raw) {
                self.merge_component(ip, ComponentKind::DiskCarrier, disk.into(), totals)?;
            }
        }

        Ok(())
    }

    fn merge_component(
        &mut self,
        ip_address: &str,
        kind: ComponentKind,
        record: ComponentRecord,
        totals: &mut ReconcileOutcome,
    ) -> Result<()> {
        totals.merge(self.reconciler.reconcile_component(ip_address, kind, record)?);
        Ok(())
    }
}

async fn fan_tray_present(api: &dyn DeviceApi, smc_slot: u32, index: u32) -> Result<bool> {
    let raw = api.op(&commands::fan_tray_present(smc_slot, index)).await?;
    Ok(facts::parse_presence(&raw))
}
