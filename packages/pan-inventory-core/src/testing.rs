//! Scripted stand-ins for devices and the store, shared by unit tests.

use crate::api::{ApiFactory, DeviceApi};
use crate::error::{InventoryError, Result};
use crate::inventory::{
    ComponentKind, ComponentRecord, DeviceRecord, FieldPath, InventoryStore, StoredIdentity,
    UpdateResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A state filter response as the device prints it
pub fn state_response(path: &str, value: &str) -> String {
    format!(
        "<response status=\"success\"><result>{}: {}\n</result></response>",
        path, value
    )
}

#[derive(Debug, Default)]
pub struct FakeDevice {
    responses: HashMap<String, Option<String>>,
    fallback: Option<String>,
    issued: Mutex<Vec<String>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `cmd` with `body`
    pub fn respond(mut self, cmd: &str, body: &str) -> Self {
        self.responses.insert(cmd.to_string(), Some(body.to_string()));
        self
    }

    /// Fail `cmd` as if the device were unreachable
    pub fn fail(mut self, cmd: &str) -> Self {
        self.responses.insert(cmd.to_string(), None);
        self
    }

    /// Answer every unscripted command with `body`
    pub fn otherwise(mut self, body: &str) -> Self {
        self.fallback = Some(body.to_string());
        self
    }

    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }

    fn answer(&self, host: &str, cmd: &str) -> Result<String> {
        self.issued.lock().unwrap().push(cmd.to_string());
        match self.responses.get(cmd) {
            Some(Some(body)) => Ok(body.clone()),
            Some(None) => Err(InventoryError::remote(host, "connection refused")),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| InventoryError::remote(host, format!("unscripted command {}", cmd))),
        }
    }
}

struct FakeHandle {
    host: String,
    device: Arc<FakeDevice>,
}

#[async_trait]
impl DeviceApi for FakeHandle {
    fn host(&self) -> &str {
        &self.host
    }

    async fn op(&self, cmd: &str) -> Result<String> {
        self.device.answer(&self.host, cmd)
    }
}

#[derive(Default)]
pub struct FakeApiFactory {
    devices: HashMap<String, Arc<FakeDevice>>,
}

impl FakeApiFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, host: &str, device: FakeDevice) -> Self {
        self.devices.insert(host.to_string(), Arc::new(device));
        self
    }

    /// Commands issued to `host`, in order
    pub fn issued(&self, host: &str) -> Vec<String> {
        self.devices
            .get(host)
            .map(|d| d.issued())
            .unwrap_or_default()
    }

    pub fn calls(&self, host: &str) -> usize {
        self.issued(host).len()
    }
}

impl ApiFactory for FakeApiFactory {
    fn connect(&self, host: &str) -> Result<Box<dyn DeviceApi>> {
        let device = self
            .devices
            .get(host)
            .cloned()
            .ok_or_else(|| InventoryError::remote(host, "no route to host"))?;
        Ok(Box::new(FakeHandle {
            host: host.to_string(),
            device,
        }))
    }
}

/// Store wrapper counting point queries and writes.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    pub inner: S,
    pub queries: std::cell::Cell<usize>,
    pub writes: usize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queries: std::cell::Cell::new(0),
            writes: 0,
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    fn query(&self) {
        self.queries.set(self.queries.get() + 1);
    }
}

impl<S: InventoryStore> InventoryStore for CountingStore<S> {
    fn find_identity(&self, ip_address: &str) -> Result<Option<StoredIdentity>> {
        self.query();
        self.inner.find_identity(ip_address)
    }

    fn insert_device(&mut self, record: DeviceRecord) -> Result<()> {
        self.writes += 1;
        self.inner.insert_device(record)
    }

    fn update_field(
        &mut self,
        ip_address: &str,
        field: &FieldPath,
        value: &str,
    ) -> Result<UpdateResult> {
        self.writes += 1;
        self.inner.update_field(ip_address, field, value)
    }

    fn find_component(
        &self,
        ip_address: &str,
        kind: ComponentKind,
        description: &str,
    ) -> Result<Option<ComponentRecord>> {
        self.query();
        self.inner.find_component(ip_address, kind, description)
    }

    fn add_component(
        &mut self,
        ip_address: &str,
        kind: ComponentKind,
        record: ComponentRecord,
    ) -> Result<UpdateResult> {
        self.writes += 1;
        self.inner.add_component(ip_address, kind, record)
    }

    fn all_devices(&self) -> Result<Vec<DeviceRecord>> {
        self.inner.all_devices()
    }
}
