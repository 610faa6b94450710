//! Device store.
//!
//! `DeviceStore` is the seam between the HTTP layer and wherever devices live.
//! The only implementation keeps them in memory behind an async `RwLock`: many
//! concurrent listings, one firmware update at a time. Contents reset on
//! restart.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fleetwatch_core::device::Device;
use fleetwatch_core::error::{FleetError, Result};

#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Snapshot of every device, in insertion order.
    async fn list_all(&self) -> Vec<Device>;

    /// Overwrite the firmware of the device with `id`.
    /// Returns `false` (and changes nothing) when no device matches.
    async fn update_firmware(&self, id: u64, firmware: &str) -> bool;

    /// Number of devices currently held.
    async fn count(&self) -> usize;
}

/// Check seed data: ids must be positive and unique.
pub fn validate_seed(devices: &[Device]) -> Result<()> {
    let mut seen = HashSet::with_capacity(devices.len());
    for d in devices {
        if d.id == 0 {
            return Err(FleetError::BadRequest(format!(
                "device id must be positive (mac={})",
                d.mac
            )));
        }
        if !seen.insert(d.id) {
            return Err(FleetError::BadRequest(format!("duplicate device id: {}", d.id)));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    devices: RwLock<Vec<Device>>,
}

impl InMemoryDeviceStore {
    /// Build a store from seed data. Ids must be positive and unique.
    pub fn new(seed: Vec<Device>) -> Result<Self> {
        validate_seed(&seed)?;
        Ok(Self {
            devices: RwLock::new(seed),
        })
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn list_all(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    async fn update_firmware(&self, id: u64, firmware: &str) -> bool {
        let mut devices = self.devices.write().await;
        match devices.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.firmware = firmware.to_string();
                true
            }
            None => false,
        }
    }

    async fn count(&self) -> usize {
        self.devices.read().await.len()
    }
}
