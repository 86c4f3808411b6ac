//! In-memory list of known miners

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub address: String,
    pub label: String,
}

impl Device {
    pub fn new(address: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: label.into(),
        }
    }
}

/// Ordered device list. Lives only as long as the process.
///
/// Manual additions are not deduplicated; discovery checks
/// [`DeviceRegistry::find_by_address`] before adding.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, address: impl Into<String>, label: impl Into<String>) {
        let device = Device::new(address, label);
        info!("registered {} ({})", device.label, device.address);
        self.devices.push(device);
    }

    /// Remove every entry with this address, returning how many were removed.
    pub fn remove(&mut self, address: &str) -> usize {
        let before = self.devices.len();
        self.devices.retain(|device| device.address != address);
        let removed = before - self.devices.len();

        if removed > 0 {
            info!("removed {removed} entries for {address}");
        }

        removed
    }

    pub fn list(&self) -> &[Device] {
        &self.devices
    }

    pub fn find_by_label(&self, label: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.label == label)
    }

    pub fn find_by_address(&self, address: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.address == address)
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
