//! Device record shared by the store and the HTTP layer.

use serde::{Deserialize, Serialize};

/// A managed network device.
///
/// `id` and `mac` are fixed at creation; only `firmware` changes over the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Device {
    pub id: u64,
    pub mac: String,
    pub firmware: String,
}

impl Device {
    pub fn new(id: u64, mac: impl Into<String>, firmware: impl Into<String>) -> Self {
        Self {
            id,
            mac: mac.into(),
            firmware: firmware.into(),
        }
    }
}

/// Built-in inventory used when no devices are configured.
pub fn default_seed() -> Vec<Device> {
    vec![
        Device::new(1, "5F-4G", "2.2.0"),
        Device::new(2, "5E-4G", "2.2.1"),
    ]
}
