use std::collections::HashMap;

use crate::layouts::DeviceKind;
use crate::payload::PayloadError;

/// Maps the `device` of an uplink to a layout.
pub trait DeviceResolver {
    fn resolve(&self, device: &str) -> Result<DeviceKind, PayloadError>;
}

/// Resolves layout identifiers (`dht22`, `bme280`, ...) only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutIds;

impl DeviceResolver for LayoutIds {
    fn resolve(&self, device: &str) -> Result<DeviceKind, PayloadError> {
        device.parse()
    }
}

/// Device ids bound to layouts out-of-band, falling back to layout identifiers.
///
/// # Examples
/// ```
/// use loradec_core::{DeviceKind, DeviceRegistry, DeviceResolver};
///
/// let mut registry = DeviceRegistry::new();
/// registry.insert("feather-01", DeviceKind::Bme280);
/// assert_eq!(registry.resolve("feather-01").unwrap(), DeviceKind::Bme280);
/// assert_eq!(registry.resolve("cpu-load").unwrap(), DeviceKind::CpuLoad);
/// assert!(registry.resolve("feather-02").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceKind>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to `kind`, returning the previous binding.
    pub fn insert(&mut self, id: impl Into<String>, kind: DeviceKind) -> Option<DeviceKind> {
        self.devices.insert(id.into(), kind)
    }

    pub fn get(&self, id: &str) -> Option<DeviceKind> {
        self.devices.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<(String, DeviceKind)> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = (String, DeviceKind)>>(iter: I) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl DeviceResolver for DeviceRegistry {
    fn resolve(&self, device: &str) -> Result<DeviceKind, PayloadError> {
        match self.get(device) {
            Some(kind) => Ok(kind),
            None => LayoutIds.resolve(device),
        }
    }
}
