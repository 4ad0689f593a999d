use std::fmt;

use serde::{Deserialize, Serialize};

/// One hardware identity from the registry.
///
/// A device record leaves the four `sub_*` fields empty. A sub-device record
/// fills all eight, inheriting the vendor and device fields of the device line
/// it was listed under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PciId {
    #[serde(rename = "vendorId")]
    pub vendor_id: String,
    #[serde(rename = "vendorName")]
    pub vendor_name: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,

    #[serde(rename = "subvendorId", default, skip_serializing_if = "String::is_empty")]
    pub sub_vendor_id: String,
    #[serde(rename = "subvendorName", default, skip_serializing_if = "String::is_empty")]
    pub sub_vendor_name: String,
    #[serde(rename = "subdeviceId", default, skip_serializing_if = "String::is_empty")]
    pub sub_device_id: String,
    #[serde(rename = "subdeviceName", default, skip_serializing_if = "String::is_empty")]
    pub sub_device_name: String,
}

impl PciId {
    pub fn device(vendor_id: &str, vendor_name: &str, device_id: &str, device_name: &str) -> Self {
        PciId {
            vendor_id: String::from(vendor_id),
            vendor_name: String::from(vendor_name),
            device_id: String::from(device_id),
            device_name: String::from(device_name),
            ..PciId::default()
        }
    }

    /// Builds a sub-device record below `parent`.
    pub fn sub_device(
        parent: &PciId,
        sub_vendor_id: &str,
        sub_vendor_name: &str,
        sub_device_id: &str,
        sub_device_name: &str,
    ) -> Self {
        PciId {
            vendor_id: parent.vendor_id.clone(),
            vendor_name: parent.vendor_name.clone(),
            device_id: parent.device_id.clone(),
            device_name: parent.device_name.clone(),
            sub_vendor_id: String::from(sub_vendor_id),
            sub_vendor_name: String::from(sub_vendor_name),
            sub_device_id: String::from(sub_device_id),
            sub_device_name: String::from(sub_device_name),
        }
    }

    pub fn is_sub_device(&self) -> bool {
        !self.sub_vendor_id.is_empty() && !self.sub_device_id.is_empty()
    }

    /// Indented JSON for a single record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for PciId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sub_device() {
            write!(
                f,
                "{}:{} {}:{} - {} {}",
                self.vendor_id,
                self.device_id,
                self.sub_vendor_id,
                self.sub_device_id,
                self.sub_vendor_name,
                self.sub_device_name
            )
        } else {
            write!(
                f,
                "{}:{} - {} {}",
                self.vendor_id, self.device_id, self.vendor_name, self.device_name
            )
        }
    }
}
