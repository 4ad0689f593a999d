use std::fmt;

use log::debug;

use crate::error::Error;
use crate::pci_id::PciId;

/// A lookup by 1, 2 or 4 identifiers.
///
/// Identifiers are compared case-insensitively; they are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Vendor {
        vendor_id: String,
    },
    Device {
        vendor_id: String,
        device_id: String,
    },
    SubDevice {
        vendor_id: String,
        device_id: String,
        sub_vendor_id: String,
        sub_device_id: String,
    },
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

impl Query {
    pub fn vendor(vendor_id: &str) -> Self {
        Query::Vendor {
            vendor_id: normalize(vendor_id),
        }
    }

    pub fn device(vendor_id: &str, device_id: &str) -> Self {
        Query::Device {
            vendor_id: normalize(vendor_id),
            device_id: normalize(device_id),
        }
    }

    pub fn sub_device(
        vendor_id: &str,
        device_id: &str,
        sub_vendor_id: &str,
        sub_device_id: &str,
    ) -> Self {
        Query::SubDevice {
            vendor_id: normalize(vendor_id),
            device_id: normalize(device_id),
            sub_vendor_id: normalize(sub_vendor_id),
            sub_device_id: normalize(sub_device_id),
        }
    }

    /// Picks the query kind from the number of identifiers.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, Error> {
        match ids {
            [vendor] => Ok(Query::vendor(vendor.as_ref())),
            [vendor, device] => Ok(Query::device(vendor.as_ref(), device.as_ref())),
            [vendor, device, sub_vendor, sub_device] => Ok(Query::sub_device(
                vendor.as_ref(),
                device.as_ref(),
                sub_vendor.as_ref(),
                sub_device.as_ref(),
            )),
            _ => Err(Error::InvalidArgumentCount(ids.len())),
        }
    }

    /// Whether `id` answers this query.
    ///
    /// A device query is read against the sub-device pair of any record that
    /// has one, and against the vendor/device pair of plain device records
    /// only. So `121a 0009` finds device `121a:0009` and every sub-device
    /// listed as `121a 0009`, but not the sub-devices of `121a:0009`.
    pub fn matches(&self, id: &PciId) -> bool {
        match self {
            Query::Vendor { vendor_id } => id.vendor_id == *vendor_id,
            Query::Device {
                vendor_id,
                device_id,
            } => {
                if id.is_sub_device() {
                    id.sub_vendor_id == *vendor_id && id.sub_device_id == *device_id
                } else {
                    id.vendor_id == *vendor_id && id.device_id == *device_id
                }
            }
            Query::SubDevice {
                vendor_id,
                device_id,
                sub_vendor_id,
                sub_device_id,
            } => {
                id.vendor_id == *vendor_id
                    && id.device_id == *device_id
                    && id.sub_vendor_id == *sub_vendor_id
                    && id.sub_device_id == *sub_device_id
            }
        }
    }

    /// Matching records, in collection order.
    pub fn filter(&self, records: &[PciId]) -> Vec<PciId> {
        debug!("looking up {}", self);
        let results: Vec<PciId> = records
            .iter()
            .filter(|id| self.matches(id))
            .cloned()
            .collect();
        debug!("found {} result(s)", results.len());
        results
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Vendor { vendor_id } => write!(f, "{}", vendor_id),
            Query::Device {
                vendor_id,
                device_id,
            } => write!(f, "{}:{}", vendor_id, device_id),
            Query::SubDevice {
                vendor_id,
                device_id,
                sub_vendor_id,
                sub_device_id,
            } => write!(
                f,
                "{}:{} {}:{}",
                vendor_id, device_id, sub_vendor_id, sub_device_id
            ),
        }
    }
}
