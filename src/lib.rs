//! Look up human-readable PCI vendor, device and subsystem names.
//!
//! The [pci.ids](https://pci-ids.ucw.cz/) registry is fetched (or read from a
//! local copy), parsed into a flat list of [`PciId`] records and filtered by
//! one, two or four hex identifiers.
//!
//! ```no_run
//! let ids = pciids_lookup::query_device("10de", "1467")?;
//! for id in ids {
//!     println!("{}", id);
//! }
//! # Ok::<(), pciids_lookup::Error>(())
//! ```

mod error;
mod line;
mod output;
mod pci_id;
mod pci_id_data;
mod query;
mod source;

pub use crate::error::{Error, LineErrorKind, LineKind, ParseError, Result, SourceError};
pub use crate::line::{classify, RegistryLine, SkipReason};
pub use crate::output::{render, OutputFormat};
pub use crate::pci_id::PciId;
pub use crate::pci_id_data::{ParsePolicy, PciIdData, VendorIndex};
pub use crate::query::Query;
pub use crate::source::{latest, RegistrySource, DEFAULT_TIMEOUT, LOCAL_PATH_ENV_VAR, REMOTE_URL};

/// Fetches and parses the registry from `source`.
pub fn load(source: &RegistrySource, policy: ParsePolicy) -> Result<PciIdData> {
    let raw = source.fetch()?;
    Ok(PciIdData::parse_with(&raw, policy)?)
}

/// Every record in the registry selected by [`RegistrySource::from_env`].
pub fn all() -> Result<Vec<PciId>> {
    Ok(load(&RegistrySource::from_env(), ParsePolicy::default())?.into_records())
}

/// Devices and sub-devices listed under a vendor ID.
pub fn query_vendor(vendor_id: &str) -> Result<Vec<PciId>> {
    run(&Query::vendor(vendor_id))
}

/// Devices matching a vendor and device ID pair.
pub fn query_device(vendor_id: &str, device_id: &str) -> Result<Vec<PciId>> {
    run(&Query::device(vendor_id, device_id))
}

/// Devices matching a quartet of vendor, device, sub-vendor and sub-device IDs.
pub fn query_sub_device(
    vendor_id: &str,
    device_id: &str,
    sub_vendor_id: &str,
    sub_device_id: &str,
) -> Result<Vec<PciId>> {
    run(&Query::sub_device(
        vendor_id,
        device_id,
        sub_vendor_id,
        sub_device_id,
    ))
}

fn run(query: &Query) -> Result<Vec<PciId>> {
    let data = load(&RegistrySource::from_env(), ParsePolicy::default())?;
    Ok(data.query(query))
}
