use std::collections::HashMap;
use std::concat;

use log::{debug, info, warn};

use crate::error::{LineErrorKind, LineKind, ParseError};
use crate::line::{classify, RegistryLine, SkipReason};
use crate::pci_id::PciId;
use crate::query::Query;

/// What to do with a line that does not fit the registry layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Log the line, keep it in [`PciIdData::skipped`] and carry on.
    Lenient,
    /// Stop at the first such line.
    Strict,
}

impl Default for ParsePolicy {
    fn default() -> Self {
        ParsePolicy::Lenient
    }
}

/// Vendor ID (lowercase) to vendor name.
pub type VendorIndex = HashMap<String, String>;

/// The parsed contents of one registry text.
#[derive(Debug, Default)]
pub struct PciIdData {
    vendors: VendorIndex,
    records: Vec<PciId>,
    skipped: Vec<ParseError>,
}

/// Context carried down the file while resolving device and sub-device lines.
#[derive(Default)]
struct ParseContext {
    current_vendor: Option<(String, String)>,
    current_device: Option<PciId>,
}

impl PciIdData {
    /// Parses `raw` leniently; malformed lines end up in [`PciIdData::skipped`].
    pub fn parse(raw: &str) -> Self {
        let mut data = PciIdData::default();
        data.add_pci_ids_data(raw, ParsePolicy::Lenient);
        data
    }

    /// Parses `raw`, failing on the first malformed line.
    pub fn parse_strict(raw: &str) -> Result<Self, ParseError> {
        Self::parse_with(raw, ParsePolicy::Strict)
    }

    pub fn parse_with(raw: &str, policy: ParsePolicy) -> Result<Self, ParseError> {
        let mut data = PciIdData::default();
        data.add_pci_ids_data(raw, policy);
        match policy {
            ParsePolicy::Strict => match data.skipped.pop() {
                Some(err) => Err(err),
                None => Ok(data),
            },
            ParsePolicy::Lenient => Ok(data),
        }
    }

    /// Two passes over `raw`: the first collects every vendor line into the
    /// vendor index, the second emits one record per device and sub-device
    /// line. A sub-vendor may therefore be declared anywhere in the file.
    fn add_pci_ids_data(&mut self, raw: &str, policy: ParsePolicy) {
        info!("Parsing pci.id data!");
        let lines = tokenize(raw);

        debug!("parsing vendor IDs");
        for (_, _, line) in &lines {
            if let Ok(RegistryLine::Vendor { id, name }) = line {
                if self.vendors.insert(id.clone(), name.clone()).is_some() {
                    debug!("duplicate vendor {}, keeping the later name", id);
                }
            }
        }

        debug!("parsing PCI IDs");
        let mut context = ParseContext::default();
        for (index, text, line) in lines {
            let reason = match line.and_then(|line| self.add_line(&mut context, line)) {
                Ok(()) => continue,
                Err(reason) => reason,
            };
            context.reset_after(&reason);
            let err = ParseError {
                line_number: index + 1,
                line: text.to_string(),
                reason,
            };
            if policy == ParsePolicy::Strict {
                self.skipped.push(err);
                break;
            }
            warn!("skipping {}", err);
            self.skipped.push(err);
        }

        info!(
            concat!(
                "Number of objects imported from the pci.ids database: ",
                "vendors({}), records({}), skipped lines({})",
            ),
            self.vendors.len(),
            self.records.len(),
            self.skipped.len()
        );
    }

    fn add_line(&mut self, context: &mut ParseContext, line: RegistryLine) -> Result<(), LineErrorKind> {
        match line {
            RegistryLine::Vendor { id, name } => context.current_vendor = Some((id, name)),
            RegistryLine::Device { id, name } => {
                let (vendor_id, vendor_name) = context
                    .current_vendor
                    .as_ref()
                    .ok_or(LineErrorKind::OrphanDevice)?;
                let device = PciId::device(vendor_id, vendor_name, &id, &name);
                context.current_device = Some(device.clone());
                self.records.push(device);
            }
            RegistryLine::SubDevice {
                sub_vendor_id,
                sub_device_id,
                name,
            } => {
                let parent = context
                    .current_device
                    .as_ref()
                    .ok_or(LineErrorKind::OrphanSubDevice)?;
                let sub_vendor_name = match self.vendors.get(&sub_vendor_id) {
                    Some(name) => name.as_str(),
                    None => {
                        debug!("sub-vendor {} is not in the vendor index", sub_vendor_id);
                        ""
                    }
                };
                let record =
                    PciId::sub_device(parent, &sub_vendor_id, sub_vendor_name, &sub_device_id, &name);
                self.records.push(record);
            }
            RegistryLine::Skipped(_) => {}
        }
        Ok(())
    }

    /// Records in registry order: one per device line and one per sub-device
    /// line.
    pub fn records(&self) -> &[PciId] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PciId> {
        self.records
    }

    pub fn vendors(&self) -> &VendorIndex {
        &self.vendors
    }

    pub fn vendor_name(&self, vendor_id: &str) -> Option<&str> {
        self.vendors
            .get(&vendor_id.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Lines dropped by a lenient parse.
    pub fn skipped(&self) -> &[ParseError] {
        &self.skipped
    }

    pub fn query(&self, query: &Query) -> Vec<PciId> {
        query.filter(&self.records)
    }

    pub fn query_vendor(&self, vendor_id: &str) -> Vec<PciId> {
        self.query(&Query::vendor(vendor_id))
    }

    pub fn query_device(&self, vendor_id: &str, device_id: &str) -> Vec<PciId> {
        self.query(&Query::device(vendor_id, device_id))
    }

    pub fn query_sub_device(
        &self,
        vendor_id: &str,
        device_id: &str,
        sub_vendor_id: &str,
        sub_device_id: &str,
    ) -> Vec<PciId> {
        self.query(&Query::sub_device(
            vendor_id,
            device_id,
            sub_vendor_id,
            sub_device_id,
        ))
    }
}

impl ParseContext {
    /// Drops whatever context a malformed line would have replaced, so its
    /// children are reported as orphans instead of landing under the wrong
    /// parent. The current device survives vendor lines, malformed or not.
    fn reset_after(&mut self, reason: &LineErrorKind) {
        match reason {
            LineErrorKind::Malformed {
                kind: LineKind::Vendor,
                ..
            } => self.current_vendor = None,
            LineErrorKind::Malformed {
                kind: LineKind::Device,
                ..
            }
            | LineErrorKind::OrphanDevice => self.current_device = None,
            _ => {}
        }
    }
}

/// Classifies every line of `raw`, paired with its 0-based index.
///
/// Tab-indented lines below a class header belong to the class section and
/// are skipped until the next vendor line.
fn tokenize(raw: &str) -> Vec<(usize, &str, Result<RegistryLine, LineErrorKind>)> {
    let mut in_class_section = false;
    raw.lines()
        .enumerate()
        .map(|(index, line)| {
            if in_class_section && line.starts_with('\t') {
                return (index, line, Ok(RegistryLine::Skipped(SkipReason::Class)));
            }
            let classified = classify(line);
            match &classified {
                Ok(RegistryLine::Skipped(SkipReason::Class)) => in_class_section = true,
                Ok(RegistryLine::Skipped(_)) => {}
                _ => in_class_section = false,
            }
            (index, line, classified)
        })
        .collect()
}
