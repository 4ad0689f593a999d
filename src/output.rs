use crate::pci_id::PciId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `vendor:device [subvendor:subdevice] - names` line per record.
    Text,
    /// An indented JSON array of records.
    Json,
}

pub fn render(ids: &[PciId], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(ids),
    }
}
