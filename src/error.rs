use std::fmt;
use std::path::PathBuf;

/// Errors returned by the registry source, parser and query layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The registry text could not be obtained.
    #[error("PCI ID registry unavailable")]
    SourceUnavailable(#[from] SourceError),

    /// A registry line could not be parsed (strict parsing only).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A query was built from something other than 1, 2 or 4 identifiers.
    #[error("invalid number of arguments ({0}), expected 1, 2, or 4 PCI IDs (e.g. 10de 1467)")]
    InvalidArgumentCount(usize),
}

/// Why fetching the registry text failed.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not download {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response status code from {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not read local file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A registry line that does not follow the vendor/device/sub-device layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_number}: {reason}: {line:?}")]
pub struct ParseError {
    /// 1-based line number in the registry text.
    pub line_number: usize,
    pub line: String,
    pub reason: LineErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineErrorKind {
    #[error("malformed {kind} line at column {column}, expected {expected}")]
    Malformed {
        kind: LineKind,
        column: usize,
        expected: String,
    },

    #[error("unsupported indentation depth {0}")]
    Indentation(usize),

    #[error("device line without a preceding vendor line")]
    OrphanDevice,

    #[error("sub-device line without a preceding device line")]
    OrphanSubDevice,
}

/// The three kinds of data line, keyed by leading-tab depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Vendor,
    Device,
    SubDevice,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineKind::Vendor => "vendor",
            LineKind::Device => "device",
            LineKind::SubDevice => "sub-device",
        })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
