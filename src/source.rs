//! Where the registry text comes from: the upstream mirror or a local copy.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::error::SourceError;

/// GitHub mirror of the upstream registry.
pub const REMOTE_URL: &str = "https://raw.githubusercontent.com/pciutils/pciids/master/pci.ids";

/// When set, the registry is read from this path instead of downloaded.
pub const LOCAL_PATH_ENV_VAR: &str = "PCIIDS_LOCAL_PATH";

/// Upper bound on a whole download, connect to last byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    Remote { url: String, timeout: Duration },
    Local(PathBuf),
}

impl Default for RegistrySource {
    fn default() -> Self {
        RegistrySource::remote(REMOTE_URL)
    }
}

impl RegistrySource {
    pub fn remote(url: &str) -> Self {
        RegistrySource::Remote {
            url: String::from(url),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn local<P: AsRef<Path>>(path: P) -> Self {
        RegistrySource::Local(path.as_ref().to_path_buf())
    }

    /// The local file named by `PCIIDS_LOCAL_PATH`, or the default mirror.
    pub fn from_env() -> Self {
        match env::var_os(LOCAL_PATH_ENV_VAR) {
            Some(path) => RegistrySource::Local(PathBuf::from(path)),
            None => RegistrySource::default(),
        }
    }

    /// Replaces the download timeout. Local sources ignore it.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            RegistrySource::Remote { url, .. } => RegistrySource::Remote { url, timeout },
            local => local,
        }
    }

    /// Returns the raw registry text.
    pub fn fetch(&self) -> Result<String, SourceError> {
        match self {
            RegistrySource::Remote { url, timeout } => download(url, *timeout),
            RegistrySource::Local(path) => read_local(path),
        }
    }
}

/// Downloads the latest registry from the default mirror.
pub fn latest() -> Result<String, SourceError> {
    RegistrySource::default().fetch()
}

fn download(url: &str, timeout: Duration) -> Result<String, SourceError> {
    debug!("downloading {}", url);

    let http_err = |source| SourceError::Http {
        url: String::from(url),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_err)?;
    let response = client.get(url).send().map_err(http_err)?;

    let status = response.status();
    debug!("{}", status);
    if !status.is_success() {
        return Err(SourceError::Status {
            url: String::from(url),
            status,
        });
    }

    response.text().map_err(http_err)
}

fn read_local(path: &Path) -> Result<String, SourceError> {
    debug!("reading: {}", path.display());

    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::VOODOO;
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn test_local() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(VOODOO.as_bytes())?;

        let raw = RegistrySource::local(file.path()).fetch()?;
        assert!(raw.contains("121a"));
        assert_eq!(raw, VOODOO);
        Ok(())
    }

    #[test]
    fn test_local_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pci.ids");

        match RegistrySource::local(&path).fetch() {
            Err(SourceError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an I/O error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_remote_bad_url() {
        let source = RegistrySource::remote("not a url").with_timeout(Duration::from_secs(1));
        match source.fetch() {
            Err(SourceError::Http { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_timeout() {
        let timeout = Duration::from_millis(250);
        assert_eq!(
            RegistrySource::default().with_timeout(timeout),
            RegistrySource::Remote {
                url: String::from(REMOTE_URL),
                timeout,
            }
        );
        let local = RegistrySource::local("/usr/share/misc/pci.ids");
        assert_eq!(local.clone().with_timeout(timeout), local);
    }
}
