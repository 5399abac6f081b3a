//! Dispatcher discovery record
//!
//! The dispatcher writes a small plaintext file at startup so workers can find
//! it without any configured address: line 1 is the host, line 2 the decimal
//! port. The write is a whole-file overwrite of any prior record; there is no
//! further atomicity guarantee. Each worker reads the file once at bootstrap.

use anyhow::{Context, Result};
use std::path::Path;

/// Address and port a dispatcher advertises to workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub host: String,
    pub port: u16,
}

impl DiscoveryRecord {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Write the two-line record, replacing any existing file
    pub fn publish(&self, path: &Path) -> Result<()> {
        std::fs::write(path, format!("{}\n{}\n", self.host, self.port))
            .with_context(|| format!("Failed to write discovery record: {}", path.display()))
    }

    /// Read a record back from a file written by [`publish`](Self::publish)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read discovery record: {}", path.display()))?;

        let mut lines = lines_of(&content);
        let host = lines
            .next()
            .context("Discovery record is missing the host line")?
            .to_string();
        let port = lines
            .next()
            .context("Discovery record is missing the port line")?;
        let port = port
            .parse::<u16>()
            .with_context(|| format!("Invalid port in discovery record: {:?}", port))?;

        Ok(Self { host, port })
    }

    /// Socket address string for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn lines_of(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatcher.addr");

        let record = DiscoveryRecord::new("10.0.0.5", 8771);
        record.publish(&path).unwrap();

        let loaded = DiscoveryRecord::load(&path).unwrap();
        assert_eq!(loaded.host, "10.0.0.5");
        assert_eq!(loaded.port, 8771);
        assert_eq!(loaded.address(), "10.0.0.5:8771");
    }

    #[test]
    fn test_publish_overwrites_prior_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatcher.addr");

        DiscoveryRecord::new("old-host", 1111).publish(&path).unwrap();
        DiscoveryRecord::new("new-host", 2222).publish(&path).unwrap();

        let loaded = DiscoveryRecord::load(&path).unwrap();
        assert_eq!(loaded, DiscoveryRecord::new("new-host", 2222));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DiscoveryRecord::load(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_load_rejects_bad_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatcher.addr");

        std::fs::write(&path, "somehost\nnot-a-port\n").unwrap();
        assert!(DiscoveryRecord::load(&path).is_err());

        std::fs::write(&path, "somehost\n").unwrap();
        assert!(DiscoveryRecord::load(&path).is_err());
    }
}
