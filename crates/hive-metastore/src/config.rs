// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connection settings for a Hive Metastore.

use std::time::Duration;

use url::Url;

use crate::metastore::{MetastoreError, MetastoreResult};
use crate::namespace::DEFAULT_CATALOG_NAME;

pub const DEFAULT_METASTORE_PORT: u16 = 9083;

/// Configuration for connecting to a Hive Metastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetastoreConfig {
    /// Metastore URI (e.g., `thrift://localhost:9083`).
    pub uri: String,
    /// Catalog used when a call does not name one.
    pub default_catalog: String,
    /// Optional socket timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for MetastoreConfig {
    fn default() -> Self {
        Self::new(format!("thrift://localhost:{DEFAULT_METASTORE_PORT}"))
    }
}

impl MetastoreConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into().trim_end_matches('/').to_string(),
            default_catalog: DEFAULT_CATALOG_NAME.to_string(),
            timeout_secs: None,
        }
    }

    pub fn with_default_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.default_catalog = catalog.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Host and port a transport should connect to.
    pub fn endpoint(&self) -> MetastoreResult<(String, u16)> {
        let url = Url::parse(&self.uri).map_err(|e| {
            MetastoreError::InvalidArgument(format!("invalid metastore URI '{}': {}", self.uri, e))
        })?;
        if url.scheme() != "thrift" {
            return Err(MetastoreError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url.host_str().ok_or_else(|| {
            MetastoreError::InvalidArgument(format!("metastore URI '{}' has no host", self.uri))
        })?;
        Ok((host.to_string(), url.port().unwrap_or(DEFAULT_METASTORE_PORT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = MetastoreConfig::new("thrift://metastore.internal:9999/");
        assert_eq!(config.uri, "thrift://metastore.internal:9999");
        assert_eq!(
            config.endpoint().unwrap(),
            ("metastore.internal".to_string(), 9999)
        );
    }

    #[test]
    fn test_endpoint_default_port() {
        let config = MetastoreConfig::new("thrift://hms");
        assert_eq!(config.endpoint().unwrap(), ("hms".to_string(), 9083));
    }

    #[test]
    fn test_endpoint_rejects_other_schemes() {
        let err = MetastoreConfig::new("http://hms:9083").endpoint().unwrap_err();
        assert!(matches!(err, MetastoreError::UnsupportedScheme(s) if s == "http"));
        assert!(MetastoreConfig::new("not a uri").endpoint().is_err());
    }

    #[test]
    fn test_builder() {
        let config = MetastoreConfig::default()
            .with_default_catalog("spark")
            .with_timeout(30);
        assert_eq!(config.uri, "thrift://localhost:9083");
        assert_eq!(config.default_catalog, "spark");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }
}
