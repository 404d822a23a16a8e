// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Object storage for table locations.
//!
//! Hive tables live on HDFS-compatible URLs. `s3`, `s3a` and `s3n` are all
//! served by the S3 client; `file` is handled by DataFusion's built-in local
//! store.

use std::sync::Arc;

use datafusion::execution::context::SessionContext;
use hive_metastore::{MetastoreError, MetastoreResult};
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use serde::Deserialize;
use url::Url;

pub const S3_SCHEMES: &[&str] = &["s3", "s3a", "s3n"];
pub const LOCAL_SCHEME: &str = "file";

/// Credentials and endpoint for S3-compatible storage.
///
/// Unset fields are left to the S3 client's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Custom endpoint (e.g., `http://localhost:9000` for MinIO).
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Allow plain HTTP. Defaults to whether `endpoint` is an `http:` URL.
    pub allow_http: Option<bool>,
}

impl StorageConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_allow_http(mut self, allow_http: bool) -> Self {
        self.allow_http = Some(allow_http);
        self
    }

    fn s3_builder(&self, bucket: &str) -> AmazonS3Builder {
        let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
        if let Some(region) = &self.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http:"));
        }
        if let Some(allow_http) = self.allow_http {
            builder = builder.with_allow_http(allow_http);
        }
        if let Some(access_key_id) = &self.access_key_id {
            builder = builder.with_access_key_id(access_key_id);
        }
        if let Some(secret_access_key) = &self.secret_access_key {
            builder = builder.with_secret_access_key(secret_access_key);
        }
        if let Some(token) = &self.session_token {
            builder = builder.with_token(token);
        }
        builder
    }

    /// Build the store serving `url`, or `None` for local files.
    pub fn object_store(&self, url: &Url) -> MetastoreResult<Option<Arc<dyn ObjectStore>>> {
        match url.scheme() {
            LOCAL_SCHEME => Ok(None),
            scheme if S3_SCHEMES.contains(&scheme) => {
                let bucket = url.host_str().ok_or_else(|| MetastoreError::InvalidLocation {
                    location: url.to_string(),
                    message: "missing bucket".to_string(),
                })?;
                let store = self.s3_builder(bucket).build().map_err(|e| {
                    MetastoreError::InvalidLocation {
                        location: url.to_string(),
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(Arc::new(store)))
            }
            other => Err(MetastoreError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Register the store for `url` in `ctx` under `scheme://bucket`.
    pub fn register_object_store(&self, ctx: &SessionContext, url: &Url) -> MetastoreResult<()> {
        let Some(store) = self.object_store(url)? else {
            return Ok(());
        };
        let store_url = store_url(url)?;
        tracing::debug!(store = %store_url, "registering object store");
        ctx.register_object_store(&store_url, store);
        Ok(())
    }
}

fn store_url(url: &Url) -> MetastoreResult<Url> {
    let base = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    Url::parse(&base).map_err(|e| MetastoreError::InvalidLocation {
        location: url.to_string(),
        message: e.to_string(),
    })
}
