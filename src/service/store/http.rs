//! S3-compatible object gateway backend for the blob store.
//!
//! Objects are written with a plain `PUT {endpoint}/{bucket}/{key}` carrying
//! a bearer token, the shape exposed by MinIO-style gateways and storage
//! proxies. The returned locator is the object URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericStoreClient, StoreClient};

// Extra methods on `StoreClient` applied by the http gateway implementation.

impl StoreClient {
    pub fn http(config: &Config) -> Self {
        let client = HttpStoreClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// HTTP object gateway client implementation.
#[derive(Clone)]
pub struct HttpStoreClient {
    client: reqwest::Client,
    config: Config,
}

impl HttpStoreClient {
    /// Create a new HTTP store client.
    #[instrument(name = "HttpStoreClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build().unwrap_or_default();

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Object URL for a key within the configured bucket.
    fn object_url(&self, endpoint: &str, key: &str) -> String {
        format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.config.storage_bucket, key)
    }
}

#[async_trait]
impl GenericStoreClient for HttpStoreClient {
    #[instrument(name = "HttpStoreClient::put_object", skip(self, bytes))]
    async fn put_object(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Res<String> {
        let Some(endpoint) = self.config.storage_endpoint.as_deref() else {
            return Err(anyhow::anyhow!("Blob storage endpoint is not configured."));
        };

        let url = self.object_url(endpoint, key);

        let mut request = self.client.put(&url).header(reqwest::header::CONTENT_TYPE, content_type).body(bytes);

        if let Some(token) = self.config.storage_access_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Blob storage upload failed with status {}.", response.status()));
        }

        info!("Uploaded artifact to {url}.");

        Ok(url)
    }
}

// Tests.
