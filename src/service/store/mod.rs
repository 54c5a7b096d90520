pub mod http;

use crate::base::types::Res;
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

// Traits.

/// Generic blob store client trait that clients must implement.
///
/// The blob store is a black box: bytes in, locator out. Implementing this
/// trait allows different storage backends to hold report artifacts.
#[async_trait]
pub trait GenericStoreClient: Send + Sync + 'static {
    /// Uploads one object and returns its locator URL.
    ///
    /// The key is the full path within the configured bucket, e.g.
    /// `bug_20240101_120000_anonymous/console_logs.txt`.
    async fn put_object(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Res<String>;
}

// Structs.

/// Blob store client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<dyn GenericStoreClient>,
}

impl StoreClient {
    pub fn new(inner: Arc<dyn GenericStoreClient>) -> Self {
        Self { inner }
    }
}

impl Deref for StoreClient {
    type Target = dyn GenericStoreClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}
