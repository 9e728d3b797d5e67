use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::core::VqaClient;
use crate::transport::{Connector, TcpConnector};
use crate::types::{VqaRequest, VqaResponse};
use crate::Result;

/// Cloneable handle that serializes access to one [`VqaClient`].
///
/// The lock is held for the whole reconnect-and-retry sequence of a query, so
/// concurrent callers queue up behind each other on the single connection.
pub struct SharedVqaClient<C: Connector = TcpConnector> {
    inner: Arc<Mutex<VqaClient<C>>>,
}

impl<C: Connector> Clone for SharedVqaClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> SharedVqaClient<C> {
    pub fn new(client: VqaClient<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    pub async fn query(&self, request: &VqaRequest) -> Result<VqaResponse> {
        self.inner.lock().await.query(request).await
    }

    pub async fn reconnect(&self) -> bool {
        self.inner.lock().await.reconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected()
    }

    pub async fn close(&self) {
        self.inner.lock().await.close().await
    }
}

impl<C: Connector> From<VqaClient<C>> for SharedVqaClient<C> {
    fn from(client: VqaClient<C>) -> Self {
        Self::new(client)
    }
}
