//! Adapter for connections that carry ambient identity state
//!
//! Some transports authorize a call by a preceding "set user context"
//! command on the same connection. Two callers sharing such a connection
//! could interleave and run a call under the other caller's identity.
//! [`SerializedClient`] closes that window: it owns the connection behind an
//! async mutex and performs "set context, then call" as one step, which lets
//! it implement the credential-per-call [`FileService`] contract.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::RemoteResult;
use crate::service::FileService;
use crate::types::{ContentInfoMap, Credential, FileInfo};

/// A connection whose calls run under a previously selected user
#[async_trait]
pub trait StatefulClient: Send {
    /// Select the user subsequent calls run under (empty user id = admin)
    async fn set_user_context(&mut self, user_id: &str) -> RemoteResult<()>;

    async fn list(&mut self, dir: &str) -> RemoteResult<ContentInfoMap>;

    async fn stat(&mut self, path: &str) -> RemoteResult<FileInfo>;

    async fn get(&mut self, path: &str) -> RemoteResult<Vec<u8>>;
}

/// Serializes access to a [`StatefulClient`]
///
/// The user context is set before every call, never cached, so a context
/// left behind by a failed call cannot leak into the next one.
pub struct SerializedClient<C> {
    inner: Mutex<C>,
}

impl<C: StatefulClient> SerializedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Mutex::new(client),
        }
    }

    /// Take the connection back
    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }
}

#[async_trait]
impl<C: StatefulClient> FileService for SerializedClient<C> {
    async fn list(&self, who: &Credential, dir: &str) -> RemoteResult<ContentInfoMap> {
        let mut conn = self.inner.lock().await;
        conn.set_user_context(who.user_id()).await?;
        tracing::debug!(user = %who, dir, "remote list");
        conn.list(dir).await
    }

    async fn stat(&self, who: &Credential, path: &str) -> RemoteResult<FileInfo> {
        let mut conn = self.inner.lock().await;
        conn.set_user_context(who.user_id()).await?;
        tracing::debug!(user = %who, path, "remote stat");
        conn.stat(path).await
    }

    async fn get(&self, who: &Credential, path: &str) -> RemoteResult<Vec<u8>> {
        let mut conn = self.inner.lock().await;
        conn.set_user_context(who.user_id()).await?;
        tracing::debug!(user = %who, path, "remote get");
        conn.get(path).await
    }
}
