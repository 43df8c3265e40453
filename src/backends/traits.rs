//! Storage interface trait definition

use crate::{BlobList, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The storage contract every backend implements
///
/// Implementations can use:
/// - Local filesystems
/// - In-memory maps (for tests and ephemeral data)
/// - Networked object stores
///
/// Every implementation must uphold the same guarantees, which
/// [`crate::tester::run_backend_tests`] checks:
/// - `list` output is sorted ascending by name and filtered by prefix
/// - `store` fully replaces any previous content for the name
/// - `load` returns bytes the caller owns; nothing the caller does to them,
///   or to the slice it passed to `store`, reaches the stored state
/// - `load` of an absent name fails with [`crate::Error::NotFound`]
/// - `delete` of an absent name succeeds
///
/// Every operation aborts with `Canceled` or `DeadlineExceeded` when its
/// context fires.
#[async_trait]
pub trait Interface: Send + Sync {
    /// List blobs whose name starts with `prefix`, sorted by name
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<BlobList>;

    /// Create or overwrite the blob `name`
    async fn store(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<()>;

    /// Read the full content of the blob `name`
    async fn load(&self, ctx: &Context, name: &str) -> Result<Vec<u8>>;

    /// Remove the blob `name` if it exists
    async fn delete(&self, ctx: &Context, name: &str) -> Result<()>;
}

#[async_trait]
impl<T: Interface + ?Sized> Interface for Box<T> {
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<BlobList> {
        (**self).list(ctx, prefix).await
    }

    async fn store(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<()> {
        (**self).store(ctx, name, data).await
    }

    async fn load(&self, ctx: &Context, name: &str) -> Result<Vec<u8>> {
        (**self).load(ctx, name).await
    }

    async fn delete(&self, ctx: &Context, name: &str) -> Result<()> {
        (**self).delete(ctx, name).await
    }
}

#[async_trait]
impl<T: Interface + ?Sized> Interface for Arc<T> {
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<BlobList> {
        (**self).list(ctx, prefix).await
    }

    async fn store(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<()> {
        (**self).store(ctx, name, data).await
    }

    async fn load(&self, ctx: &Context, name: &str) -> Result<Vec<u8>> {
        (**self).load(ctx, name).await
    }

    async fn delete(&self, ctx: &Context, name: &str) -> Result<()> {
        (**self).delete(ctx, name).await
    }
}
