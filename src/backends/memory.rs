//! In-memory backend
//!
//! Blobs live in an ordered map behind a read/write lock. Nothing is
//! persisted; dropping the backend drops its blobs.

use super::Interface;
use crate::{BlobInfo, BlobList, Context, Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A backend that keeps every blob in process memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl Interface for MemoryBackend {
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<BlobList> {
        ctx.check()?;

        let blobs = self.blobs.read();
        // Keys are ordered, so the matches form one contiguous run
        // starting at `prefix`.
        let list: BlobList = blobs
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, data)| BlobInfo::new(name.clone(), data.len() as u64))
            .collect();

        tracing::debug!(prefix, count = list.len(), "listed memory blobs");
        Ok(list)
    }

    async fn store(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<()> {
        ctx.check()?;

        self.blobs.write().insert(name.to_string(), data.to_vec());
        tracing::debug!(name, size = data.len(), "stored memory blob");
        Ok(())
    }

    async fn load(&self, ctx: &Context, name: &str) -> Result<Vec<u8>> {
        ctx.check()?;

        let blobs = self.blobs.read();
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    async fn delete(&self, ctx: &Context, name: &str) -> Result<()> {
        ctx.check()?;

        if self.blobs.write().remove(name).is_some() {
            tracing::debug!(name, "deleted memory blob");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prefix_scan_stops_at_first_mismatch() {
        let backend = MemoryBackend::new();
        let ctx = Context::background();

        for name in ["a", "b-1", "b-2", "b", "c-1"] {
            backend.store(&ctx, name, name.as_bytes()).await.unwrap();
        }

        let list = backend.list(&ctx, "b").await.unwrap();
        assert_eq!(list.names(), vec!["b", "b-1", "b-2"]);

        let list = backend.list(&ctx, "b-").await.unwrap();
        assert_eq!(list.names(), vec!["b-1", "b-2"]);

        let list = backend.list(&ctx, "z").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_sizes_follow_overwrites() {
        let backend = MemoryBackend::new();
        let ctx = Context::background();

        backend.store(&ctx, "k", b"short").await.unwrap();
        backend.store(&ctx, "k", b"much longer").await.unwrap();

        let list = backend.list(&ctx, "").await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].size, 11);
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_blob() {
        let backend = MemoryBackend::new();
        let ctx = Context::background();

        backend.store(&ctx, "empty", b"").await.unwrap();
        assert_eq!(backend.load(&ctx, "empty").await.unwrap(), Vec::<u8>::new());
        assert_eq!(backend.list(&ctx, "").await.unwrap()[0].size, 0);
    }

    #[tokio::test]
    async fn test_concurrent_stores() {
        let backend = std::sync::Arc::new(MemoryBackend::new());
        let ctx = Context::background();

        let mut handles = Vec::new();
        for i in 0..16 {
            let backend = backend.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("blob-{:02}", i);
                backend.store(&ctx, &name, name.as_bytes()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let list = backend.list(&ctx, "blob-").await.unwrap();
        assert_eq!(list.len(), 16);
        assert_eq!(list[0].name, "blob-00");
        assert_eq!(list[15].name, "blob-15");
    }

    #[tokio::test]
    async fn test_canceled_store_leaves_state_untouched() {
        let backend = MemoryBackend::new();
        let ctx = Context::background().with_cancel();
        ctx.cancel();

        let err = backend.store(&ctx, "x", b"data").await.unwrap_err();
        assert!(matches!(err, Error::Canceled));
        assert!(backend.is_empty());
    }
}
