//! Filesystem backend
//!
//! Layout: one regular file per blob directly under the root directory,
//! named exactly like the blob. Writes go to a hidden temporary file that is
//! renamed into place, so a blob is either fully visible or not at all.
//! Hidden entries (leading `.`) are never listed. The temporary file is
//! unlinked whenever a store does not reach the rename, including when the
//! store is canceled mid-write.

use super::Interface;
use crate::{BlobInfo, BlobList, Context, Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Longest file name the backend will create (NAME_MAX on common filesystems)
const MAX_NAME_LEN: usize = 255;

/// Prefix of in-flight temporary files; hidden, and independent of the blob name
const TMP_PREFIX: &str = ".tmp.";

/// A backend storing blobs as files in a single directory
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open a backend rooted at `root`, creating the directory if needed
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened fs backend");
        Ok(FsBackend { root })
    }

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn read_listing(&self, prefix: &str) -> Result<BlobList> {
        let mut list = BlobList::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !allowed_name(name) || !name.starts_with(prefix) {
                continue;
            }

            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Deleted between read_dir and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !meta.is_file() {
                continue;
            }

            list.push(BlobInfo::new(name, meta.len()));
        }

        list.sort();
        Ok(list)
    }

    async fn write_atomic(&self, name: &str, data: &[u8]) -> Result<()> {
        // The TempPath unlinks on drop, so an error or a dropped future
        // before `persist` never leaves the temporary behind
        let (file, tmp) = tempfile::Builder::new()
            .prefix(TMP_PREFIX)
            .tempfile_in(&self.root)?
            .into_parts();

        let mut file = tokio::fs::File::from_std(file);
        file.write_all(data).await?;
        file.flush().await?;
        drop(file);

        tmp.persist(self.blob_path(name)).map_err(|e| {
            tracing::warn!(name, error = %e.error, "failed to rename temporary file");
            Error::Io(e.error)
        })
    }

    async fn read_blob(&self, name: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.blob_path(name)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(name.to_string())),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn remove_blob(&self, name: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.blob_path(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Whether `name` can be stored as a file directly under the root
///
/// Hidden names are reserved for temporary files, separators would escape
/// the root directory, and NUL bytes or over-long names cannot be files.
pub fn allowed_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[async_trait]
impl Interface for FsBackend {
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<BlobList> {
        let list = ctx.run(self.read_listing(prefix)).await?;
        tracing::debug!(prefix, count = list.len(), "listed fs blobs");
        Ok(list)
    }

    async fn store(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<()> {
        if !allowed_name(name) {
            return Err(Error::InvalidName(name.to_string()));
        }

        ctx.run(self.write_atomic(name, data)).await?;
        tracing::debug!(name, size = data.len(), "stored fs blob");
        Ok(())
    }

    async fn load(&self, ctx: &Context, name: &str) -> Result<Vec<u8>> {
        if !allowed_name(name) {
            ctx.check()?;
            return Err(Error::NotFound(name.to_string()));
        }

        ctx.run(self.read_blob(name)).await
    }

    async fn delete(&self, ctx: &Context, name: &str) -> Result<()> {
        if !allowed_name(name) {
            return ctx.check();
        }

        if ctx.run(self.remove_blob(name)).await? {
            tracing::debug!(name, "deleted fs blob");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_allowed_name() {
        assert!(allowed_name("foo-1"));
        assert!(allowed_name("a.b.c"));
        assert!(!allowed_name(""));
        assert!(!allowed_name(".hidden"));
        assert!(!allowed_name("dir/file"));
        assert!(!allowed_name("..\\up"));
        assert!(!allowed_name("../up"));
        assert!(!allowed_name("a\0b"));
        assert!(allowed_name(&"x".repeat(MAX_NAME_LEN)));
        assert!(!allowed_name(&"x".repeat(MAX_NAME_LEN + 1)));
    }

    #[test]
    fn test_new_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("blobs");

        let backend = FsBackend::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_blob_is_plain_file() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        backend.store(&ctx, "greeting", b"hello").await.unwrap();
        let on_disk = std::fs::read(dir.path().join("greeting")).unwrap();
        assert_eq!(on_disk, b"hello");
    }

    #[tokio::test]
    async fn test_store_leaves_no_temporaries() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        backend.store(&ctx, "a", b"1").await.unwrap();
        backend.store(&ctx, "a", b"2").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["a"]);
    }

    #[tokio::test]
    async fn test_list_skips_hidden_and_directories() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        std::fs::write(dir.path().join(".a.123.0.tmp"), b"partial").unwrap();
        std::fs::write(dir.path().join(".hidden"), b"secret").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        backend.store(&ctx, "visible", b"ok").await.unwrap();

        let list = backend.list(&ctx, "").await.unwrap();
        assert_eq!(list.names(), vec!["visible"]);
        assert_eq!(list[0].size, 2);
    }

    #[tokio::test]
    async fn test_list_sorts_directory_order() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        for name in ["zeta", "alpha", "mid", "alpha-2"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }

        let list = backend.list(&ctx, "").await.unwrap();
        assert_eq!(list.names(), vec!["alpha", "alpha-2", "mid", "zeta"]);
        assert_eq!(
            backend.list(&ctx, "alpha").await.unwrap().names(),
            vec!["alpha", "alpha-2"]
        );
    }

    #[tokio::test]
    async fn test_invalid_names() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        let err = backend.store(&ctx, "../escape", b"x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        assert!(!dir.path().parent().unwrap().join("escape").exists());

        let err = backend.load(&ctx, ".hidden").await.unwrap_err();
        assert!(err.is_not_found());

        backend.delete(&ctx, "a/b").await.unwrap();
    }

    #[tokio::test]
    async fn test_unrepresentable_names_are_absent() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        for name in ["x".repeat(300), "a\0b".to_string()] {
            let err = backend.load(&ctx, &name).await.unwrap_err();
            assert!(err.is_not_found(), "load {:?}: {:?}", name, err);

            backend.delete(&ctx, &name).await.unwrap();

            let err = backend.store(&ctx, &name, b"x").await.unwrap_err();
            assert!(matches!(err, Error::InvalidName(_)));
        }
    }

    #[tokio::test]
    async fn test_store_long_name() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let ctx = Context::background();

        for len in [250, MAX_NAME_LEN] {
            let name = "y".repeat(len);
            backend.store(&ctx, &name, b"v").await.unwrap();
            assert_eq!(backend.load(&ctx, &name).await.unwrap(), b"v");
        }
        assert_eq!(backend.list(&ctx, "y").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_interrupted_store_leaves_no_temporaries() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        let data = vec![7u8; 64 * 1024 * 1024];

        let ctx = Context::background().with_timeout(Duration::from_millis(1));
        let result = backend.store(&ctx, "big", &data).await;

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        match result {
            // The write may still win the race on a fast disk
            Ok(()) => assert_eq!(entries, vec!["big"]),
            Err(e) => {
                assert!(matches!(e, Error::DeadlineExceeded), "{:?}", e);
                assert!(entries.is_empty(), "left behind: {:?}", entries);
            }
        }
    }

    #[tokio::test]
    async fn test_reopen_sees_existing_blobs() {
        let dir = tempdir().unwrap();
        let ctx = Context::background();

        {
            let backend = FsBackend::new(dir.path()).unwrap();
            backend.store(&ctx, "persistent", b"still here").await.unwrap();
        }

        let backend = FsBackend::new(dir.path()).unwrap();
        assert_eq!(
            backend.load(&ctx, "persistent").await.unwrap(),
            b"still here"
        );
    }

    #[tokio::test]
    async fn test_missing_root_is_io_error() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().join("gone")).unwrap();
        std::fs::remove_dir(backend.root()).unwrap();

        let err = backend
            .list(&Context::background(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
