//! Conformance tests for backend implementations
//!
//! Any [`Interface`] implementation can be certified by running
//! [`run_backend_tests`] against a freshly provisioned, empty instance:
//!
//! ```ignore
//! #[tokio::test]
//! async fn my_backend_conforms() {
//!     let backend = MyBackend::new();
//!     simpleblob::tester::run_backend_tests(&backend).await;
//! }
//! ```
//!
//! The functions panic with a descriptive message on the first violation.

use crate::{Context, Error, Interface};
use std::time::Duration;

/// Drive `backend` through the full storage contract
///
/// The backend must start out empty.
pub async fn run_backend_tests<B: Interface + ?Sized>(backend: &B) {
    let ctx = Context::background().with_cancel();

    // Starts empty
    let ls = backend.list(&ctx, "").await.expect("list on empty backend");
    assert!(ls.is_empty(), "fresh backend should be empty, got {:?}", ls.names());

    // Add items
    let mut foo = b"foo".to_vec(); // modified after store
    backend.store(&ctx, "foo-1", &foo).await.expect("store foo-1");
    backend.store(&ctx, "bar-2", b"bar2").await.expect("store bar-2");
    backend.store(&ctx, "bar-1", b"bar").await.expect("store bar-1");

    // Overwrite
    backend
        .store(&ctx, "bar-1", b"bar1")
        .await
        .expect("overwrite bar-1");

    // List all
    let ls = backend.list(&ctx, "").await.expect("list all");
    assert_eq!(
        ls.names(),
        vec!["bar-1", "bar-2", "foo-1"],
        "list should return every name, sorted"
    );

    // List with prefix
    let ls = backend.list(&ctx, "foo-").await.expect("list foo-");
    assert_eq!(ls.names(), vec!["foo-1"], "prefix filter foo-");
    assert_eq!(ls[0].size, 3, "size of foo-1");

    let ls = backend.list(&ctx, "bar-").await.expect("list bar-");
    assert_eq!(
        ls.names(),
        vec!["bar-1", "bar-2"],
        "prefix filter bar- should be sorted"
    );

    // List with non-existing prefix
    let ls = backend
        .list(&ctx, "does-not-exist-")
        .await
        .expect("list with unmatched prefix should not fail");
    assert!(ls.is_empty(), "unmatched prefix returned {:?}", ls.names());

    // Load
    let data = backend.load(&ctx, "foo-1").await.expect("load foo-1");
    assert_eq!(data, b"foo", "content of foo-1");

    // Check overwritten data
    let mut data = backend.load(&ctx, "bar-1").await.expect("load bar-1");
    assert_eq!(data, b"bar1", "overwrite should replace content");

    // Verify that load returns a copy
    data[0] = b'!';
    let data = backend.load(&ctx, "bar-1").await.expect("reload bar-1");
    assert_eq!(data, b"bar1", "mutating a loaded buffer changed stored data");

    // Change foo buffer to verify that store made a copy
    foo[0] = b'!';
    let data = backend.load(&ctx, "foo-1").await.expect("reload foo-1");
    assert_eq!(data, b"foo", "mutating the stored buffer changed stored data");

    // Load non-existing
    let err = backend
        .load(&ctx, "does-not-exist")
        .await
        .expect_err("load of absent name should fail");
    assert!(err.is_not_found(), "expected not found, got {:?}", err);

    // Delete existing
    backend.delete(&ctx, "foo-1").await.expect("delete foo-1");

    // Delete non-existing
    backend
        .delete(&ctx, "foo-1")
        .await
        .expect("second delete of foo-1 should succeed");

    // Should not exist anymore
    let err = backend
        .load(&ctx, "foo-1")
        .await
        .expect_err("load of deleted name should fail");
    assert!(err.is_not_found(), "expected not found, got {:?}", err);

    // Should not appear in list anymore
    let ls = backend.list(&ctx, "").await.expect("list after delete");
    assert!(
        !ls.names().iter().any(|n| n == "foo-1"),
        "deleted name still listed: {:?}",
        ls.names()
    );

    ctx.cancel();
}

/// Check that every operation refuses to run once its context has fired
///
/// Leaves the backend contents unchanged when it conforms.
pub async fn run_cancellation_tests<B: Interface + ?Sized>(backend: &B) {
    let canceled = Context::background().with_cancel();
    canceled.cancel();
    check_aborted(backend, &canceled, |e| matches!(e, Error::Canceled)).await;

    let expired = Context::background().with_timeout(Duration::ZERO);
    check_aborted(backend, &expired, |e| matches!(e, Error::DeadlineExceeded)).await;

    let ctx = Context::background();
    let err = backend
        .load(&ctx, "canceled-blob")
        .await
        .expect_err("store under a fired context must not persist");
    assert!(err.is_not_found(), "expected not found, got {:?}", err);
}

/// Interrupt large stores partway through and check what remains visible
///
/// Each interrupted store must leave either the previous content or the
/// complete new content, never a torn blob or an extra listing entry. The
/// backend must start out empty and is left empty.
pub async fn run_interrupted_store_tests<B: Interface + ?Sized>(backend: &B) {
    let ctx = Context::background();
    let old = vec![1u8; 16];
    let new = vec![2u8; 32 * 1024 * 1024];

    backend
        .store(&ctx, "interrupted", &old)
        .await
        .expect("store interrupted");

    for micros in [0u64, 100, 500, 2_000] {
        let short = Context::background().with_timeout(Duration::from_micros(micros));

        // Overwrite of an existing blob
        check_interrupted_store(backend, &short, "interrupted", &new).await;
        let data = backend
            .load(&ctx, "interrupted")
            .await
            .expect("interrupted overwrite must keep the blob");
        assert!(
            data == old || data == new,
            "interrupted overwrite left {} bytes of torn content",
            data.len()
        );

        // Store of a new name
        check_interrupted_store(backend, &short, "interrupted-new", &new).await;
        match backend.load(&ctx, "interrupted-new").await {
            Ok(data) => assert!(data == new, "interrupted store left torn content"),
            Err(e) => assert!(e.is_not_found(), "expected not found, got {:?}", e),
        }

        let ls = backend.list(&ctx, "").await.expect("list after interrupt");
        for info in &ls {
            assert!(
                info.name == "interrupted" || info.name == "interrupted-new",
                "interrupted store left an extra entry {:?}",
                info.name
            );
            assert!(
                info.size == old.len() as u64 || info.size == new.len() as u64,
                "{} listed with torn size {}",
                info.name,
                info.size
            );
        }

        backend
            .delete(&ctx, "interrupted-new")
            .await
            .expect("delete interrupted-new");
    }

    backend
        .delete(&ctx, "interrupted")
        .await
        .expect("delete interrupted");
}

async fn check_interrupted_store<B>(backend: &B, ctx: &Context, name: &str, data: &[u8])
where
    B: Interface + ?Sized,
{
    match backend.store(ctx, name, data).await {
        Ok(()) | Err(Error::DeadlineExceeded) => {}
        Err(e) => panic!("interrupted store of {}: unexpected error {:?}", name, e),
    }
}

async fn check_aborted<B, F>(backend: &B, ctx: &Context, expected: F)
where
    B: Interface + ?Sized,
    F: Fn(&Error) -> bool,
{
    let err = backend.list(ctx, "").await.expect_err("list should abort");
    assert!(expected(&err), "list: unexpected error {:?}", err);

    let err = backend
        .store(ctx, "canceled-blob", b"data")
        .await
        .expect_err("store should abort");
    assert!(expected(&err), "store: unexpected error {:?}", err);

    let err = backend
        .load(ctx, "canceled-blob")
        .await
        .expect_err("load should abort");
    assert!(expected(&err), "load: unexpected error {:?}", err);

    let err = backend
        .delete(ctx, "canceled-blob")
        .await
        .expect_err("delete should abort");
    assert!(expected(&err), "delete: unexpected error {:?}", err);
}
