//! # simpleblob
//!
//! A backend-agnostic blob storage interface.
//!
//! Applications store, load, list, and delete named byte blobs through one
//! [`Interface`] and choose the physical backend (local filesystem, memory,
//! or anything else implementing the trait) at runtime.
//!
//! ## Core Concepts
//!
//! - **Blobs**: opaque byte content under a unique name; storing a name again
//!   replaces its content
//! - **Listings**: [`BlobList`]s of name + size, always sorted by name and
//!   filtered by prefix
//! - **Context**: every operation takes a [`Context`] that can cancel it or
//!   bound it with a deadline
//! - **Conformance**: [`tester::run_backend_tests`] certifies that a backend
//!   honors the contract
//!
//! ## Example
//!
//! ```ignore
//! use simpleblob::{Context, FsBackend, Interface};
//!
//! let backend = FsBackend::new("/var/lib/blobs")?;
//! let ctx = Context::background();
//! backend.store(&ctx, "greeting", b"hello").await?;
//! let names = backend.list(&ctx, "greet").await?.names();
//! ```

pub mod backends;
pub mod config;
pub mod credentials;
pub mod model;
pub mod tester;

mod context;
mod error;

pub use backends::{open, BackendConfig, FsBackend, Interface, MemoryBackend};
pub use config::Config;
pub use context::Context;
pub use credentials::{CredentialProvider, CredentialValue, FileSecretsCredentials};
pub use error::{Error, Result};
pub use model::{BlobInfo, BlobList};
