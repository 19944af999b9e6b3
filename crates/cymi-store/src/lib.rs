//! Row storage for CyMiDB.
//!
//! This crate is the persistence boundary below the node layer. It stores two
//! kinds of rows and answers point and scan queries over them, without ever
//! interpreting node payloads:
//!
//! - [`NodeRow`] -- one version of a node: identity, type, version, date, buffer
//! - [`LinkRow`] -- a directed edge between two node identities
//!
//! # Storage Backends
//!
//! All backends implement the [`Backend`] trait:
//!
//! - [`InMemoryBackend`] -- `Vec`/`HashMap` index for tests and embedding
//! - [`FileBackend`] -- CRC-framed append-only log replayed into memory on open
//!
//! # Design Rules
//!
//! 1. Node rows are append-only; a version is never rewritten.
//! 2. Inserting a node row is a compare-and-swap on the latest stored version,
//!    so two writers cannot both claim the same next version.
//! 3. Link rows are not validated: duplicates, cycles and dangling ends are kept.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod row;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileBackend, SyncMode};
pub use memory::InMemoryBackend;
pub use row::{LinkRow, NodeRow};
pub use traits::Backend;
