//! CyMiDB: a versioned node store with links and typed views.
//!
//! [`Db`] is the entry point. It persists anything implementing
//! [`Noder`], assigns versions, stores links and walks them. Typed views
//! in [`views`] give devices, identities, hooks, files and directories a
//! Rust shape while the store only ever sees nodes.
//!
//! ```no_run
//! use cymi_db::{Db, DbConfig};
//! use cymi_db::views::Dir;
//!
//! # fn main() -> cymi_db::DbResult<()> {
//! let db = Db::create(&DbConfig::default(), "laptop", "")?;
//! let root = Dir::new("/", 0o777);
//! let docs = Dir::new("Documents", 0o777);
//! db.save_all(&[&root, &docs])?;
//! root.add_subdir(&db, &docs)?;
//! assert_eq!(root.get_dirs(&db)?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod views;

pub use config::{DbConfig, LogConfig, StorageConfig};
pub use db::Db;
pub use error::{DbError, DbResult};

// Re-export key types
pub use cymi_node::{compare_noders, Data, Link, Node, NodeError, Noder, TypedView};
pub use cymi_store::{Backend, FileBackend, InMemoryBackend, StoreError, SyncMode};
pub use cymi_types::{Category, DataType, NodeId, NodeType};
