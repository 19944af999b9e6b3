//! Foundation types for CyMiDB.
//!
//! This crate provides the identifiers every other CyMiDB crate builds on.
//! It has no knowledge of nodes, payloads or storage.
//!
//! # Key Types
//!
//! - [`NodeId`] — Random 256-bit identity of a logical entity, stable across versions
//! - [`Category`] — One of the seven coarse node categories
//! - [`NodeType`] — 64-bit node type: a category base plus an optional hashed sub-type
//! - [`DataType`] — 64-bit tag distinguishing payload kinds attached to a node
//!
//! # Derivation
//!
//! Type identifiers are derived from namespaced names with SHA-256 and must
//! stay bit-exact so that previously stored nodes keep resolving:
//!
//! - `DataType::new(name)` = first 8 digest bytes, little-endian.
//! - `category.sub_type(name)` = `category.base() + (first 8 digest bytes LE mod 2^56)`.

pub mod error;
pub mod id;
pub mod kind;

pub use error::TypeError;
pub use id::{NodeId, NODE_ID_LEN};
pub use kind::{Category, DataType, NodeType};
