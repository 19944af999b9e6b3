//! Nodes, data payloads and links for CyMiDB.
//!
//! A [`Node`] is one frozen version of a logical entity: its random identity,
//! its [`NodeType`], a version counter, a creation timestamp and an ordered
//! sequence of [`Data`] payloads. A [`Link`] is an unversioned directed edge
//! between two identities.
//!
//! Domain objects do not get their own storage shape. They implement
//! [`Noder`] to turn themselves into a node and [`TypedView`] to come back
//! from one, using the [`codec`] functions for their payloads.
//!
//! # Design Rules
//!
//! 1. The encoded data buffer is the durable form; the decoded sequence is a
//!    cache rebuilt from it on first read.
//! 2. Replacing the data sequence re-encodes the buffer immediately.
//! 3. Node equality covers identity, type, version, date and the encoded
//!    buffer, never object identity.
//! 4. Decoding a typed view checks the node type before touching payloads.

pub mod codec;
pub mod data;
pub mod error;
pub mod link;
pub mod node;
pub mod view;

pub use data::Data;
pub use error::{NodeError, NodeResult};
pub use link::Link;
pub use node::Node;
pub use view::{compare_noders, Noder, TypedView};

pub use cymi_types::{Category, DataType, NodeId, NodeType};
