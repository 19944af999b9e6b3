use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of the sub-type part of a [`NodeType`]; the top byte selects the category.
const CATEGORY_SHIFT: u32 = 56;

/// First 8 bytes of `SHA-256(name)`, read little-endian.
fn name_hash(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// Coarse category of a node, encoded in the top byte of its [`NodeType`].
///
/// The discriminants are part of the stored format and must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Device = 0,
    Identity = 1,
    Hook = 2,
    Acl = 3,
    Blob = 4,
    Link = 5,
    Tag = 6,
}

impl Category {
    /// All categories in their stored order.
    pub const ALL: [Category; 7] = [
        Self::Device,
        Self::Identity,
        Self::Hook,
        Self::Acl,
        Self::Blob,
        Self::Link,
        Self::Tag,
    ];

    /// The base [`NodeType`] of this category, `index * 2^56`.
    pub const fn base(self) -> NodeType {
        NodeType((self as u64) << CATEGORY_SHIFT)
    }

    /// Specialize this category with a namespaced sub-type name.
    ///
    /// Distinct names can collide within the 56-bit space; collisions are
    /// neither detected nor resolved.
    pub fn sub_type(self, name: &str) -> NodeType {
        self.base().sub_type(name)
    }

    fn from_index(index: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Identity => write!(f, "identity"),
            Self::Hook => write!(f, "hook"),
            Self::Acl => write!(f, "acl"),
            Self::Blob => write!(f, "blob"),
            Self::Link => write!(f, "link"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// 64-bit node type: a [`Category`] base plus an optional hashed sub-type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeType(u64);

impl NodeType {
    pub const DEVICE: Self = Category::Device.base();
    pub const IDENTITY: Self = Category::Identity.base();
    pub const HOOK: Self = Category::Hook.base();
    pub const ACL: Self = Category::Acl.base();
    pub const BLOB: Self = Category::Blob.base();
    pub const LINK: Self = Category::Link.base();
    pub const TAG: Self = Category::Tag.base();

    /// Wrap a raw stored value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add the hashed sub-type of `name` to this type.
    ///
    /// `SHA-256(name)` reduced modulo `2^56`, so the result stays inside the
    /// category when called on a category base.
    pub fn sub_type(self, name: &str) -> Self {
        let sub = name_hash(name) % (1u64 << CATEGORY_SHIFT);
        Self(self.0.wrapping_add(sub))
    }

    /// The category selected by the top byte, if it is one of the known seven.
    pub fn category(self) -> Option<Category> {
        Category::from_index(self.0 >> CATEGORY_SHIFT)
    }

    /// Returns `true` if this is a bare category base without sub-type.
    pub fn is_base(self) -> bool {
        self.0 & ((1u64 << CATEGORY_SHIFT) - 1) == 0
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({:#018x})", self.0)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(cat) if self.is_base() => write!(f, "{cat}"),
            Some(cat) => write!(f, "{cat}/{:014x}", self.0 & ((1u64 << CATEGORY_SHIFT) - 1)),
            None => write!(f, "{:#018x}", self.0),
        }
    }
}

/// 64-bit tag identifying the semantic kind of one payload on a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataType(u64);

impl DataType {
    /// Derive the tag of a namespaced name: `SHA-256(name)` truncated to 64 bits.
    pub fn new(name: &str) -> Self {
        Self(name_hash(name))
    }

    /// Wrap a raw stored value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({:#018x})", self.0)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
