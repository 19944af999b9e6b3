use std::ops::BitOr;
use std::path::PathBuf;

use super::hook::Hook;
use crate::error::{DbError, DbResult};

/// Directions a [`FileHook`] keeps in sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FileHookOps(u32);

impl FileHookOps {
    pub const NONE: Self = Self(0);
    /// Write database changes out to the file system.
    pub const UPDATE_FS: Self = Self(1);
    /// Record file system changes in the database.
    pub const UPDATE_DB: Self = Self(1 << 1);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FileHookOps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Binds a [`Hook`] to a directory tree on the local file system.
///
/// Only the binding is recorded here. Nothing walks or watches `root` yet.
#[derive(Clone, Debug)]
pub struct FileHook {
    pub hook: Hook,
    pub root: PathBuf,
    pub operations: FileHookOps,
}

impl FileHook {
    /// Fails with [`DbError::InvalidHookRoot`] unless `root` is an existing directory.
    pub fn new(hook: Hook, root: impl Into<PathBuf>, operations: FileHookOps) -> DbResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DbError::InvalidHookRoot(root));
        }
        Ok(Self {
            hook,
            root,
            operations,
        })
    }
}
