use tracing::{debug, info};

use cymi_node::{Link, Node, Noder, TypedView};
use cymi_store::{Backend, InMemoryBackend, LinkRow, NodeRow};
use cymi_types::{NodeId, NodeType};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::views::{AnyView, Device};

/// High-level CyMiDB handle.
///
/// Persists [`Noder`]s as versioned nodes, records links between
/// identities and walks them. A database made by [`Db::create`] or
/// [`Db::open`] also carries the [`Device`] it belongs to, which is always
/// the first node stored.
pub struct Db {
    backend: Box<dyn Backend>,
    device: Option<Device>,
}

impl Db {
    /// Wrap a backend without a device node.
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::from_boxed(Box::new(backend), None)
    }

    /// A fresh in-memory database without a device node.
    pub fn in_memory() -> Self {
        Self::new(InMemoryBackend::new())
    }

    fn from_boxed(backend: Box<dyn Backend>, device: Option<Device>) -> Self {
        Self { backend, device }
    }

    /// Open the configured storage and store a new device as its first node.
    pub fn create(config: &DbConfig, name: &str, url: &str) -> DbResult<Self> {
        let backend = config.storage.open()?;
        let mut db = Self::from_boxed(backend, None);
        let device = Device::new(name, url);
        db.save_node(&device)?;
        info!(device = %device.id().short_hex(), name, "created database");
        db.device = Some(device);
        Ok(db)
    }

    /// Open existing storage and load the latest version of its device.
    pub fn open(config: &DbConfig) -> DbResult<Self> {
        let backend = config.storage.open()?;
        let first = backend.first_node()?.ok_or(DbError::EmptyDatabase)?;
        let mut db = Self::from_boxed(backend, None);
        let device: Device = db.get_view(first.node_id)?;
        info!(device = %device.id().short_hex(), name = %device.name, "opened database");
        db.device = Some(device);
        Ok(db)
    }

    /// The device this database belongs to, if it was created or opened as one.
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    /// Mutable access to the device view. Changes persist on the next save.
    pub fn device_mut(&mut self) -> Option<&mut Device> {
        self.device.as_mut()
    }

    // ---- Node operations ----

    /// Persist the current state of `noder` as a new version.
    ///
    /// If the identity is already stored, the new version is one past the
    /// latest; otherwise the node keeps its own version. Returns the node as
    /// persisted. A concurrent save of the same identity fails with a
    /// version conflict instead of overwriting.
    pub fn save_node(&self, noder: &dyn Noder) -> DbResult<Node> {
        let node = noder.get_node()?;
        let latest = self.backend.latest_node(&node.id())?.map(|row| row.version);
        let version = latest.map_or(node.version(), |v| v + 1);
        let row = NodeRow {
            storage_id: 0,
            node_id: node.id(),
            node_type: node.node_type().as_u64(),
            version,
            date: node.date(),
            data_buf: node.data_buf().to_vec(),
        };
        let stored = self.backend.insert_node(row, latest)?;
        debug!(
            node = %stored.node_id.short_hex(),
            version = stored.version,
            node_type = %NodeType::from_raw(stored.node_type),
            "saved node"
        );
        Ok(node_from_row(stored))
    }

    /// Save each noder in order. Stops at the first failure; earlier saves stay.
    pub fn save_all(&self, noders: &[&dyn Noder]) -> DbResult<Vec<Node>> {
        noders.iter().map(|n| self.save_node(*n)).collect()
    }

    /// Latest version of every id, in the order given.
    ///
    /// Fails with [`DbError::NotFound`] naming the first id that has no
    /// stored version.
    pub fn get_nodes(&self, ids: &[NodeId]) -> DbResult<Vec<Node>> {
        ids.iter().map(|id| self.get_latest(*id)).collect()
    }

    /// Latest version of `id`.
    pub fn get_latest(&self, id: NodeId) -> DbResult<Node> {
        self.backend
            .latest_node(&id)?
            .map(node_from_row)
            .ok_or(DbError::NotFound(id))
    }

    /// Every stored version of `id`, oldest first. Empty if none.
    pub fn get_node_versions(&self, id: NodeId) -> DbResult<Vec<Node>> {
        Ok(self
            .backend
            .node_versions(&id)?
            .into_iter()
            .map(node_from_row)
            .collect())
    }

    /// Latest version of `id` decoded as `V`.
    pub fn get_view<V: TypedView>(&self, id: NodeId) -> DbResult<V> {
        Ok(V::from_node(self.get_latest(id)?)?)
    }

    /// Latest version of `id` decoded as whichever view its type belongs to.
    pub fn get_any(&self, id: NodeId) -> DbResult<AnyView> {
        Ok(AnyView::from_node(self.get_latest(id)?)?)
    }

    // ---- Link operations ----

    /// Record a directed link. Endpoints are not checked.
    pub fn add_link(&self, from: NodeId, to: NodeId) -> DbResult<()> {
        self.backend.insert_link(LinkRow { from, to })?;
        debug!(from = %from.short_hex(), to = %to.short_hex(), "added link");
        Ok(())
    }

    /// Every stored link leaving `from`, in insertion order.
    pub fn get_links_from(&self, from: NodeId) -> DbResult<Vec<Link>> {
        Ok(self
            .backend
            .links_from(&from)?
            .into_iter()
            .map(|l| Link::new(l.from, l.to))
            .collect())
    }

    /// Targets of links leaving `from`. Duplicates appear once per link.
    pub fn get_children(&self, from: NodeId) -> DbResult<Vec<NodeId>> {
        Ok(self.backend.links_from(&from)?.into_iter().map(|l| l.to).collect())
    }

    /// Sources of links arriving at `to`.
    pub fn get_ancestors(&self, to: NodeId) -> DbResult<Vec<NodeId>> {
        Ok(self.backend.links_to(&to)?.into_iter().map(|l| l.from).collect())
    }

    /// Latest versions of [`Db::get_children`].
    pub fn get_children_nodes(&self, from: NodeId) -> DbResult<Vec<Node>> {
        self.get_nodes(&self.get_children(from)?)
    }

    /// Latest versions of [`Db::get_ancestors`].
    pub fn get_ancestors_nodes(&self, to: NodeId) -> DbResult<Vec<Node>> {
        self.get_nodes(&self.get_ancestors(to)?)
    }

    // ---- Lifecycle ----

    /// Flush and release the backend. Further operations fail.
    pub fn close(&self) -> DbResult<()> {
        self.backend.close()?;
        info!("closed database");
        Ok(())
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("device", &self.device.as_ref().map(|d| d.id()))
            .finish_non_exhaustive()
    }
}

fn node_from_row(row: NodeRow) -> Node {
    Node::from_parts(
        row.node_id,
        NodeType::from_raw(row.node_type),
        row.version,
        row.date,
        row.data_buf,
    )
}
