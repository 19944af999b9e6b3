use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cymi_types::NodeId;

use crate::error::{StoreError, StoreResult};
use crate::memory::RowIndex;
use crate::row::{LinkRow, NodeRow};
use crate::traits::Backend;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Flush strategy for the log file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append.
    EveryWrite,
    /// Flush to the OS and rely on its page cache.
    #[default]
    OsDefault,
}

/// One entry of the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum LogRecord {
    Node(NodeRow),
    Link(LinkRow),
}

struct FileState {
    file: File,
    /// End of the last complete frame. Nothing past it belongs to the log.
    offset: u64,
    /// A failed append left bytes past `offset` that could not be cut off yet.
    unclean_tail: bool,
    index: RowIndex,
}

/// Row store persisted as an append-only log file.
///
/// On-disk format, one frame per row:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized record)]
/// ```
///
/// Opening the file replays every frame into an in-memory index. Frames that
/// fail the CRC are skipped; a truncated tail (torn write) ends recovery and
/// is cut off so new frames are appended after the last good one.
///
/// Each frame is written with a single unbuffered write. If the write or the
/// sync fails, the file is cut back to the end of the previous frame, so a
/// write reported as failed never becomes part of the log.
pub struct FileBackend {
    path: PathBuf,
    sync_mode: SyncMode,
    state: Mutex<Option<FileState>>,
}

impl FileBackend {
    /// Open (or create) the log at `path` and replay it.
    pub fn open(path: &Path, sync_mode: SyncMode) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let file_len = file.metadata()?.len();

        let (records, valid_len) = recover(path)?;
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "dropping torn tail of log"
            );
            file.set_len(valid_len)?;
        }

        let mut index = RowIndex::default();
        for record in records {
            match record {
                LogRecord::Node(row) => {
                    index.push_node(row);
                }
                LogRecord::Link(link) => index.push_link(link),
            }
        }
        debug!(
            path = %path.display(),
            nodes = index.node_count(),
            links = index.link_count(),
            "log replayed"
        );

        Ok(Self {
            path: path.to_path_buf(),
            sync_mode,
            state: Mutex::new(Some(FileState {
                file,
                offset: valid_len,
                unclean_tail: false,
                index,
            })),
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current end of the log in bytes.
    pub fn offset(&self) -> StoreResult<u64> {
        self.with_state(|state| Ok(state.offset))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FileState) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.state.lock().expect("lock poisoned");
        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(StoreError::Closed),
        }
    }

    fn append(&self, state: &mut FileState, record: &LogRecord) -> StoreResult<()> {
        let frame = encode_frame(record)?;

        if state.unclean_tail {
            state.file.set_len(state.offset)?;
            state.unclean_tail = false;
        }

        if let Err(e) = self.write_frame(&mut state.file, &frame) {
            if let Err(rollback) = state.file.set_len(state.offset) {
                warn!(
                    offset = state.offset,
                    error = %rollback,
                    "could not cut back failed append; retrying on next write"
                );
                state.unclean_tail = true;
            }
            return Err(e.into());
        }

        debug!(offset = state.offset, len = frame.len(), "log append");
        state.offset += frame.len() as u64;
        Ok(())
    }

    fn write_frame(&self, file: &mut File, frame: &[u8]) -> io::Result<()> {
        file.write_all(frame)?;
        if self.sync_mode == SyncMode::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }
}

/// Header and payload of one record as a single buffer.
fn encode_frame(record: &LogRecord) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("record exceeds 4 GiB".into()))?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Read every valid record from the log at `path`.
///
/// Returns the records and the length of the prefix holding whole frames.
fn recover(path: &Path) -> StoreResult<(Vec<LogRecord>, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let file_len = reader.get_ref().metadata()?.len();
    let mut records = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= file_len {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
            warn!(offset, length, file_len, "invalid log frame length; stopping recovery");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated log frame; stopping recovery");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        let frame_end = offset + HEADER_SIZE as u64 + length as u64;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping frame"
            );
            offset = frame_end;
            continue;
        }

        match bincode::deserialize::<LogRecord>(&payload) {
            Ok(record) => records.push(record),
            Err(e) => warn!(offset, error = %e, "undecodable log frame; skipping"),
        }
        offset = frame_end;
    }

    debug!(recovered = records.len(), "log recovery complete");
    Ok((records, offset))
}

impl Backend for FileBackend {
    fn insert_node(&self, row: NodeRow, expected_latest: Option<u64>) -> StoreResult<NodeRow> {
        self.with_state(|state| {
            state.index.check_latest(&row.node_id, expected_latest)?;
            let mut row = row;
            row.storage_id = state.index.next_storage_id();
            self.append(state, &LogRecord::Node(row.clone()))?;
            Ok(state.index.push_node(row))
        })
    }

    fn latest_node(&self, id: &NodeId) -> StoreResult<Option<NodeRow>> {
        self.with_state(|state| Ok(state.index.latest(id).cloned()))
    }

    fn node_versions(&self, id: &NodeId) -> StoreResult<Vec<NodeRow>> {
        self.with_state(|state| Ok(state.index.all_versions(id)))
    }

    fn first_node(&self) -> StoreResult<Option<NodeRow>> {
        self.with_state(|state| Ok(state.index.first().cloned()))
    }

    fn insert_link(&self, link: LinkRow) -> StoreResult<()> {
        self.with_state(|state| {
            self.append(state, &LogRecord::Link(link))?;
            state.index.push_link(link);
            Ok(())
        })
    }

    fn links_from(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>> {
        self.with_state(|state| Ok(state.index.links_matching(|l| l.from == *id)))
    }

    fn links_to(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>> {
        self.with_state(|state| Ok(state.index.links_matching(|l| l.to == *id)))
    }

    fn close(&self) -> StoreResult<()> {
        let mut guard = self.state.lock().expect("lock poisoned");
        if let Some(state) = guard.take() {
            if state.unclean_tail {
                state.file.set_len(state.offset)?;
            }
            state.file.sync_all()?;
            debug!(path = %self.path.display(), "log closed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("path", &self.path)
            .field("sync_mode", &self.sync_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    fn make_row(node_id: NodeId, version: u64, payload: &[u8]) -> NodeRow {
        NodeRow {
            storage_id: 0,
            node_id,
            node_type: 0,
            version,
            date: 1_700_000_000,
            data_buf: payload.to_vec(),
        }
    }

    #[test]
    fn rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.log");
        let id = NodeId::random();
        let child = NodeId::random();
        {
            let store = FileBackend::open(&path, SyncMode::default()).unwrap();
            store.insert_node(make_row(id, 0, b"v0"), None).unwrap();
            store.insert_node(make_row(id, 1, b"v1"), Some(0)).unwrap();
            store.insert_link(LinkRow { from: id, to: child }).unwrap();
            store.close().unwrap();
        }

        let store = FileBackend::open(&path, SyncMode::default()).unwrap();
        let latest = store.latest_node(&id).unwrap().unwrap();
        assert_eq!(latest.version, 1);
        assert_eq!(latest.storage_id, 2);
        assert_eq!(latest.data_buf, b"v1");
        assert_eq!(store.node_versions(&id).unwrap().len(), 2);
        assert_eq!(store.links_from(&id).unwrap(), vec![LinkRow { from: id, to: child }]);
        assert_eq!(store.first_node().unwrap().unwrap().version, 0);
    }

    #[test]
    fn open_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/empty.log");
        let store = FileBackend::open(&path, SyncMode::EveryWrite).unwrap();
        assert!(store.first_node().unwrap().is_none());
        assert_eq!(store.offset().unwrap(), 0);
    }

    #[test]
    fn conflicting_insert_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(&dir.path().join("cas.log"), SyncMode::default()).unwrap();
        let id = NodeId::random();
        store.insert_node(make_row(id, 0, b"a"), None).unwrap();
        let before = store.offset().unwrap();

        let err = store.insert_node(make_row(id, 0, b"b"), None).unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
        assert_eq!(store.offset().unwrap(), before);
    }

    #[test]
    fn crc_mismatch_skips_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.log");
        let (a, b) = (NodeId::random(), NodeId::random());
        {
            let store = FileBackend::open(&path, SyncMode::default()).unwrap();
            store.insert_node(make_row(a, 0, b"first"), None).unwrap();
            store.insert_node(make_row(b, 0, b"second"), None).unwrap();
            store.close().unwrap();
        }

        // Flip the first payload byte of the first frame.
        {
            let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xff;
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            file.write_all(&buf).unwrap();
        }

        let store = FileBackend::open(&path, SyncMode::default()).unwrap();
        assert!(store.latest_node(&a).unwrap().is_none());
        assert_eq!(store.latest_node(&b).unwrap().unwrap().data_buf, b"second");
    }

    #[test]
    fn torn_tail_is_dropped_and_appends_continue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tail.log");
        let (a, b, c) = (NodeId::random(), NodeId::random(), NodeId::random());
        let total_len = {
            let store = FileBackend::open(&path, SyncMode::default()).unwrap();
            store.insert_node(make_row(a, 0, b"a"), None).unwrap();
            store.insert_node(make_row(b, 0, b"b"), None).unwrap();
            let len = store.offset().unwrap();
            store.close().unwrap();
            len
        };

        {
            let file = OpenOptions::new().write(true).open(&path).unwrap();
            file.set_len(total_len - 4).unwrap();
        }

        {
            let store = FileBackend::open(&path, SyncMode::default()).unwrap();
            assert!(store.latest_node(&a).unwrap().is_some());
            assert!(store.latest_node(&b).unwrap().is_none());
            store.insert_node(make_row(c, 0, b"c"), None).unwrap();
            store.close().unwrap();
        }

        let store = FileBackend::open(&path, SyncMode::default()).unwrap();
        assert!(store.latest_node(&a).unwrap().is_some());
        assert!(store.latest_node(&c).unwrap().is_some());
    }

    #[test]
    fn closed_backend_rejects_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(&dir.path().join("closed.log"), SyncMode::default()).unwrap();
        store.close().unwrap();
        store.close().unwrap();
        assert!(matches!(store.first_node(), Err(StoreError::Closed)));
    }

    #[test]
    fn failed_append_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.log");
        let id = NodeId::random();
        let store = FileBackend::open(&path, SyncMode::EveryWrite).unwrap();
        store.insert_node(make_row(id, 0, b"v0"), None).unwrap();
        let good_len = store.offset().unwrap();

        // Swap in a read-only handle so the next append and its cut-back fail.
        let read_only = File::open(&path).unwrap();
        let writable = {
            let mut guard = store.state.lock().unwrap();
            std::mem::replace(&mut guard.as_mut().unwrap().file, read_only)
        };
        let err = store.insert_node(make_row(id, 1, b"failed"), Some(0)).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.offset().unwrap(), good_len);
        assert_eq!(store.latest_node(&id).unwrap().unwrap().version, 0);

        // Leave half a frame behind, as a write cut short by the OS would.
        {
            let mut tail = OpenOptions::new().append(true).open(&path).unwrap();
            tail.write_all(&[0x40, 0, 0, 0, 0xde, 0xad]).unwrap();
        }
        store.state.lock().unwrap().as_mut().unwrap().file = writable;

        store.insert_node(make_row(id, 1, b"retry"), Some(0)).unwrap();
        let end = store.offset().unwrap();
        store.close().unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), end);

        let store = FileBackend::open(&path, SyncMode::default()).unwrap();
        let versions: Vec<(u64, Vec<u8>)> = store
            .node_versions(&id)
            .unwrap()
            .into_iter()
            .map(|r| (r.version, r.data_buf))
            .collect();
        assert_eq!(versions, vec![(0, b"v0".to_vec()), (1, b"retry".to_vec())]);
    }
}
