//! MessagePack snapshot files.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Error, Result, ports::SnapshotRepository, value::ValueSnapshot};

/// Stores [`ValueSnapshot`]s as compact MessagePack via rmp_serde.
///
/// # Examples
///
/// ```no_run
/// use simdyna::adapters::{InMemoryStore, MsgPackSnapshotRepository};
/// use simdyna::ports::SnapshotRepository;
/// use simdyna::value::ValueSnapshot;
/// use std::path::Path;
///
/// let store = InMemoryStore::new();
/// let repo = MsgPackSnapshotRepository::new();
/// repo.save(&ValueSnapshot::capture(&store)?, Path::new("values.msgpack"))?;
/// let restored = InMemoryStore::from_snapshot(&repo.load(Path::new("values.msgpack"))?)?;
/// # Ok::<(), simdyna::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSnapshotRepository;

impl MsgPackSnapshotRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackSnapshotRepository {
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize value snapshot to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush {path:?}"),
            source,
        })
    }

    fn load(&self, path: &Path) -> Result<ValueSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot: ValueSnapshot = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| Error::SerializationContext {
                operation: "deserialize value snapshot from MessagePack".to_string(),
                message: e.to_string(),
            })?;
        snapshot.check_version()?;

        Ok(snapshot)
    }
}
