//! Repository port for value-table snapshots.
//!
//! This module defines the trait boundary between the domain and the file
//! formats used to export and re-import a learned value table.

use std::path::Path;

use crate::{Result, value::ValueSnapshot};

/// Port for persisting and loading [`ValueSnapshot`]s.
///
/// # Examples
///
/// ```no_run
/// use simdyna::adapters::MsgPackSnapshotRepository;
/// use simdyna::ports::SnapshotRepository;
/// use simdyna::value::ValueSnapshot;
/// use std::path::Path;
///
/// fn backup<R: SnapshotRepository>(repo: &R, snapshot: &ValueSnapshot) -> simdyna::Result<()> {
///     repo.save(snapshot, Path::new("values.msgpack"))
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization fails.
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    fn load(&self, path: &Path) -> Result<ValueSnapshot>;
}
