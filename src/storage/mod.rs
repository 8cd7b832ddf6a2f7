//! Named save slots backed by two flat files.
//!
//! `users.dat` maps usernames to offsets; `datos.dat` holds one
//! fixed-size [`SaveRecord`] per user at that offset.

pub mod index;
pub mod record;

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StorageError;

pub use index::{UserIndex, UserKey};
pub use record::SaveRecord;

pub const INDEX_FILE: &str = "users.dat";
pub const DATA_FILE: &str = "datos.dat";

/// What a save did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New user, new index entry
    Created { offset: u64 },
    /// Existing record replaced in place
    Overwritten { offset: u64 },
}

/// Save slots for one board geometry
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
    index: UserIndex,
    data_path: PathBuf,
    capacity: usize,
}

impl SaveStore {
    /// Store in `dir` for boards of `capacity` cells
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        let dir = dir.into();
        Self {
            index: UserIndex::new(dir.join(INDEX_FILE)),
            data_path: dir.join(DATA_FILE),
            dir,
            capacity,
        }
    }

    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn record_size(&self) -> usize {
        SaveRecord::size(self.capacity)
    }

    /// Whether a slot exists for `username`
    ///
    /// Callers check this to confirm an overwrite before calling
    /// [`SaveStore::save`].
    pub fn exists(&self, username: &str) -> Result<bool, StorageError> {
        Ok(self.index.find(&UserKey::new(username))?.is_some())
    }

    /// Write `record` to the slot for `username`, creating it if needed
    ///
    /// A new slot lives at `record_size * user_count`. The record is
    /// written before its index entry so a failed write never leaves an
    /// entry pointing at nothing.
    pub fn save(&self, username: &str, record: &SaveRecord) -> Result<SaveOutcome, StorageError> {
        let bytes = record.encode(self.capacity)?;
        let key = UserKey::new(username);

        std::fs::create_dir_all(&self.dir).map_err(|err| StorageError::io(&self.dir, err))?;

        let outcome = match self.index.find(&key)? {
            Some(offset) => {
                self.write_at(offset, &bytes)?;
                SaveOutcome::Overwritten { offset }
            }
            None => {
                let offset = self.record_size() as u64 * self.index.user_count()?;
                self.write_at(offset, &bytes)?;
                self.index.append(&key, offset)?;
                SaveOutcome::Created { offset }
            }
        };

        info!(user = %key.display_name(), ?outcome, "game saved");
        Ok(outcome)
    }

    /// Read and decode the slot for `username`
    pub fn load(&self, username: &str) -> Result<SaveRecord, StorageError> {
        let key = UserKey::new(username);
        let offset = self
            .index
            .find(&key)?
            .ok_or_else(|| StorageError::UserNotFound(key.display_name()))?;

        let mut bytes = vec![0u8; self.record_size()];
        let mut file =
            File::open(&self.data_path).map_err(|err| StorageError::io(&self.data_path, err))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|err| StorageError::io(&self.data_path, err))?;
        file.read_exact(&mut bytes).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                StorageError::CorruptRecord(format!("record at offset {} is truncated", offset))
            } else {
                StorageError::io(&self.data_path, err)
            }
        })?;

        let record = SaveRecord::decode(&bytes, self.capacity)?;
        info!(user = %key.display_name(), offset, "game loaded");
        Ok(record)
    }

    fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.data_path)
            .map_err(|err| StorageError::io(&self.data_path, err))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|err| StorageError::io(&self.data_path, err))?;
        file.write_all(bytes)
            .map_err(|err| StorageError::io(&self.data_path, err))?;
        Ok(())
    }
}
