//! Username index: an append-only list of fixed-width keys, each followed
//! by the byte offset of that user's record in the data file.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// UTF-16 code units per key
pub const KEY_UNITS: usize = 20;

/// Bytes per index entry: the key plus an 8-byte offset
pub const ENTRY_SIZE: usize = KEY_UNITS * 2 + 8;

/// A username truncated or space-padded to exactly [`KEY_UNITS`] units
///
/// Truncation stops at a character boundary; a surrogate pair that would
/// straddle the end is dropped and its slots padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserKey([u16; KEY_UNITS]);

impl UserKey {
    pub fn new(name: &str) -> Self {
        let mut units = [u16::from(b' '); KEY_UNITS];
        let mut len = 0;
        let mut buf = [0u16; 2];
        for ch in name.chars() {
            let encoded = ch.encode_utf16(&mut buf);
            if len + encoded.len() > KEY_UNITS {
                break;
            }
            units[len..len + encoded.len()].copy_from_slice(encoded);
            len += encoded.len();
        }
        Self(units)
    }

    fn to_bytes(self) -> [u8; KEY_UNITS * 2] {
        let mut out = [0u8; KEY_UNITS * 2];
        for (chunk, unit) in out.chunks_exact_mut(2).zip(self.0) {
            chunk.copy_from_slice(&unit.to_be_bytes());
        }
        out
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut units = [0u16; KEY_UNITS];
        for (slot, chunk) in units.iter_mut().zip(bytes.chunks_exact(2)) {
            *slot = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Self(units)
    }

    /// The name without its padding
    pub fn display_name(&self) -> String {
        String::from_utf16_lossy(&self.0).trim_end().to_string()
    }
}

/// The index file
#[derive(Debug, Clone)]
pub struct UserIndex {
    path: PathBuf,
}

impl UserIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset stored for `key`; the first matching entry wins
    pub fn find(&self, key: &UserKey) -> Result<Option<u64>, StorageError> {
        for (stored, offset) in self.entries()? {
            if stored == *key {
                return Ok(Some(offset));
            }
        }
        Ok(None)
    }

    /// Number of entries in the file
    pub fn user_count(&self) -> Result<u64, StorageError> {
        Ok(self.read_all()?.len() as u64 / ENTRY_SIZE as u64)
    }

    /// Append an entry at the end of the file
    pub fn append(&self, key: &UserKey, offset: u64) -> Result<(), StorageError> {
        let offset = i64::try_from(offset).map_err(|_| {
            StorageError::CorruptRecord(format!("offset {} does not fit the index", offset))
        })?;

        let mut entry = Vec::with_capacity(ENTRY_SIZE);
        entry.extend_from_slice(&key.to_bytes());
        entry.extend_from_slice(&offset.to_be_bytes());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| StorageError::io(&self.path, err))?;
        file.write_all(&entry)
            .map_err(|err| StorageError::io(&self.path, err))?;

        debug!(user = %key.display_name(), offset, "index entry appended");
        Ok(())
    }

    /// Every entry in file order
    pub fn entries(&self) -> Result<Vec<(UserKey, u64)>, StorageError> {
        let bytes = self.read_all()?;
        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(StorageError::CorruptRecord(format!(
                "index length {} is not a multiple of {}",
                bytes.len(),
                ENTRY_SIZE
            )));
        }

        bytes
            .chunks_exact(ENTRY_SIZE)
            .map(|entry| {
                let (key, offset) = entry.split_at(KEY_UNITS * 2);
                let mut raw = [0u8; 8];
                raw.copy_from_slice(offset);
                let offset = i64::from_be_bytes(raw);
                let offset = u64::try_from(offset).map_err(|_| {
                    StorageError::CorruptRecord(format!("negative record offset {}", offset))
                })?;
                Ok((UserKey::from_bytes(key), offset))
            })
            .collect()
    }

    /// Whole file; a missing file reads as empty
    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StorageError::io(&self.path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_padding_and_truncation() {
        let short = UserKey::new("alice");
        assert_eq!(short.display_name(), "alice");
        assert_eq!(short.0[5], u16::from(b' '));
        assert_eq!(short.0[19], u16::from(b' '));

        let long = UserKey::new("a_really_long_username_indeed");
        assert_eq!(long.display_name(), "a_really_long_userna");

        let exact = UserKey::new("exactly_twenty_chars");
        assert_eq!(exact.display_name(), "exactly_twenty_chars");

        assert_eq!(UserKey::new("bob"), UserKey::new("bob   "));
    }

    #[test]
    fn test_key_never_splits_a_surrogate_pair() {
        // 19 units, then a character that needs two
        let name = format!("{}🐍", "s".repeat(19));
        let key = UserKey::new(&name);
        assert_eq!(key.display_name(), "s".repeat(19));
        assert_eq!(key.0[19], u16::from(b' '));

        let fits = format!("{}🐍", "s".repeat(18));
        assert_eq!(UserKey::new(&fits).display_name(), fits);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let index = UserIndex::new(dir.path().join("users.dat"));
        assert_eq!(index.user_count().unwrap(), 0);
        assert_eq!(index.find(&UserKey::new("alice")).unwrap(), None);
    }

    #[test]
    fn test_append_and_find() {
        let dir = TempDir::new().unwrap();
        let index = UserIndex::new(dir.path().join("users.dat"));

        index.append(&UserKey::new("alice"), 0).unwrap();
        index.append(&UserKey::new("bob"), 10027).unwrap();

        assert_eq!(index.user_count().unwrap(), 2);
        assert_eq!(index.find(&UserKey::new("bob")).unwrap(), Some(10027));
        assert_eq!(index.find(&UserKey::new("alice")).unwrap(), Some(0));
        assert_eq!(index.find(&UserKey::new("carol")).unwrap(), None);

        let bytes = std::fs::read(index.path()).unwrap();
        assert_eq!(bytes.len(), 2 * ENTRY_SIZE);
        // 'a' as a big-endian UTF-16 unit, then padding spaces
        assert_eq!(&bytes[0..2], &[0, b'a']);
        assert_eq!(&bytes[10..12], &[0, b' ']);
        assert_eq!(&bytes[40..48], &0i64.to_be_bytes());
        assert_eq!(&bytes[88..96], &10027i64.to_be_bytes());
    }

    #[test]
    fn test_first_match_wins() {
        let dir = TempDir::new().unwrap();
        let index = UserIndex::new(dir.path().join("users.dat"));
        index.append(&UserKey::new("dup"), 48).unwrap();
        index.append(&UserKey::new("dup"), 96).unwrap();
        assert_eq!(index.find(&UserKey::new("dup")).unwrap(), Some(48));
    }

    #[test]
    fn test_partial_entry_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.dat");
        std::fs::write(&path, [0u8; ENTRY_SIZE + 3]).unwrap();
        let index = UserIndex::new(path);
        assert!(matches!(
            index.find(&UserKey::new("x")),
            Err(StorageError::CorruptRecord(_))
        ));
    }
}
