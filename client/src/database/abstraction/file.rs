use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::KeyValueStore;
use crate::{Error, Result};

/// One file per key inside a directory.
///
/// Writes land in a sibling temporary file first and are renamed into place,
/// so a reader sees either the old value or the new one.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    /// A slot that is not UTF-8 text comes back as [`Error::CorruptLedger`].
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        String::from_utf8(bytes).map(Some).map_err(|e| {
            Error::CorruptLedger(format!("{} is not valid UTF-8: {e}", path.display()))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("donation-tracker-donations").unwrap(), None);
    }

    #[test]
    fn set_replaces_the_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("slot", "[1,2,3]").unwrap();
        store.set("slot", "[]").unwrap();

        assert_eq!(store.get("slot").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("slot.json.tmp").exists());
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("../outside", "x").unwrap();

        assert!(dir.path().join(".._outside.json").exists());
        assert_eq!(store.get("../outside").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn removing_a_missing_slot_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.remove("never-written").unwrap();
    }
}
