//! Disk-backed block store.
//!
//! Each relation is one flat file inside the environment directory.
//! Block `k` lives at byte offset `(k - 1) * BLOCK_SZ`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use super::{BlockId, BlockStore, StorageEnv, StoreError};
use crate::storage::BLOCK_SZ;

/// A directory of per-relation block files.
#[derive(Debug, Clone)]
pub struct FileEnv {
    dir: PathBuf,
}

impl FileEnv {
    /// Opens (creating if necessary) the environment directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the path of the environment directory.
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl StorageEnv for FileEnv {
    type Store = FileStore;

    fn create(&self, name: &str) -> Result<FileStore, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(self.path(name))
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::Exists(name.to_string()),
                _ => StoreError::Io(e),
            })?;
        Ok(FileStore { file, blocks: 0 })
    }

    fn open(&self, name: &str) -> Result<FileStore, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path(name))
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
                _ => StoreError::Io(e),
            })?;
        let len = file.metadata()?.len();
        if len % BLOCK_SZ as u64 != 0 {
            return Err(StoreError::Corrupted(format!(
                "size of '{}' ({} bytes) is not a multiple of the block size",
                name, len
            )));
        }
        Ok(FileStore {
            file,
            blocks: (len / BLOCK_SZ as u64) as u32,
        })
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        fs::remove_file(self.path(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })
    }
}

/// An open block file on disk.
#[derive(Debug)]
pub struct FileStore {
    file: File,
    blocks: u32,
}

impl FileStore {
    fn seek_to(&mut self, key: BlockId) -> Result<(), StoreError> {
        let offset = (key as u64 - 1) * BLOCK_SZ as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl BlockStore for FileStore {
    fn get(&mut self, key: BlockId, buf: &mut [u8]) -> Result<(), StoreError> {
        if buf.len() != BLOCK_SZ {
            return Err(StoreError::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: buf.len(),
            });
        }
        if key == 0 || key > self.blocks {
            return Err(StoreError::BlockNotFound(key));
        }
        self.seek_to(key)?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn put(&mut self, key: BlockId, block: &[u8]) -> Result<(), StoreError> {
        if block.len() != BLOCK_SZ {
            return Err(StoreError::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: block.len(),
            });
        }
        if key == 0 || key > self.blocks + 1 {
            return Err(StoreError::BlockNotFound(key));
        }
        self.seek_to(key)?;
        self.file.write_all(block)?;
        if key == self.blocks + 1 {
            self.blocks = key;
        }
        Ok(())
    }

    fn record_count(&self) -> Result<u32, StoreError> {
        Ok(self.blocks)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn block(fill: u8) -> Vec<u8> {
        vec![fill; BLOCK_SZ]
    }

    #[test]
    fn test_create_is_exclusive() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        env.create("t").unwrap();
        assert!(matches!(env.create("t"), Err(StoreError::Exists(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        assert!(matches!(env.open("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_put_get_roundtrip() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        let mut store = env.create("t").unwrap();
        store.put(1, &block(0xAB)).unwrap();
        store.put(2, &block(0xCD)).unwrap();

        let mut buf = block(0);
        store.get(1, &mut buf).unwrap();
        assert_eq!(buf, block(0xAB));
        store.get(2, &mut buf).unwrap();
        assert_eq!(buf, block(0xCD));
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn test_put_rejects_gaps() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        let mut store = env.create("t").unwrap();
        assert!(matches!(
            store.put(3, &block(0)),
            Err(StoreError::BlockNotFound(3))
        ));
        assert!(matches!(
            store.put(0, &block(0)),
            Err(StoreError::BlockNotFound(0))
        ));
    }

    #[test]
    fn test_get_out_of_range() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        let mut store = env.create("t").unwrap();
        let mut buf = block(0);
        assert!(matches!(
            store.get(1, &mut buf),
            Err(StoreError::BlockNotFound(1))
        ));
    }

    #[test]
    fn test_wrong_buffer_size() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        let mut store = env.create("t").unwrap();
        let mut small = vec![0u8; 16];
        assert!(matches!(
            store.get(1, &mut small),
            Err(StoreError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            store.put(1, &small),
            Err(StoreError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn test_reopen_sees_persisted_blocks() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        {
            let mut store = env.create("t").unwrap();
            store.put(1, &block(7)).unwrap();
            store.sync().unwrap();
        }
        let mut store = env.open("t").unwrap();
        assert_eq!(store.record_count().unwrap(), 1);
        let mut buf = block(0);
        store.get(1, &mut buf).unwrap();
        assert_eq!(buf, block(7));
    }

    #[test]
    fn test_open_rejects_partial_block() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        std::fs::write(dir.path().join("t"), vec![0u8; 100]).unwrap();
        assert!(matches!(env.open("t"), Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let env = FileEnv::new(dir.path()).unwrap();

        env.create("t").unwrap();
        env.remove("t").unwrap();
        assert!(matches!(env.open("t"), Err(StoreError::NotFound(_))));
        assert!(matches!(env.remove("t"), Err(StoreError::NotFound(_))));
    }
}
