//! In-memory block store.
//!
//! The environment is a shared map from relation name to block list, so
//! every handle opened from clones of one [`MemoryEnv`] observes the same
//! data. Used by tests in place of a real directory.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BlockId, BlockStore, StorageEnv, StoreError};
use crate::storage::BLOCK_SZ;

type FileMap = HashMap<String, Vec<Vec<u8>>>;

/// A shared in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    files: Arc<Mutex<FileMap>>,
}

impl MemoryEnv {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEnv for MemoryEnv {
    type Store = MemoryStore;

    fn create(&self, name: &str) -> Result<MemoryStore, StoreError> {
        let mut files = self.files.lock();
        if files.contains_key(name) {
            return Err(StoreError::Exists(name.to_string()));
        }
        files.insert(name.to_string(), Vec::new());
        Ok(MemoryStore {
            files: self.files.clone(),
            name: name.to_string(),
        })
    }

    fn open(&self, name: &str) -> Result<MemoryStore, StoreError> {
        if !self.files.lock().contains_key(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(MemoryStore {
            files: self.files.clone(),
            name: name.to_string(),
        })
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        match self.files.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }
}

/// A handle to one in-memory block file.
#[derive(Debug)]
pub struct MemoryStore {
    files: Arc<Mutex<FileMap>>,
    name: String,
}

impl BlockStore for MemoryStore {
    fn get(&mut self, key: BlockId, buf: &mut [u8]) -> Result<(), StoreError> {
        if buf.len() != BLOCK_SZ {
            return Err(StoreError::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: buf.len(),
            });
        }
        let files = self.files.lock();
        let blocks = files
            .get(&self.name)
            .ok_or_else(|| StoreError::NotFound(self.name.clone()))?;
        let block = blocks
            .get(key.wrapping_sub(1) as usize)
            .ok_or(StoreError::BlockNotFound(key))?;
        buf.copy_from_slice(block);
        Ok(())
    }

    fn put(&mut self, key: BlockId, block: &[u8]) -> Result<(), StoreError> {
        if block.len() != BLOCK_SZ {
            return Err(StoreError::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: block.len(),
            });
        }
        let mut files = self.files.lock();
        let blocks = files
            .get_mut(&self.name)
            .ok_or_else(|| StoreError::NotFound(self.name.clone()))?;
        if key == 0 || key as usize > blocks.len() + 1 {
            return Err(StoreError::BlockNotFound(key));
        }
        if key as usize == blocks.len() + 1 {
            blocks.push(block.to_vec());
        } else {
            blocks[key as usize - 1].copy_from_slice(block);
        }
        Ok(())
    }

    fn record_count(&self) -> Result<u32, StoreError> {
        let files = self.files.lock();
        let blocks = files
            .get(&self.name)
            .ok_or_else(|| StoreError::NotFound(self.name.clone()))?;
        Ok(blocks.len() as u32)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
