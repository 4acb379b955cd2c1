//! Page-addressable heap file over a block store.
//!
//! A heap file is a dense sequence of slotted pages keyed by block number,
//! append-only at the block level: blocks are allocated by [`HeapFile::get_new`]
//! and never freed. Intra-block space reuse is the slotted page's job.

use std::ops::RangeInclusive;

use super::page::SlottedPage;
use crate::storage::{BlockId, BlockStore, StorageEnv, StoreError, BLOCK_SZ};

/// A sequence of slotted pages backed by one block-store file.
///
/// The file name doubles as the catalog identifier and the block-store file
/// name. `last` is the watermark of blocks ever allocated; block 1 exists
/// from `create()` on.
pub struct HeapFile<E: StorageEnv> {
    env: E,
    name: String,
    last: BlockId,
    store: Option<E::Store>,
}

impl<E: StorageEnv> HeapFile<E> {
    /// Creates an unopened handle on `name` within `env`.
    pub fn new(env: E, name: impl Into<String>) -> Self {
        Self {
            env,
            name: name.into(),
            last: 0,
            store: None,
        }
    }

    /// Returns the file (and relation) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the backing file exclusively and allocates block 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Exists` if the handle is already open or the
    /// file already exists.
    pub fn create(&mut self) -> Result<(), StoreError> {
        if self.store.is_some() {
            return Err(StoreError::Exists(self.name.clone()));
        }
        self.store = Some(self.env.create(&self.name)?);
        self.last = 0;
        self.get_new()?;
        Ok(())
    }

    /// Closes the handle and deletes the backing file.
    pub fn destroy(&mut self) -> Result<(), StoreError> {
        self.close()?;
        self.last = 0;
        self.env.remove(&self.name)
    }

    /// Opens the backing file, loading `last` from its record count.
    /// A no-op when already open.
    pub fn open(&mut self) -> Result<(), StoreError> {
        if self.store.is_some() {
            return Ok(());
        }
        let store = self.env.open(&self.name)?;
        self.last = store.record_count()?;
        self.store = Some(store);
        Ok(())
    }

    /// Flushes and closes the backing file. A no-op when already closed.
    pub fn close(&mut self) -> Result<(), StoreError> {
        if let Some(mut store) = self.store.take() {
            store.sync()?;
        }
        Ok(())
    }

    /// Allocates the next block, writes it zero-filled, and returns it as a
    /// fresh slotted page.
    pub fn get_new(&mut self) -> Result<SlottedPage, StoreError> {
        let id = self.last + 1;
        let page = SlottedPage::init(id, vec![0u8; BLOCK_SZ]);
        self.store_mut()?.put(id, page.bytes())?;
        self.last = id;
        Ok(page)
    }

    /// Reads the block under `block_id` as an existing slotted page.
    pub fn get(&mut self, block_id: BlockId) -> Result<SlottedPage, StoreError> {
        let mut buf = vec![0u8; BLOCK_SZ];
        self.store_mut()?.get(block_id, &mut buf)?;
        Ok(SlottedPage::new(block_id, buf))
    }

    /// Writes the page back under its own block id.
    pub fn put(&mut self, page: &SlottedPage) -> Result<(), StoreError> {
        self.store_mut()?.put(page.block_id(), page.bytes())
    }

    /// All allocated block ids, in order.
    pub fn block_ids(&self) -> RangeInclusive<BlockId> {
        1..=self.last
    }

    /// The highest allocated block id.
    pub fn last_block_id(&self) -> BlockId {
        self.last
    }

    fn store_mut(&mut self) -> Result<&mut E::Store, StoreError> {
        self.store.as_mut().ok_or(StoreError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryEnv;

    #[test]
    fn test_create_allocates_block_one() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env, "t");
        file.create().unwrap();

        assert_eq!(file.last_block_id(), 1);
        assert_eq!(file.block_ids().collect::<Vec<_>>(), vec![1]);
        let page = file.get(1).unwrap();
        assert_eq!(page.ids(), Vec::<u16>::new());
    }

    #[test]
    fn test_create_twice_fails() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env.clone(), "t");
        file.create().unwrap();
        assert!(matches!(file.create(), Err(StoreError::Exists(_))));

        let mut second = HeapFile::new(env, "t");
        assert!(matches!(second.create(), Err(StoreError::Exists(_))));
    }

    #[test]
    fn test_get_new_extends_watermark() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env, "t");
        file.create().unwrap();

        let p2 = file.get_new().unwrap();
        let p3 = file.get_new().unwrap();
        assert_eq!(p2.block_id(), 2);
        assert_eq!(p3.block_id(), 3);
        assert_eq!(file.block_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env, "t");
        file.create().unwrap();

        let mut page = file.get(1).unwrap();
        let id = page.add(b"payload").unwrap();
        file.put(&page).unwrap();

        let reread = file.get(1).unwrap();
        assert_eq!(reread.get(id), Some(b"payload".as_slice()));
    }

    #[test]
    fn test_open_loads_last_from_record_count() {
        let env = MemoryEnv::new();
        {
            let mut file = HeapFile::new(env.clone(), "t");
            file.create().unwrap();
            file.get_new().unwrap();
            file.close().unwrap();
        }
        let mut file = HeapFile::new(env, "t");
        file.open().unwrap();
        assert_eq!(file.last_block_id(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env, "t");
        file.create().unwrap();
        file.close().unwrap();
        file.close().unwrap();
        assert!(matches!(file.get(1), Err(StoreError::Closed)));
    }

    #[test]
    fn test_destroy_removes_backing_file() {
        let env = MemoryEnv::new();
        let mut file = HeapFile::new(env.clone(), "t");
        file.create().unwrap();
        file.destroy().unwrap();
        assert!(matches!(env.open("t"), Err(StoreError::NotFound(_))));
    }
}
