//! Block-store backends.
//!
//! A [`StorageEnv`] is a database environment holding one record-number
//! file per relation, addressed by relation name. A [`BlockStore`] is one
//! such open file: a dense sequence of `BLOCK_SZ`-byte blocks keyed by
//! 1-based [`BlockId`].
//!
//! Two backends are provided: [`FileEnv`] persists each relation as a flat
//! file inside a directory, and [`MemoryEnv`] keeps everything in a shared
//! in-memory map (used by tests).

mod file;
mod memory;

pub use file::{FileEnv, FileStore};
pub use memory::{MemoryEnv, MemoryStore};

use super::{BlockId, StoreError};

/// A database environment: a namespace of per-relation block files.
///
/// Environments are cheap to clone; clones address the same underlying
/// storage.
pub trait StorageEnv: Clone {
    /// The open-file type produced by this environment.
    type Store: BlockStore;

    /// Creates a new backing file exclusively.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Exists` if a file of that name already exists.
    fn create(&self, name: &str) -> Result<Self::Store, StoreError>;

    /// Opens an existing backing file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no file of that name exists.
    fn open(&self, name: &str) -> Result<Self::Store, StoreError>;

    /// Removes a backing file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no file of that name exists.
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// An open record-number file of fixed-size blocks.
///
/// Keys are 1-based and dense: a file with `n` blocks holds keys `1..=n`,
/// and `put` may address at most key `n + 1` (append). Values are exactly
/// `BLOCK_SZ` bytes.
pub trait BlockStore {
    /// Reads the block under `key` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidBlockSize` unless `buf.len() == BLOCK_SZ`,
    /// and `StoreError::BlockNotFound` if `key` is out of range.
    fn get(&mut self, key: BlockId, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Writes `block` under `key`, appending when `key` is one past the end.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidBlockSize` unless
    /// `block.len() == BLOCK_SZ`, and `StoreError::BlockNotFound` if `key`
    /// would leave a gap.
    fn put(&mut self, key: BlockId, block: &[u8]) -> Result<(), StoreError>;

    /// Number of blocks in the file.
    fn record_count(&self) -> Result<u32, StoreError>;

    /// Flushes pending writes to the backing medium.
    fn sync(&mut self) -> Result<(), StoreError>;
}
