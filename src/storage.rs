//! Block-addressed storage.
//!
//! The engine persists every relation as one record-number file of
//! fixed-size blocks. This module defines the block constants, the
//! environment/file seam ([`StorageEnv`]/[`BlockStore`]), and the disk and
//! in-memory backends.

mod error;
pub mod io;

pub use error::StoreError;
pub use io::{BlockStore, FileEnv, FileStore, MemoryEnv, MemoryStore, StorageEnv};

/// Size of one block in bytes.
pub const BLOCK_SZ: usize = 4096;

/// 1-based identifier of a block within one backing file.
pub type BlockId = u32;
