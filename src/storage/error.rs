//! Block-store errors.

use std::fmt;

use super::BlockId;

/// Errors from the block-store layer.
#[derive(Debug)]
pub enum StoreError {
    /// Backing file already exists (exclusive create).
    Exists(String),
    /// Backing file not found.
    NotFound(String),
    /// Block key outside the file's record range.
    BlockNotFound(BlockId),
    /// Operation on a file that is not open.
    Closed,
    /// Buffer or block of the wrong size.
    InvalidBlockSize {
        /// Expected size (`BLOCK_SZ`).
        expected: usize,
        /// Size actually provided.
        actual: usize,
    },
    /// File contents are not a whole number of blocks.
    Corrupted(String),
    /// I/O error from the file system.
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Exists(name) => write!(f, "file '{}' already exists", name),
            StoreError::NotFound(name) => write!(f, "file '{}' not found", name),
            StoreError::BlockNotFound(id) => write!(f, "block {} not found", id),
            StoreError::Closed => write!(f, "file is not open"),
            StoreError::InvalidBlockSize { expected, actual } => {
                write!(f, "invalid block size: expected {}, got {}", expected, actual)
            }
            StoreError::Corrupted(msg) => write!(f, "corrupted file: {}", msg),
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
