//! Byte acquisition for book sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Produces the raw bytes of a book. Abstracts over where an ePub comes
/// from so the parsing pipeline never touches the filesystem directly.
pub trait ByteFetch {
    fn fetch_bytes(&self) -> io::Result<Vec<u8>>;
}

/// Reads the whole file at a path.
#[derive(Debug, Clone)]
pub struct FileFetch {
    path: PathBuf,
}

impl FileFetch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteFetch for FileFetch {
    fn fetch_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// Serves bytes already held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFetch {
    data: Vec<u8>,
}

impl MemoryFetch {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ByteFetch for MemoryFetch {
    fn fetch_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}
