//! XXH64 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] used by the duplicate finder:
//!
//! - [`Hasher::hash_first_block`]: hash of the first [`PREHASH_SIZE`] bytes,
//!   a cheap filter before full hashing
//! - [`Hasher::hash_file`]: streaming hash of the whole content, together with
//!   the metadata of the open handle
//! - [`Hasher::files_identical`]: byte-for-byte comparison
//!
//! All hashes use XXH64 with seed 0. For a file no larger than
//! [`PREHASH_SIZE`], the first-block hash equals the full hash.
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let (hash, stats) = hasher.hash_file(Path::new("some_file.txt")).unwrap();
//! println!("{:016x} ({} bytes)", hash, stats.size);
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

use xxhash_rust::xxh64::{xxh64, Xxh64};

use super::hardlink::raw_identity;
use super::pool::ObjectPool;
use super::HashError;

/// Bytes read for the partial (first-block) hash: 4 KiB.
pub const PREHASH_SIZE: usize = 4 * 1024;

/// Read size used while streaming a full hash: 32 KiB.
pub const BLOCK_SIZE: usize = 32 * 1024;

/// Seed for every XXH64 computation.
const SEED: u64 = 0;

/// Idle items kept per pool.
const POOL_CAPACITY: usize = 64;

/// Metadata captured from an open file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// File size in bytes
    pub size: u64,
    /// Device identifier (`0` when unavailable)
    pub device_id: u64,
    /// Inode number (`0` when unavailable)
    pub inode: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileStats {
    fn from_file(file: &File) -> io::Result<Self> {
        let metadata = file.metadata()?;
        let (device_id, inode) = raw_identity(&metadata);
        Ok(Self {
            size: metadata.len(),
            device_id,
            inode,
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        })
    }
}

/// File hasher backed by pools of read buffers and hash states.
///
/// The hasher holds no per-file state, so one instance is shared between
/// all worker threads through `Arc`.
pub struct Hasher {
    buffers: ObjectPool<Vec<u8>>,
    states: ObjectPool<Xxh64>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hasher")
            .field("buffers", &self.buffers)
            .field("states", &self.states)
            .finish()
    }
}

impl Hasher {
    /// Create a hasher with empty pools.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: ObjectPool::new(POOL_CAPACITY, || vec![0u8; BLOCK_SIZE], |buf| {
                buf.resize(BLOCK_SIZE, 0);
            }),
            states: ObjectPool::new(POOL_CAPACITY, || Xxh64::new(SEED), |state| {
                state.reset(SEED);
            }),
        }
    }

    /// Hash the first [`PREHASH_SIZE`] bytes of a file.
    ///
    /// Files shorter than the block are hashed over the bytes they have.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn hash_first_block(&self, path: &Path) -> Result<u64, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut block = [0u8; PREHASH_SIZE];
        let filled = read_full(&mut file, &mut block).map_err(|e| HashError::from_io(path, e))?;
        Ok(xxh64(&block[..filled], SEED))
    }

    /// Hash the whole content of a file.
    ///
    /// Size, identity and mtime are taken from the open handle, so they
    /// describe exactly the file that was hashed.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened, stat'ed or read.
    pub fn hash_file(&self, path: &Path) -> Result<(u64, FileStats), HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let stats = FileStats::from_file(&file).map_err(|e| HashError::from_io(path, e))?;

        let mut buffer = self.buffers.acquire();
        let mut state = self.states.acquire();

        loop {
            let n = match file.read(&mut buffer[..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..n]);
        }

        Ok((state.digest(), stats))
    }

    /// Compare two files byte by byte.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] naming whichever file failed.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

        let len_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
        let len_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
        if len_a != len_b {
            return Ok(false);
        }

        let mut buf_a = self.buffers.acquire();
        let mut buf_b = self.buffers.acquire();

        loop {
            let n_a = read_full(&mut file_a, &mut buf_a[..]).map_err(|e| HashError::from_io(a, e))?;
            let n_b = read_full(&mut file_b, &mut buf_b[..]).map_err(|e| HashError::from_io(b, e))?;
            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Fill `buf` from `reader` until it is full or EOF is reached.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Render a hash as 16 lowercase hex digits.
#[must_use]
pub fn hash_to_hex(hash: u64) -> String {
    format!("{hash:016x}")
}
