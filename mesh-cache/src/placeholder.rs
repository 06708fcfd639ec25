//! Detection of Git LFS pointer files.
//!
//! A repository that stores meshes with Git LFS but was cloned without
//! fetching them contains small text pointers in place of the binaries.

use std::io::Read;
use std::path::Path;

/// First line of every Git LFS pointer file.
pub const LFS_POINTER_HEADER: &[u8] = b"version https://git-lfs.github.com/spec/v1";

/// Whether `bytes` begin like a Git LFS pointer.
pub fn looks_like_lfs_pointer(bytes: &[u8]) -> bool {
    bytes.starts_with(LFS_POINTER_HEADER)
}

/// Whether the file at `path` is a Git LFS pointer.
///
/// Reads at most `scan_bytes` bytes. Unreadable files are not pointers.
pub fn is_lfs_pointer(path: &Path, scan_bytes: usize) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(scan_bytes.min(LFS_POINTER_HEADER.len() * 4));
    if file.take(scan_bytes as u64).read_to_end(&mut head).is_err() {
        return false;
    }
    looks_like_lfs_pointer(&head)
}
