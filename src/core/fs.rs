//! File-system seam used by the resolution catalog.
//!
//! The catalog only needs three operations: list regular files in a directory, read a
//! file's modification time and read its contents. [`FileSystem`] captures exactly those,
//! so tests can substitute a counting in-memory implementation.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub trait FileSystem {
    /// Regular files directly inside `dir`, in no particular order
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
