use std::{fs::File, path::Path, time::Instant};

use fs4::fs_std::FileExt;
use log::debug;
use thiserror::Error;

/// Advisory exclusive lock on a file, released when dropped.
pub struct FileLock {
    _file: File,
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] std::io::Error);

impl FileLock {
    /// Blocks until no other process holds the lock on `path`.
    pub fn new(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)?;
        let start = Instant::now();
        file.lock_exclusive()?;
        debug!(
            "Locked {} after {} ms",
            path.display(),
            start.elapsed().as_millis()
        );
        Ok(Self { _file: file })
    }
}
