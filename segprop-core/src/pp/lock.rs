// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::SegpropError;
use crate::ut::track::progress_warn;

/// Exclusive lock on a sequence held for the duration of one propagation
///
/// The lock is a file created with create-new semantics, so a second
/// holder fails immediately instead of waiting. It is removed on drop.
#[derive(Debug)]
pub struct SequenceLock {
    path: PathBuf,
}

impl SequenceLock {
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<SequenceLock, SegpropError> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => SegpropError::SequenceLocked(format!(
                    "Remove {} if no other run is active.",
                    path.display()
                )),
                _ => SegpropError::DirError(format!("{}: {}", path.display(), err)),
            })?;

        let lock = SequenceLock { path };

        // Owner pid helps identify stale locks
        writeln!(file, "{}", std::process::id())
            .map_err(|err| SegpropError::DirError(format!("{}: {}", lock.path.display(), err)))?;

        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SequenceLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            progress_warn(&format!("Failed to release {}: {}", self.path.display(), err));
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_lock_is_exclusive_and_released() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".segprop.lock");

        let lock = SequenceLock::acquire(&path).unwrap();
        assert!(lock.path().exists());

        assert!(matches!(
            SequenceLock::acquire(&path),
            Err(SegpropError::SequenceLocked(_))
        ));

        drop(lock);
        assert!(!path.exists());
        assert!(SequenceLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_lock_records_owner_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".segprop.lock");

        let _lock = SequenceLock::acquire(&path).unwrap();
        let owner = std::fs::read_to_string(&path).unwrap();

        assert_eq!(owner.trim(), std::process::id().to_string());
    }
}
