// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use crate::error::SegpropError;
use crate::ut::track::progress_warn;

/// Scratch directories holding the inputs of a single predictor run
///
/// Stale directories left by an interrupted run are cleared when the area
/// is created. The directories are removed again when the area is dropped,
/// on success and failure alike. Staged entries are symbolic links where
/// the platform supports them and copies otherwise.
#[derive(Debug)]
pub struct StagingArea {
    frames_dir: PathBuf,
    masks_dir: PathBuf,
}

impl StagingArea {
    /// Create fresh, empty staging directories
    pub fn new<P, Q>(frames_dir: P, masks_dir: Q) -> Result<StagingArea, SegpropError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let area = StagingArea {
            frames_dir: frames_dir.as_ref().to_path_buf(),
            masks_dir: masks_dir.as_ref().to_path_buf(),
        };

        for dir in [&area.frames_dir, &area.masks_dir] {
            if dir.exists() {
                std::fs::remove_dir_all(dir)
                    .map_err(|err| SegpropError::DirError(format!("{}: {}", dir.display(), err)))?;
            }

            std::fs::create_dir_all(dir)
                .map_err(|err| SegpropError::DirError(format!("{}: {}", dir.display(), err)))?;
        }

        Ok(area)
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn masks_dir(&self) -> &Path {
        &self.masks_dir
    }

    /// Stage a frame image under its own file name
    pub fn stage_frame<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf, SegpropError> {
        stage(source.as_ref(), &self.frames_dir)
    }

    /// Stage a reference mask under its own file name
    pub fn stage_mask<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf, SegpropError> {
        stage(source.as_ref(), &self.masks_dir)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        for dir in [&self.frames_dir, &self.masks_dir] {
            if dir.exists() {
                if let Err(err) = std::fs::remove_dir_all(dir) {
                    progress_warn(&format!("Failed to remove {}: {}", dir.display(), err));
                }
            }
        }
    }
}

fn stage(source: &Path, directory: &Path) -> Result<PathBuf, SegpropError> {
    let source = std::fs::canonicalize(source)
        .map_err(|_| SegpropError::MissingInput(source.display().to_string()))?;

    let name = source
        .file_name()
        .ok_or_else(|| SegpropError::OtherError(format!("Invalid file name {}", source.display())))?;

    let destination = directory.join(name);

    link(&source, &destination).map_err(|err| {
        SegpropError::DirError(format!(
            "Failed to stage {} in {}: {}",
            source.display(),
            directory.display(),
            err
        ))
    })?;

    Ok(destination)
}

#[cfg(unix)]
fn link(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, destination)
}

#[cfg(not(unix))]
fn link(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::copy(source, destination).map(|_| ())
}
