// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use crate::constant::{
    ANNOTATIONS_DIR, FRAME_IMAGE_EXTENSION, FRAME_MASK_EXTENSION, FRAMES_DIR, LOCK_FILENAME,
    MASKS_DIR, META_FILENAME, PREDICTED_MASKS_SUBDIR, PREDICTIONS_DIR, ROOT_ENV,
    STAGED_FRAMES_DIR, STAGED_MASKS_DIR,
};
use crate::ut::path::frame_file;

/// On-disk layout of a frame sequence
///
/// ```text
/// <root>/
///   JPEGImages/frame_%06d.jpg          frames
///   Annotations/frame_%06d.png         durable masks
///   json/frame_%06d.json               annotation documents
///   predicted_masks/meta.json          meta index
///   predicted_masks/masks/             predictor output
///   temp_frames/ temp_masks/           per-run staging
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLayout {
    pub root: PathBuf,
    pub frames_dir: PathBuf,
    pub masks_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub predictions_dir: PathBuf,
    pub staged_frames_dir: PathBuf,
    pub staged_masks_dir: PathBuf,
}

impl SequenceLayout {
    /// Default layout below a sequence root
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use segprop_core::pp::SequenceLayout;
    ///
    /// let layout = SequenceLayout::from_root("/data/sequence");
    /// assert_eq!(layout.meta_path(), Path::new("/data/sequence/predicted_masks/meta.json"));
    /// assert_eq!(layout.frame_path(3), Path::new("/data/sequence/JPEGImages/frame_000003.jpg"));
    /// ```
    pub fn from_root<P: AsRef<Path>>(root: P) -> SequenceLayout {
        let root = root.as_ref().to_path_buf();

        SequenceLayout {
            frames_dir: root.join(FRAMES_DIR),
            masks_dir: root.join(MASKS_DIR),
            annotations_dir: root.join(ANNOTATIONS_DIR),
            predictions_dir: root.join(PREDICTIONS_DIR),
            staged_frames_dir: root.join(STAGED_FRAMES_DIR),
            staged_masks_dir: root.join(STAGED_MASKS_DIR),
            root,
        }
    }

    /// Frame image of a frame number
    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.frames_dir.join(frame_file(frame, FRAME_IMAGE_EXTENSION))
    }

    /// Durable mask of a frame number
    pub fn mask_path(&self, frame: u64) -> PathBuf {
        self.masks_dir.join(frame_file(frame, FRAME_MASK_EXTENSION))
    }

    /// Mask the predictor is expected to write for a frame number
    pub fn predicted_mask_path(&self, frame: u64) -> PathBuf {
        self.predictions_dir
            .join(PREDICTED_MASKS_SUBDIR)
            .join(frame_file(frame, FRAME_MASK_EXTENSION))
    }

    /// Location of the meta index
    pub fn meta_path(&self) -> PathBuf {
        self.predictions_dir.join(META_FILENAME)
    }

    /// Location of the sequence lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILENAME)
    }
}

/// Resolve a sequence root from an explicit path, `SEGPROP_ROOT`, or the
/// current directory, in that order
pub fn resolve_root(root: Option<PathBuf>) -> PathBuf {
    root.or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = SequenceLayout::from_root("seq");

        assert_eq!(layout.mask_path(0), Path::new("seq/Annotations/frame_000000.png"));
        assert_eq!(
            layout.predicted_mask_path(12),
            Path::new("seq/predicted_masks/masks/frame_000012.png")
        );
        assert_eq!(layout.annotations_dir, Path::new("seq/json"));
        assert_eq!(layout.staged_frames_dir, Path::new("seq/temp_frames"));
        assert_eq!(layout.staged_masks_dir, Path::new("seq/temp_masks"));
        assert_eq!(layout.lock_path(), Path::new("seq/.segprop.lock"));
    }

    #[test]
    fn test_resolve_root_prefers_explicit() {
        assert_eq!(resolve_root(Some(PathBuf::from("explicit"))), PathBuf::from("explicit"));
    }
}
