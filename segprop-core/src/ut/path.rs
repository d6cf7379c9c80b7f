// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::path::{Path, PathBuf};

use crate::constant::{FILE_PREFIX, FRAME_PREFIX, FRAME_WIDTH};
use crate::error::SegpropError;

/// Ensures a directory (and its parents) exists
pub fn ensure_directory<P: AsRef<Path>>(directory: P) -> Result<PathBuf, SegpropError> {
    let directory = directory.as_ref();

    std::fs::create_dir_all(directory).map_err(|err| {
        SegpropError::DirError(format!("{}: {}", directory.display(), err))
    })?;

    Ok(directory.to_path_buf())
}

/// Collect file paths from a directory with an optional substring filter
///
/// Paths are returned sorted by file name.
///
/// # Arguments
///
/// * `directory` - Path to directory containing files
/// * `valid_ext` - Only include files with one of these (lowercase) extensions
/// * `substring` - Only include files containing this substring
///
/// # Examples
///
/// ```no_run
/// use segprop_core::ut::path::collect_file_paths;
/// use segprop_core::constant::SUPPORTED_MASK_FORMATS;
/// let files = collect_file_paths("Annotations/", SUPPORTED_MASK_FORMATS.as_slice(), None);
/// ```
pub fn collect_file_paths<P>(
    directory: P,
    valid_ext: &[&str],
    substring: Option<String>,
) -> Result<Vec<PathBuf>, SegpropError>
where
    P: AsRef<Path>,
{
    let message = directory.as_ref().display().to_string();

    let mut files: Vec<PathBuf> = std::fs::read_dir(directory)
        .map_err(|_| SegpropError::DirError(message))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| valid_ext.contains(&ext.to_lowercase().as_str()))
        })
        .collect();

    if let Some(substring) = substring {
        files.retain(|f| {
            f.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(&substring))
        });
    }

    files.sort_unstable();

    Ok(files)
}

/// Zero-padded stem of a frame (e.g. `frame_000012`)
///
/// # Examples
///
/// ```
/// use segprop_core::ut::path::frame_key;
///
/// assert_eq!(frame_key(12), "frame_000012");
/// ```
pub fn frame_key(frame: u64) -> String {
    format!("{}{:0width$}", FRAME_PREFIX, frame, width = FRAME_WIDTH)
}

/// Fallback key for a document without a frame number at sorted `position`
///
/// # Examples
///
/// ```
/// use segprop_core::ut::path::file_key;
///
/// assert_eq!(file_key(0), "file_1");
/// ```
pub fn file_key(position: usize) -> String {
    format!("{}{}", FILE_PREFIX, position + 1)
}

/// Parse a frame number from the first run of digits in a file name
///
/// # Examples
///
/// ```
/// use segprop_core::ut::path::frame_number;
///
/// assert_eq!(frame_number("frame_000042.json"), Some(42));
/// assert_eq!(frame_number("image_7_v2.json"), Some(7));
/// assert_eq!(frame_number("meta.json"), None);
/// ```
pub fn frame_number(name: &str) -> Option<u64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

/// File name of a frame with the given extension (e.g. `frame_000003.png`)
pub fn frame_file(frame: u64, extension: &str) -> String {
    format!("{}.{}", frame_key(frame), extension)
}

/// File stem of a path as an owned string
pub fn file_stem<P: AsRef<Path>>(path: P) -> Result<String, SegpropError> {
    path.as_ref()
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SegpropError::OtherError(format!("Invalid file name {}", path.as_ref().display()))
        })
}
