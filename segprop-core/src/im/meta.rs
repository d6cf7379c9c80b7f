// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constant::{META_FILENAME, SUPPORTED_ARRAY_FORMATS};
use crate::cv::geometry::{BoundingBox, bbox};
use crate::error::SegpropError;
use crate::im::AnnotationDocument;
use crate::ut::path::{collect_file_paths, file_key, frame_key, frame_number};
use crate::ut::track::{progress_log, progress_warn};

/// An instance expected to reappear in the following frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRecord {
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub coordinates: Vec<[i32; 2]>,
}

/// Forward index from a frame key to the instances expected in that frame
///
/// Instances found in frame `f` are stored under the key of frame `f + 1`.
/// The index is always rebuilt from every annotation document in a
/// directory and never merged with a previous index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaIndex {
    pub frames: BTreeMap<String, Vec<MetaRecord>>,
}

impl MetaIndex {
    /// Expected records for a frame key (e.g. `frame_000002`)
    pub fn expected(&self, key: &str) -> Option<&[MetaRecord]> {
        self.frames.get(key).map(Vec::as_slice)
    }

    /// Number of frame keys in the index
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the index has no frame keys
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Read a meta index from a json file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<MetaIndex, SegpropError> {
        let display = path.as_ref().display().to_string();
        let mut contents = String::new();

        File::open(&path)
            .map_err(|err| SegpropError::MissingInput(format!("{}: {}", display, err)))?
            .read_to_string(&mut contents)
            .map_err(|err| SegpropError::ParseError(format!("{}: {}", display, err)))?;

        serde_json::from_str(&contents)
            .map_err(|err| SegpropError::ParseError(format!("{}: {}", display, err)))
    }

    /// Read a meta index, treating a missing or unreadable file as empty
    pub fn open_or_empty<P: AsRef<Path>>(path: P, verbose: bool) -> MetaIndex {
        match MetaIndex::open(&path) {
            Ok(index) => index,
            Err(SegpropError::MissingInput(_)) => {
                progress_log(
                    &format!(
                        "No meta index at {}, all instances will be new.",
                        path.as_ref().display()
                    ),
                    verbose,
                );
                MetaIndex::default()
            }
            Err(err) => {
                progress_warn(&format!("Ignoring meta index. {}", err));
                MetaIndex::default()
            }
        }
    }

    /// Write the index as indented json
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SegpropError> {
        let display = path.as_ref().display().to_string();

        let file = File::create(&path)
            .map_err(|err| SegpropError::MetaWriteError(format!("{}: {}", display, err)))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|err| SegpropError::MetaWriteError(format!("{}: {}", display, err)))?;

        writer
            .flush()
            .map_err(|err| SegpropError::MetaWriteError(format!("{}: {}", display, err)))
    }

    /// Build the index from every annotation document in a directory
    ///
    /// Documents are ordered by the first run of digits in their file name;
    /// names without digits sort first and are keyed `file_<position>`.
    /// A document that fails to parse is reported and skipped, as is any
    /// instance without coordinates.
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory holding per-frame annotation documents
    /// * `verbose` - Log progress
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use segprop_core::im::MetaIndex;
    ///
    /// let index = MetaIndex::rebuild("json/", false).unwrap();
    /// let expected = index.expected("frame_000002");
    /// ```
    pub fn rebuild<P: AsRef<Path>>(directory: P, verbose: bool) -> Result<MetaIndex, SegpropError> {
        let mut documents: Vec<_> =
            collect_file_paths(&directory, SUPPORTED_ARRAY_FORMATS.as_slice(), None)?
                .into_iter()
                .filter(|path| path.file_name().is_some_and(|name| name != META_FILENAME))
                .map(|path| {
                    let number = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .and_then(frame_number);
                    (number, path)
                })
                .collect();

        // Stable so that equal frame numbers keep their file name order
        documents.sort_by_key(|(number, _)| *number);

        let mut index = MetaIndex::default();

        for (position, (number, path)) in documents.iter().enumerate() {
            let key = match number {
                Some(frame) => frame_key(frame.saturating_add(1)),
                None => file_key(position),
            };

            let document = match AnnotationDocument::open(path) {
                Ok(document) => document,
                Err(err) => {
                    progress_warn(&format!("Skipping {}. {}", path.display(), err));
                    continue;
                }
            };

            let records: Vec<MetaRecord> = document
                .instances()
                .filter_map(|(class_name, instance)| {
                    let bbox = bbox(&instance.coordinates).ok()?;
                    Some(MetaRecord {
                        instance_id: instance.instance_id.clone(),
                        name: instance.name.clone(),
                        class_name: class_name.to_string(),
                        bbox: Some(bbox),
                        coordinates: instance.coordinates.clone(),
                    })
                })
                .collect();

            progress_log(
                &format!(
                    "{} -> {} ({} expected instances)",
                    path.display(),
                    key,
                    records.len()
                ),
                verbose,
            );

            index.frames.insert(key, records);
        }

        Ok(index)
    }

    /// Rebuild the index from `directory` and write it to `output`
    pub fn rebuild_to<P, Q>(directory: P, output: Q, verbose: bool) -> Result<MetaIndex, SegpropError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let source = directory.as_ref().display().to_string();
        let index = MetaIndex::rebuild(directory, verbose)?;

        if let Some(parent) = output.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    SegpropError::MetaWriteError(format!("{}: {}", parent.display(), err))
                })?;
            }
        }

        index.save(&output)?;

        progress_log(
            &format!(
                "Meta index for {} frames written to {} (source: {}).",
                index.len(),
                output.as_ref().display(),
                source
            ),
            verbose,
        );

        Ok(index)
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::im::Instance;

    fn write_document(dir: &Path, name: &str, ids: &[&str]) {
        let mut document = AnnotationDocument::new(name.trim_end_matches(".json"));
        for (i, id) in ids.iter().enumerate() {
            let offset = 10 * i as i32;
            document.push(
                "1",
                Instance {
                    instance_id: id.to_string(),
                    name: "Object".to_string(),
                    class_name: None,
                    coordinates: vec![
                        [offset, offset],
                        [offset + 5, offset],
                        [offset + 5, offset + 5],
                    ],
                },
            );
        }
        document.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_rebuild_projects_forward() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), "frame_000001.json", &["Object-1"]);
        write_document(dir.path(), "frame_000002.json", &["Object-1", "Object-2"]);
        write_document(dir.path(), "frame_000003.json", &["Object-2"]);

        let index = MetaIndex::rebuild(dir.path(), false).unwrap();
        let keys: Vec<&String> = index.frames.keys().collect();

        assert_eq!(keys, vec!["frame_000002", "frame_000003", "frame_000004"]);
        assert!(index.expected("frame_000001").is_none());
        assert_eq!(index.expected("frame_000003").unwrap().len(), 2);

        let record = &index.expected("frame_000002").unwrap()[0];
        assert_eq!(record.instance_id, "Object-1");
        assert_eq!(record.class_name, "1");
        assert_eq!(record.bbox, Some([0, 0, 5, 5]));
    }

    #[test]
    fn test_rebuild_skips_malformed_and_meta() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), "frame_000001.json", &["Object-1"]);
        std::fs::write(dir.path().join("frame_000002.json"), "{ broken").unwrap();
        std::fs::write(dir.path().join("meta.json"), "{}").unwrap();

        let index = MetaIndex::rebuild(dir.path(), false).unwrap();
        let keys: Vec<&String> = index.frames.keys().collect();

        assert_eq!(keys, vec!["frame_000002"]);
    }

    #[test]
    fn test_rebuild_skips_instances_without_points() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("frame_000005.json"),
            r#"{"imageName": "frame_000005", "classes": [{"className": "2", "instances": [
                {"instanceId": "Object-1", "coordinates": []},
                {"instanceId": "Object-2", "coordinates": [[1, 1], [4, 1], [4, 6]]}
            ]}]}"#,
        )
        .unwrap();

        let index = MetaIndex::rebuild(dir.path(), false).unwrap();
        let records = index.expected("frame_000006").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instance_id, "Object-2");
        assert_eq!(records[0].bbox, Some([1, 1, 4, 6]));
    }

    #[test]
    fn test_rebuild_file_fallback_key() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), "reference.json", &["Object-1"]);
        write_document(dir.path(), "frame_000000.json", &["Object-1"]);

        let index = MetaIndex::rebuild(dir.path(), false).unwrap();
        let keys: Vec<&String> = index.frames.keys().collect();

        assert_eq!(keys, vec!["file_1", "frame_000001"]);
    }

    #[test]
    fn test_rebuild_to_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("predicted_masks").join("meta.json");
        write_document(dir.path(), "frame_000001.json", &["Object-1"]);

        let index = MetaIndex::rebuild_to(dir.path(), &output, false).unwrap();

        assert_eq!(MetaIndex::open(&output).unwrap(), index);
    }

    #[test]
    fn test_open_or_empty_missing() {
        let index = MetaIndex::open_or_empty("does_not_exist/meta.json", false);
        assert!(index.is_empty());
    }
}
