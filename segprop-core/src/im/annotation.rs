// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constant::{DEFAULT_INSTANCE_NAME, UNKNOWN_CLASS_NAME};
use crate::error::SegpropError;

/// One polygon with a stable identity across frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default)]
    pub instance_id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_points")]
    pub coordinates: Vec<[i32; 2]>,
}

/// Instances sharing one class name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    #[serde(default = "default_class")]
    pub class_name: String,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// All polygon instances of a single frame grouped by class
///
/// Groups appear in the order their class was first pushed, and empty groups
/// are never created.
///
/// # Examples
///
/// ```
/// use segprop_core::im::{AnnotationDocument, Instance};
///
/// let mut document = AnnotationDocument::new("frame_000001");
/// let instance = Instance {
///     instance_id: "Object-1".to_string(),
///     name: "Object".to_string(),
///     class_name: None,
///     coordinates: vec![[0, 0], [4, 0], [4, 4]],
/// };
///
/// document.push("1", instance.clone());
/// document.push("3", instance.clone());
/// document.push("1", instance);
///
/// assert_eq!(document.classes.len(), 2);
/// assert_eq!(document.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDocument {
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub classes: Vec<ClassGroup>,
}

fn default_name() -> String {
    DEFAULT_INSTANCE_NAME.to_string()
}

fn default_class() -> String {
    UNKNOWN_CLASS_NAME.to_string()
}

/// Points may be written by other tools as floats, so round on read
fn deserialize_points<'de, D>(deserializer: D) -> Result<Vec<[i32; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let points: Vec<[f64; 2]> = Vec::deserialize(deserializer)?;
    Ok(points
        .into_iter()
        .map(|[x, y]| [x.round() as i32, y.round() as i32])
        .collect())
}

impl AnnotationDocument {
    /// An empty document for the given image
    pub fn new(image_name: &str) -> AnnotationDocument {
        AnnotationDocument {
            image_name: image_name.to_string(),
            classes: Vec::new(),
        }
    }

    /// Append an instance to the group of `class_name`, creating it if needed
    pub fn push(&mut self, class_name: &str, instance: Instance) {
        match self.classes.iter_mut().find(|g| g.class_name == class_name) {
            Some(group) => group.instances.push(instance),
            None => self.classes.push(ClassGroup {
                class_name: class_name.to_string(),
                instances: vec![instance],
            }),
        }
    }

    /// Iterate over (class name, instance) pairs in document order
    pub fn instances(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.classes.iter().flat_map(|group| {
            group
                .instances
                .iter()
                .map(move |instance| (group.class_name.as_str(), instance))
        })
    }

    /// Total number of instances across all classes
    pub fn len(&self) -> usize {
        self.classes.iter().map(|g| g.instances.len()).sum()
    }

    /// Check if the document holds no instances
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an annotation document from a json file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AnnotationDocument, SegpropError> {
        let display = path.as_ref().display().to_string();
        let mut contents = String::new();

        File::open(&path)
            .map_err(|err| SegpropError::AnnotationReadError(format!("{}: {}", display, err)))?
            .read_to_string(&mut contents)
            .map_err(|err| SegpropError::AnnotationReadError(format!("{}: {}", display, err)))?;

        serde_json::from_str(&contents)
            .map_err(|err| SegpropError::ParseError(format!("{}: {}", display, err)))
    }

    /// Write the document as indented json
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SegpropError> {
        let display = path.as_ref().display().to_string();

        let file = File::create(&path)
            .map_err(|err| SegpropError::AnnotationWriteError(format!("{}: {}", display, err)))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|err| SegpropError::AnnotationWriteError(format!("{}: {}", display, err)))?;

        writer
            .flush()
            .map_err(|err| SegpropError::AnnotationWriteError(format!("{}: {}", display, err)))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn square(id: &str) -> Instance {
        Instance {
            instance_id: id.to_string(),
            name: "Object".to_string(),
            class_name: None,
            coordinates: vec![[10, 10], [50, 10], [50, 50], [10, 50]],
        }
    }

    #[test]
    fn test_document_groups_preserve_first_seen_order() {
        let mut document = AnnotationDocument::new("frame_000001");
        document.push("3", square("Object-1"));
        document.push("1", square("Object-2"));
        document.push("3", square("Object-3"));

        let classes: Vec<&str> = document.classes.iter().map(|g| g.class_name.as_str()).collect();
        assert_eq!(classes, vec!["3", "1"]);

        let ids: Vec<&str> = document.instances().map(|(_, i)| i.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["Object-1", "Object-3", "Object-2"]);
    }

    #[test]
    fn test_document_json_layout() {
        let mut document = AnnotationDocument::new("frame_000001");
        document.push("1", square("Object-1"));

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["imageName"], "frame_000001");
        assert_eq!(value["classes"][0]["className"], "1");
        assert_eq!(value["classes"][0]["instances"][0]["instanceId"], "Object-1");
        assert!(value["classes"][0]["instances"][0].get("className").is_none());
    }

    #[test]
    fn test_document_lenient_read() {
        let contents = r#"{
            "imageName": "frame_000004",
            "classes": [
                {"className": "2", "instances": [
                    {"instanceId": "Object-9", "coordinates": [[1.4, 2.6], [8, 2], [8, 9]]}
                ]}
            ]
        }"#;

        let document: AnnotationDocument = serde_json::from_str(contents).unwrap();
        let (class_name, instance) = document.instances().next().unwrap();

        assert_eq!(class_name, "2");
        assert_eq!(instance.name, "Object");
        assert_eq!(instance.coordinates, vec![[1, 3], [8, 2], [8, 9]]);
    }

    #[test]
    fn test_document_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_000001.json");

        let mut document = AnnotationDocument::new("frame_000001");
        document.push("1", square("Object-1"));
        document.save(&path).unwrap();

        assert_eq!(AnnotationDocument::open(&path).unwrap(), document);
    }

    #[test]
    fn test_document_open_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_000001.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AnnotationDocument::open(&path),
            Err(SegpropError::ParseError(_))
        ));
    }
}
