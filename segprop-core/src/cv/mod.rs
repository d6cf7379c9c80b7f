pub mod contours;
pub mod geometry;
pub mod morphology;
pub mod points;
pub mod simplify;

pub use contours::{find_contours, find_label_contours};
pub use geometry::{BoundingBox, bbox, center_distance, iou};
