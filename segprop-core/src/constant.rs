// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

// All currently supported mask formats
pub const SUPPORTED_MASK_FORMATS: [&str; 6] = ["png", "bmp", "tif", "tiff", "pgm", "ppm"];

// All currently supported annotation formats
pub const SUPPORTED_ARRAY_FORMATS: [&str; 1] = ["json"];

// Extension of frame images and masks sharing a file stem
pub const FRAME_IMAGE_EXTENSION: &str = "jpg";
pub const FRAME_MASK_EXTENSION: &str = "png";

// Frame files are named frame_%06d
pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_WIDTH: usize = 6;

// Fallback meta key prefix for documents without a frame number
pub const FILE_PREFIX: &str = "file_";

// Default layout of a frame sequence root
pub const FRAMES_DIR: &str = "JPEGImages";
pub const MASKS_DIR: &str = "Annotations";
pub const ANNOTATIONS_DIR: &str = "json";
pub const PREDICTIONS_DIR: &str = "predicted_masks";
pub const PREDICTED_MASKS_SUBDIR: &str = "masks";
pub const STAGED_FRAMES_DIR: &str = "temp_frames";
pub const STAGED_MASKS_DIR: &str = "temp_masks";
pub const META_FILENAME: &str = "meta.json";
pub const LOCK_FILENAME: &str = ".segprop.lock";

// Environment variable overriding the sequence root
pub const ROOT_ENV: &str = "SEGPROP_ROOT";

// Color-coded palette as stored on disk (RGB order) and the default class names
pub const PALETTE: [([u8; 3], &str); 8] = [
    ([255, 0, 0], "1"),     // Red
    ([0, 0, 255], "2"),     // Blue
    ([0, 255, 0], "3"),     // Green
    ([0, 255, 255], "4"),   // Cyan
    ([255, 0, 255], "5"),   // Magenta
    ([255, 255, 0], "6"),   // Yellow
    ([128, 0, 128], "7"),   // Purple
    ([0, 165, 255], "8"),   // Orange
];

// Color painted for classes that are not in the palette
pub const UNKNOWN_CLASS_COLOR: [u8; 3] = [255, 255, 255];

// Class name of groups read without one
pub const UNKNOWN_CLASS_NAME: &str = "unknown";

// Contour noise filter applied in palette mode
pub const MIN_CONTOUR_AREA: f64 = 50.0;
pub const MIN_CONTOUR_PERIMETER: f64 = 30.0;

// Adaptive simplification: (area above, epsilon as a fraction of perimeter)
pub const EPSILON_TABLE: [(f64, f64); 2] = [(1000.0, 0.005), (200.0, 0.01)];
pub const EPSILON_SMALL: f64 = 0.02;

// Label mode uses a single fixed tolerance
pub const EPSILON_LABEL: f64 = 0.005;

// Instance matching
pub const MATCH_IOU_WEIGHT: f64 = 0.7;
pub const MATCH_DISTANCE_WEIGHT: f64 = 0.3;
pub const MATCH_MIN_SCORE: f64 = 0.3;
pub const MATCH_MAX_DISTANCE: f64 = 2.0;

// Guards divisions in box overlap and distance
pub const GEOMETRY_EPSILON: f64 = 1e-6;

// Defaults for synthesized instances
pub const DEFAULT_INSTANCE_NAME: &str = "Object";
pub const DEFAULT_INSTANCE_PREFIX: &str = "Object-";
