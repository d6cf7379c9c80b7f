// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SegpropError {
    MissingInput(String),
    PredictorOutputMissing(String),
    PredictorError(String),
    ParseError(String),
    GeometryDegenerate,
    BufferSizeError,
    MaskReadError,
    MaskFormatError,
    ImageReadError,
    ImageWriteError,
    ImageExtensionError,
    AnnotationReadError(String),
    AnnotationWriteError(String),
    MetaWriteError(String),
    SequenceLocked(String),
    DirError(String),
    OtherError(String),
}

impl fmt::Display for SegpropError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SegpropError::MissingInput(message) => {
                write!(
                    f,
                    "[segprop::MissingInput] A required input does not exist. {}",
                    message
                )
            }
            SegpropError::PredictorOutputMissing(message) => {
                write!(
                    f,
                    "[segprop::PredictorOutputMissing] The predictor did not produce the expected mask. {}",
                    message
                )
            }
            SegpropError::PredictorError(message) => {
                write!(
                    f,
                    "[segprop::PredictorError] The predictor failed. {}",
                    message
                )
            }
            SegpropError::ParseError(message) => {
                write!(f, "[segprop::ParseError] Failed to parse input. {}", message)
            }
            SegpropError::GeometryDegenerate => {
                write!(
                    f,
                    "[segprop::GeometryDegenerate] Geometry requires at least one point (polygons at least three)."
                )
            }
            SegpropError::BufferSizeError => {
                write!(
                    f,
                    "[segprop::BufferSizeError] The buffer does not match provided size."
                )
            }
            SegpropError::MaskReadError => {
                write!(f, "[segprop::MaskReadError] Failed to read mask.")
            }
            SegpropError::MaskFormatError => {
                write!(
                    f,
                    "[segprop::MaskFormatError] Only 1-channel label masks and 3/4-channel color-coded masks are supported."
                )
            }
            SegpropError::ImageReadError => {
                write!(f, "[segprop::ImageReadError] Failed to read image.")
            }
            SegpropError::ImageWriteError => {
                write!(f, "[segprop::ImageWriteError] Failed to write image.")
            }
            SegpropError::ImageExtensionError => {
                write!(
                    f,
                    "[segprop::ImageExtensionError] Could not detect a valid image extension for input."
                )
            }
            SegpropError::AnnotationReadError(message) => {
                write!(
                    f,
                    "[segprop::AnnotationReadError] Annotation document could not be read. {}",
                    message
                )
            }
            SegpropError::AnnotationWriteError(message) => {
                write!(
                    f,
                    "[segprop::AnnotationWriteError] Failed to write annotation document. {}",
                    message
                )
            }
            SegpropError::MetaWriteError(message) => {
                write!(
                    f,
                    "[segprop::MetaWriteError] Failed to write meta index. {}",
                    message
                )
            }
            SegpropError::SequenceLocked(message) => {
                write!(
                    f,
                    "[segprop::SequenceLocked] Another propagation is running on this sequence. {}",
                    message
                )
            }
            SegpropError::DirError(message) => {
                write!(
                    f,
                    "[segprop::DirError] Directory could not be read or created. {}.",
                    message
                )
            }
            SegpropError::OtherError(message) => {
                write!(f, "[segprop::OtherError] Error: {}.", message)
            }
        }
    }
}

impl std::error::Error for SegpropError {}
