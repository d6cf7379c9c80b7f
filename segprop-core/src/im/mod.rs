// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod annotation;
pub mod buffer;
pub mod mask;
pub mod meta;
pub mod rasterize;
pub mod vectorize;

pub use annotation::{AnnotationDocument, ClassGroup, Instance};
pub use buffer::MaskBuffer;
pub use mask::{ColorMask, LabelMask, SegmentMask};
pub use meta::{MetaIndex, MetaRecord};
pub use rasterize::{palette_color, rasterize, rasterize_file};
pub use vectorize::{VectorizeOptions, vectorize, vectorize_file, vectorize_labels, vectorize_palette};
