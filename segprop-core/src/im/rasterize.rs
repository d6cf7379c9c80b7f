// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use crate::constant::{FRAME_IMAGE_EXTENSION, FRAME_MASK_EXTENSION, PALETTE, UNKNOWN_CLASS_COLOR};
use crate::cv::points::draw_points_mut;
use crate::error::SegpropError;
use crate::im::{AnnotationDocument, ColorMask};
use crate::ut::path::{ensure_directory, file_stem};
use crate::ut::track::progress_log;

/// Palette color of a class name, white for unknown classes
///
/// # Examples
///
/// ```
/// use segprop_core::im::palette_color;
///
/// assert_eq!(palette_color("1"), [255, 0, 0]);
/// assert_eq!(palette_color("dog"), [255, 255, 255]);
/// ```
pub fn palette_color(class_name: &str) -> [u8; 3] {
    PALETTE
        .iter()
        .find(|(_, name)| *name == class_name)
        .map(|(color, _)| *color)
        .unwrap_or(UNKNOWN_CLASS_COLOR)
}

/// Paint every instance polygon of a document onto a black canvas
///
/// Instances are filled in document order so later polygons overwrite
/// earlier ones where they overlap.
pub fn rasterize(document: &AnnotationDocument, width: u32, height: u32) -> ColorMask {
    let mut canvas = vec![0u32; width as usize * height as usize];
    let mut colors: Vec<[u8; 3]> = vec![[0, 0, 0]];

    for group in document.classes.iter() {
        let color = palette_color(&group.class_name);
        let index = match colors.iter().position(|c| *c == color) {
            Some(index) => index,
            None => {
                colors.push(color);
                colors.len() - 1
            }
        };

        for instance in group.instances.iter() {
            draw_points_mut(&mut canvas, width, height, &instance.coordinates, index as u32);
        }
    }

    let mut mask = ColorMask::blank(width, height);
    for (pixel, &index) in mask.buffer.iter_mut().zip(canvas.iter()) {
        *pixel = colors[index as usize];
    }

    mask
}

/// Rasterize an annotation document into `<image stem>.png` in `output_dir`
///
/// The canvas takes the dimensions of the frame image named by the
/// document, looked up in `frames_dir`.
///
/// # Arguments
///
/// * `document_path` - Path to an annotation document
/// * `frames_dir` - Directory holding the frame images
/// * `output_dir` - Directory receiving the mask
/// * `verbose` - Log progress
pub fn rasterize_file<P, Q, R>(
    document_path: P,
    frames_dir: Q,
    output_dir: R,
    verbose: bool,
) -> Result<PathBuf, SegpropError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let document = AnnotationDocument::open(&document_path)?;

    let image_name = if document.image_name.is_empty() {
        format!("{}.{}", file_stem(&document_path)?, FRAME_IMAGE_EXTENSION)
    } else if Path::new(&document.image_name).extension().is_none() {
        format!("{}.{}", document.image_name, FRAME_IMAGE_EXTENSION)
    } else {
        document.image_name.clone()
    };

    let image_path = frames_dir.as_ref().join(&image_name);
    if !image_path.is_file() {
        return Err(SegpropError::MissingInput(image_path.display().to_string()));
    }

    let (width, height) =
        image::image_dimensions(&image_path).map_err(|_| SegpropError::ImageReadError)?;

    let mask = rasterize(&document, width, height);

    let output_dir = ensure_directory(output_dir)?;
    let output = output_dir.join(format!("{}.{}", file_stem(&image_name)?, FRAME_MASK_EXTENSION));
    mask.save(&output)?;

    progress_log(
        &format!(
            "Painted {} instances from {} to {}.",
            document.len(),
            document_path.as_ref().display(),
            output.display()
        ),
        verbose,
    );

    Ok(output)
}
