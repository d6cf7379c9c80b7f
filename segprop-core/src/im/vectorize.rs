// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use crate::constant::{
    DEFAULT_INSTANCE_NAME, DEFAULT_INSTANCE_PREFIX, EPSILON_LABEL, FRAME_IMAGE_EXTENSION,
    MIN_CONTOUR_AREA, MIN_CONTOUR_PERIMETER, PALETTE,
};
use crate::cv::contours::{find_contours, find_label_contours};
use crate::cv::geometry::bbox;
use crate::cv::morphology::smooth;
use crate::cv::simplify::{adaptive_epsilon, approx_polygon, arc_length, contour_area};
use crate::error::SegpropError;
use crate::im::{AnnotationDocument, ColorMask, Instance, LabelMask, MetaIndex, MetaRecord, SegmentMask};
use crate::tr::{InstanceMatcher, MatchConfig};
use crate::ut::path::{ensure_directory, file_stem};
use crate::ut::track::progress_log;

/// Options controlling mask vectorization
#[derive(Debug, Clone, Default)]
pub struct VectorizeOptions {
    pub matching: MatchConfig,
    pub verbose: bool,
}

/// Convert a segmentation mask into an annotation document
///
/// Color-coded masks are split per palette color, smoothed, traced and
/// simplified; each surviving polygon is matched against `expected` to keep
/// identities stable across frames. Label masks are traced per label value
/// without smoothing, filtering or matching.
///
/// # Arguments
///
/// * `mask` - A color-coded or label mask
/// * `image_name` - Name of the frame image the mask belongs to
/// * `expected` - Instances expected in this frame, if any
/// * `options` - Matching configuration and verbosity
///
/// # Examples
///
/// ```
/// use segprop_core::im::{ColorMask, SegmentMask, VectorizeOptions, vectorize};
///
/// let mut mask = ColorMask::blank(64, 64);
/// for y in 10..=50 {
///     for x in 10..=50 {
///         mask.buffer[y * 64 + x] = [255, 0, 0];
///     }
/// }
///
/// let document = vectorize(
///     &SegmentMask::ColorCoded(mask),
///     "frame_000001.jpg",
///     None,
///     &VectorizeOptions::default(),
/// );
///
/// assert_eq!(document.classes[0].class_name, "1");
/// assert_eq!(document.classes[0].instances[0].instance_id, "Object-1");
/// ```
pub fn vectorize(
    mask: &SegmentMask,
    image_name: &str,
    expected: Option<&[MetaRecord]>,
    options: &VectorizeOptions,
) -> AnnotationDocument {
    match mask {
        SegmentMask::ColorCoded(mask) => vectorize_palette(mask, image_name, expected, options),
        SegmentMask::LabelValued(mask) => vectorize_labels(mask, image_name, options),
    }
}

/// Vectorize a color-coded mask using the fixed palette
pub fn vectorize_palette(
    mask: &ColorMask,
    image_name: &str,
    expected: Option<&[MetaRecord]>,
    options: &VectorizeOptions,
) -> AnnotationDocument {
    let (width, height) = (mask.width(), mask.height());
    let expected = expected.unwrap_or(&[]);

    let mut matcher = InstanceMatcher::new(expected, options.matching);
    let mut document = AnnotationDocument::new(image_name);

    for (color, default_class) in PALETTE.iter() {
        let binary = smooth(width, height, &mask.binary(color));
        let contours = find_contours(width, height, &binary);

        if contours.is_empty() {
            continue;
        }

        progress_log(
            &format!("Found {} contours for class {}.", contours.len(), default_class),
            options.verbose,
        );

        for contour in contours {
            let area = contour_area(&contour);
            let perimeter = arc_length(&contour);

            if area < MIN_CONTOUR_AREA || perimeter < MIN_CONTOUR_PERIMETER {
                continue;
            }

            let coordinates = approx_polygon(&contour, adaptive_epsilon(area, perimeter));
            if coordinates.len() < 3 {
                continue;
            }

            let Ok(candidate) = bbox(&coordinates) else {
                continue;
            };

            let assignment = matcher.assign(&candidate, default_class);

            match assignment.matched {
                Some((_, score)) => progress_log(
                    &format!(
                        "Matched instance {} with score {:.3}.",
                        assignment.instance_id, score
                    ),
                    options.verbose,
                ),
                None => progress_log(
                    &format!("Created new instance {}.", assignment.instance_id),
                    options.verbose,
                ),
            }

            document.push(
                &assignment.class_name,
                Instance {
                    instance_id: assignment.instance_id,
                    name: assignment.name,
                    class_name: None,
                    coordinates,
                },
            );
        }
    }

    document
}

/// Vectorize a label mask, one class per distinct non-zero value
///
/// Classes are named by the 1-based rank of their value and instances are
/// named `Object-<class rank>-Instance-<contour rank>`, where contours are
/// ranked in raster order of their first boundary pixel.
pub fn vectorize_labels(
    mask: &LabelMask,
    image_name: &str,
    options: &VectorizeOptions,
) -> AnnotationDocument {
    let (width, height) = (mask.width(), mask.height());
    let mut document = AnnotationDocument::new(image_name);

    for (class_rank, label) in mask.labels().into_iter().enumerate() {
        let class_name = (class_rank + 1).to_string();
        let contours = find_label_contours(width, height, mask.as_raw(), label);

        progress_log(
            &format!(
                "Found {} contours for label {} (class {}).",
                contours.len(),
                label,
                class_name
            ),
            options.verbose,
        );

        for (contour_rank, contour) in contours.iter().enumerate() {
            let perimeter = arc_length(contour);
            let coordinates = approx_polygon(contour, EPSILON_LABEL * perimeter);

            if coordinates.len() < 3 {
                continue;
            }

            document.push(
                &class_name,
                Instance {
                    instance_id: format!(
                        "{}{}-Instance-{}",
                        DEFAULT_INSTANCE_PREFIX,
                        class_rank + 1,
                        contour_rank + 1
                    ),
                    name: DEFAULT_INSTANCE_NAME.to_string(),
                    class_name: None,
                    coordinates,
                },
            );
        }
    }

    document
}

/// Vectorize a mask file and write `<stem>.json` into `output_dir`
///
/// The frame key used to look up expected instances in `meta` is the mask's
/// file stem (e.g. `frame_000002`).
///
/// # Examples
///
/// ```no_run
/// use segprop_core::im::{MetaIndex, VectorizeOptions, vectorize_file};
///
/// let meta = MetaIndex::open("predicted_masks/meta.json").unwrap();
/// let output = vectorize_file(
///     "Annotations/frame_000002.png",
///     "json/",
///     Some(&meta),
///     &VectorizeOptions::default(),
/// );
/// ```
pub fn vectorize_file<P, Q>(
    mask_path: P,
    output_dir: Q,
    meta: Option<&MetaIndex>,
    options: &VectorizeOptions,
) -> Result<PathBuf, SegpropError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mask_path = mask_path.as_ref();

    if !mask_path.is_file() {
        return Err(SegpropError::MissingInput(mask_path.display().to_string()));
    }

    let stem = file_stem(mask_path)?;
    let mask = SegmentMask::open(mask_path)?;

    let expected = meta.and_then(|m| m.expected(&stem));

    progress_log(
        &format!(
            "Vectorizing {} with {} expected instances.",
            mask_path.display(),
            expected.map_or(0, <[MetaRecord]>::len)
        ),
        options.verbose,
    );

    let image_name = format!("{}.{}", stem, FRAME_IMAGE_EXTENSION);
    let document = vectorize(&mask, &image_name, expected, options);

    let output_dir = ensure_directory(output_dir)?;
    let output = output_dir.join(format!("{}.json", stem));
    document.save(&output)?;

    progress_log(
        &format!(
            "Wrote {} classes and {} instances to {}.",
            document.classes.len(),
            document.len(),
            output.display()
        ),
        options.verbose,
    );

    Ok(output)
}
