// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::BTreeSet;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb, open as open_dynamic};

use crate::constant;
use crate::error::SegpropError;
use crate::im::MaskBuffer;

/// A color-coded mask storing one RGB triplet per pixel
pub type ColorMask = MaskBuffer<[u8; 3]>;

/// A label mask storing one integer label per pixel (0 is background)
pub type LabelMask = MaskBuffer<u32>;

/// A raster mask resolved once into one of the two supported encodings
///
/// Multi-channel images are treated as color-coded masks drawn with the
/// fixed palette. Single-channel images are treated as label masks where
/// each distinct non-zero value is one object.
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, RgbImage};
/// use segprop_core::im::SegmentMask;
///
/// let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
/// assert!(matches!(SegmentMask::new_from_dynamic(gray), Ok(SegmentMask::LabelValued(_))));
///
/// let rgb = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
/// assert!(matches!(SegmentMask::new_from_dynamic(rgb), Ok(SegmentMask::ColorCoded(_))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentMask {
    ColorCoded(ColorMask),
    LabelValued(LabelMask),
}

// >>> I/O METHODS

impl SegmentMask {
    /// Open a mask from a provided path
    ///
    /// # Arguments
    ///
    /// * `path` - A path to a mask with a valid extension
    ///
    /// ```no_run
    /// use segprop_core::im::SegmentMask;
    /// let mask = SegmentMask::open("frame_000001.png");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SegmentMask, SegpropError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if constant::SUPPORTED_MASK_FORMATS.iter().any(|e| e == &ext) {
                let image = open_dynamic(&path).map_err(|_| SegpropError::MaskReadError)?;
                return Self::new_from_dynamic(image);
            }
        }

        Err(SegpropError::ImageExtensionError)
    }

    /// Initialize a new mask from a DynamicImage
    ///
    /// # Arguments
    ///
    /// * `mask` - An 8 or 16-bit grayscale image or an 8-bit RGB(A) image
    pub fn new_from_dynamic(mask: DynamicImage) -> Result<SegmentMask, SegpropError> {
        let width = mask.width();
        let height = mask.height();

        match mask {
            DynamicImage::ImageLuma8(buffer) => Ok(SegmentMask::LabelValued(LabelMask::new(
                width,
                height,
                buffer.into_raw().into_iter().map(u32::from).collect(),
            )?)),
            DynamicImage::ImageLumaA8(buffer) => Ok(SegmentMask::LabelValued(LabelMask::new(
                width,
                height,
                buffer
                    .into_raw()
                    .chunks_exact(2)
                    .map(|pixel| u32::from(pixel[0]))
                    .collect(),
            )?)),
            DynamicImage::ImageLuma16(buffer) => Ok(SegmentMask::LabelValued(LabelMask::new(
                width,
                height,
                buffer.into_raw().into_iter().map(u32::from).collect(),
            )?)),
            DynamicImage::ImageLumaA16(buffer) => Ok(SegmentMask::LabelValued(LabelMask::new(
                width,
                height,
                buffer
                    .into_raw()
                    .chunks_exact(2)
                    .map(|pixel| u32::from(pixel[0]))
                    .collect(),
            )?)),
            DynamicImage::ImageRgb8(buffer) => Ok(SegmentMask::ColorCoded(ColorMask::new(
                width,
                height,
                buffer
                    .into_raw()
                    .chunks_exact(3)
                    .map(|pixel| [pixel[0], pixel[1], pixel[2]])
                    .collect(),
            )?)),
            DynamicImage::ImageRgba8(buffer) => Ok(SegmentMask::ColorCoded(ColorMask::new(
                width,
                height,
                buffer
                    .into_raw()
                    .chunks_exact(4)
                    .map(|pixel| [pixel[0], pixel[1], pixel[2]])
                    .collect(),
            )?)),
            _ => Err(SegpropError::MaskFormatError),
        }
    }
}

impl ColorMask {
    /// A black color-coded canvas
    pub fn blank(width: u32, height: u32) -> ColorMask {
        MaskBuffer::filled(width, height, [0u8; 3])
    }

    /// Save the color-coded mask as a 3-channel image
    ///
    /// ```no_run
    /// use segprop_core::im::ColorMask;
    /// ColorMask::blank(64, 64).save("frame_000000.png").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SegpropError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if constant::SUPPORTED_MASK_FORMATS.iter().any(|e| e == &ext) {
                let raw: Vec<u8> = self.as_raw().iter().flatten().copied().collect();

                return ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(self.width(), self.height(), raw)
                    .ok_or(SegpropError::BufferSizeError)?
                    .save(path)
                    .map_err(|_| SegpropError::ImageWriteError);
            }
        }

        Err(SegpropError::ImageExtensionError)
    }
}

// <<< I/O METHODS

// >>> PROPERTY METHODS

impl SegmentMask {
    /// Width of the mask
    pub fn width(&self) -> u32 {
        match self {
            SegmentMask::ColorCoded(mask) => mask.width(),
            SegmentMask::LabelValued(mask) => mask.width(),
        }
    }

    /// Height of the mask
    pub fn height(&self) -> u32 {
        match self {
            SegmentMask::ColorCoded(mask) => mask.height(),
            SegmentMask::LabelValued(mask) => mask.height(),
        }
    }
}

impl LabelMask {
    /// Unique non-zero labels in ascending order
    ///
    /// # Examples
    ///
    /// ```
    /// use segprop_core::im::LabelMask;
    ///
    /// let mask = LabelMask::new(3, 1, vec![9, 0, 4]).unwrap();
    /// assert_eq!(mask.labels(), vec![4, 9]);
    /// ```
    pub fn labels(&self) -> Vec<u32> {
        self.as_raw()
            .iter()
            .filter(|&&x| x != 0)
            .cloned()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }
}

// <<< PROPERTY METHODS
