// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::error::SegpropError;

/// A row-major container storing one value per mask pixel
///
/// The pixel type is generic so that the same container holds color-coded
/// masks (`[u8; 3]`) and integer label masks (`u32`). The length of the
/// container must be equal to the product of `w` * `h`.
///
/// # Examples
///
/// ```
/// use segprop_core::im::MaskBuffer;
///
/// let buffer = MaskBuffer::new(10, 10, vec![0u32; 100]);
/// assert_eq!(buffer.unwrap().len(), 100);
///
/// let buffer = MaskBuffer::new(10, 10, vec![[0u8; 3]; 90]);
/// assert!(buffer.is_err()); // Buffer size does not match dimensions
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuffer<T> {
    w: u32,             // Width
    h: u32,             // Height
    pub buffer: Vec<T>, // Pixels
}

impl<T> MaskBuffer<T> {
    /// Initializes a buffer from row-major pixels
    pub fn new(width: u32, height: u32, buffer: Vec<T>) -> Result<MaskBuffer<T>, SegpropError> {
        if width as usize * height as usize == buffer.len() {
            Ok(MaskBuffer {
                w: width,
                h: height,
                buffer,
            })
        } else {
            Err(SegpropError::BufferSizeError)
        }
    }
}

impl<T: Clone> MaskBuffer<T> {
    /// Initializes a buffer with every pixel set to `value`
    pub fn filled(width: u32, height: u32, value: T) -> MaskBuffer<T> {
        MaskBuffer {
            w: width,
            h: height,
            buffer: vec![value; width as usize * height as usize],
        }
    }
}

// >>> PROPERTY METHODS

impl<T> MaskBuffer<T> {
    /// Width of the mask
    pub fn width(&self) -> u32 {
        self.w
    }

    /// Height of the mask
    pub fn height(&self) -> u32 {
        self.h
    }

    /// Number of pixels in the mask
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a reference to the raw pixels
    pub fn as_raw(&self) -> &[T] {
        &self.buffer
    }

    /// Returns the raw pixels
    pub fn into_raw(self) -> Vec<T> {
        self.buffer
    }
}

impl<T: PartialEq> MaskBuffer<T> {
    /// A binary (0/1) buffer of pixels equal to `value`
    ///
    /// # Examples
    ///
    /// ```
    /// use segprop_core::im::MaskBuffer;
    ///
    /// let mask = MaskBuffer::new(2, 2, vec![[255u8, 0, 0], [0, 0, 0], [255, 0, 0], [0, 0, 255]]).unwrap();
    /// assert_eq!(mask.binary(&[255, 0, 0]), vec![1, 0, 1, 0]);
    /// ```
    pub fn binary(&self, value: &T) -> Vec<u8> {
        self.buffer.iter().map(|p| u8::from(p == value)).collect()
    }
}

// <<< PROPERTY METHODS
