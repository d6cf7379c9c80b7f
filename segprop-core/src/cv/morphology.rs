// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

/// Binary erosion with a square kernel of radius `radius`
///
/// Pixels outside the mask are ignored rather than treated as background,
/// so objects touching the image border are not eroded from that side.
///
/// # Examples
///
/// ```
/// use segprop_core::cv::morphology::erode;
///
/// let buffer: Vec<u8> = vec![
///     1, 1, 1, 0,
///     1, 1, 1, 0,
///     1, 1, 1, 0,
/// ];
///
/// assert_eq!(erode(4, 3, &buffer, 1), vec![1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0]);
/// ```
pub fn erode(width: u32, height: u32, pixels: &[u8], radius: u32) -> Vec<u8> {
    filter_square(width, height, pixels, radius, |window| window.iter().all(|&p| p != 0))
}

/// Binary dilation with a square kernel of radius `radius`
///
/// # Examples
///
/// ```
/// use segprop_core::cv::morphology::dilate;
///
/// let buffer: Vec<u8> = vec![0, 0, 0, 0, 1, 0, 0, 0, 0];
///
/// assert_eq!(dilate(3, 3, &buffer, 1), vec![1; 9]);
/// ```
pub fn dilate(width: u32, height: u32, pixels: &[u8], radius: u32) -> Vec<u8> {
    filter_square(width, height, pixels, radius, |window| window.iter().any(|&p| p != 0))
}

/// Morphological opening (erosion then dilation) removes isolated specks
pub fn open(width: u32, height: u32, pixels: &[u8], radius: u32) -> Vec<u8> {
    let eroded = erode(width, height, pixels, radius);
    dilate(width, height, &eroded, radius)
}

/// Morphological closing (dilation then erosion) fills small gaps
pub fn close(width: u32, height: u32, pixels: &[u8], radius: u32) -> Vec<u8> {
    let dilated = dilate(width, height, pixels, radius);
    erode(width, height, &dilated, radius)
}

/// Opening followed by closing with a 3x3 kernel, one iteration each
///
/// # Examples
///
/// ```
/// use segprop_core::cv::morphology::smooth;
///
/// // A single speck disappears
/// let mut buffer = vec![0u8; 25];
/// buffer[12] = 1;
///
/// assert!(smooth(5, 5, &buffer).iter().all(|&p| p == 0));
/// ```
pub fn smooth(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let opened = open(width, height, pixels, 1);
    close(width, height, &opened, 1)
}

fn filter_square<F>(width: u32, height: u32, pixels: &[u8], radius: u32, reduce: F) -> Vec<u8>
where
    F: Fn(&[u8]) -> bool,
{
    let width = width as i64;
    let height = height as i64;
    let radius = radius as i64;

    let mut output = vec![0u8; pixels.len()];
    let mut window: Vec<u8> = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for y in 0..height {
        for x in 0..width {
            window.clear();

            for ky in (y - radius).max(0)..=(y + radius).min(height - 1) {
                for kx in (x - radius).max(0)..=(x + radius).min(width - 1) {
                    window.push(pixels[(ky * width + kx) as usize]);
                }
            }

            output[(y * width + x) as usize] = u8::from(reduce(&window));
        }
    }

    output
}
