// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::VecDeque;

/// Find the external contours of a binary mask using 8-connectivity
///
/// Any non-zero pixel is foreground. Hole borders and objects nested inside
/// holes are traced internally so that their pixels are not mistaken for new
/// objects, but only the outermost borders are returned. Contours are ordered by the raster position
/// (top-to-bottom, left-to-right) of their first pixel.
///
/// # Arguments
///
/// * `width` - Width of mask
/// * `height` - Height of mask
/// * `pixels` - A row-major binary mask buffer
///
/// # References
///
/// Adapted/modified from: https://github.com/image-rs/imageproc
///
/// # Examples
///
/// ```
/// use segprop_core::cv::find_contours;
///
/// let width = 3;
/// let height = 3;
/// let buffer: Vec<u8> = vec![1, 1, 0, 1, 1, 0, 0, 0, 0];
/// let contours = find_contours(width, height, &buffer);
///
/// assert_eq!(contours, [[[0, 0], [0, 1], [1, 1], [1, 0]]])
/// ```
pub fn find_contours(width: u32, height: u32, pixels: &[u8]) -> Vec<Vec<[i32; 2]>> {
    let width = width as usize;
    let height = height as usize;
    let padded_width = width + 2;
    let padded_height = height + 2;

    let at = |x: usize, y: usize| x + padded_width * y;

    let mut image_values = vec![0i32; padded_height * padded_width];

    for y in 0..height {
        for x in 0..width {
            image_values[at(x + 1, y + 1)] = i32::from(pixels[y * width + x] != 0);
        }
    }

    let mut diffs = VecDeque::from(vec![
        [-1, 0],  // West
        [-1, -1], // Northwest
        [0, -1],  // North
        [1, -1],  // Northeast
        [1, 0],   // East
        [1, 1],   // Southeast
        [0, 1],   // South
        [-1, 1],  // Southwest
    ]);

    let is_foreground = |values: &[i32], nx: i32, ny: i32| {
        nx >= 0
            && nx < padded_width as i32
            && ny >= 0
            && ny < padded_height as i32
            && values[at(nx as usize, ny as usize)] != 0
    };

    let mut contours: Vec<Contour> = Vec::new();
    let mut curr_border_num = 1;

    for y in 1..=height {
        // Border number of the last border met on this row (1 is the frame)
        let mut last_border_num = 1;

        for x in 1..=width {
            let value = image_values[at(x, y)];
            if value == 0 {
                continue;
            }

            let curr = (x as i32, y as i32);

            let start = if value == 1 && image_values[at(x - 1, y)] == 0 {
                Some((BorderType::Outer, (x as i32 - 1, y as i32)))
            } else if value > 0 && image_values[at(x + 1, y)] == 0 {
                if value > 1 {
                    last_border_num = value;
                }
                Some((BorderType::Hole, (x as i32 + 1, y as i32)))
            } else {
                None
            };

            let Some((border_type, adjacent_point)) = start else {
                if value != 1 {
                    last_border_num = value.abs();
                }
                continue;
            };

            curr_border_num += 1;

            let parent = if last_border_num > 1 {
                let last_index = (last_border_num - 2) as usize;
                let last = &contours[last_index];
                if (border_type == BorderType::Outer) ^ (last.border_type == BorderType::Outer) {
                    Some(last_index)
                } else {
                    last.parent
                }
            } else {
                None
            };

            let mut contour_points: Vec<[i32; 2]> = Vec::new();
            rotate_to_value(
                &mut diffs,
                [adjacent_point.0 - curr.0, adjacent_point.1 - curr.1],
            );

            let pos1_option = diffs.iter().find_map(|&diff| {
                let (nx, ny) = (curr.0 + diff[0], curr.1 + diff[1]);
                is_foreground(&image_values, nx, ny).then_some((nx, ny))
            });

            if let Some(pos1) = pos1_option {
                let mut pos2 = pos1;
                let mut pos3 = curr;

                loop {
                    contour_points.push([pos3.0 - 1, pos3.1 - 1]);
                    rotate_to_value(&mut diffs, [pos2.0 - pos3.0, pos2.1 - pos3.1]);

                    // pos2 is always a foreground neighbour so the search cannot come back empty
                    let Some(pos4) = diffs.iter().rev().find_map(|&diff| {
                        let (nx, ny) = (pos3.0 + diff[0], pos3.1 + diff[1]);
                        is_foreground(&image_values, nx, ny).then_some((nx, ny))
                    }) else {
                        break;
                    };

                    let mut is_right_edge = false;
                    for &diff in diffs.iter().rev() {
                        if diff == [pos4.0 - pos3.0, pos4.1 - pos3.1] {
                            break;
                        }
                        if diff == [1, 0] {
                            is_right_edge = true;
                            break;
                        }
                    }

                    if pos3.0 as usize + 1 == padded_width || is_right_edge {
                        image_values[at(pos3.0 as usize, pos3.1 as usize)] = -curr_border_num;
                    } else if image_values[at(pos3.0 as usize, pos3.1 as usize)] == 1 {
                        image_values[at(pos3.0 as usize, pos3.1 as usize)] = curr_border_num;
                    }

                    if pos4 == curr && pos3 == pos1 {
                        break;
                    }

                    pos2 = pos3;
                    pos3 = pos4;
                }
            } else {
                contour_points.push([x as i32 - 1, y as i32 - 1]);
                image_values[at(x, y)] = -curr_border_num;
            }

            contours.push(Contour::new(contour_points, border_type, parent));

            let value = image_values[at(x, y)];
            if value != 1 {
                last_border_num = value.abs();
            }
        }
    }

    contours
        .into_iter()
        .filter(|contour| contour.border_type() == &BorderType::Outer && contour.parent().is_none())
        .map(|contour| contour.into_points())
        .collect()
}

/// Find the external contours of every pixel equal to `label`
///
/// # Examples
///
/// ```
/// use segprop_core::cv::find_label_contours;
///
/// let buffer: Vec<u32> = vec![7, 7, 0, 7, 7, 0, 0, 0, 3];
/// let contours = find_label_contours(3, 3, &buffer, 7);
///
/// assert_eq!(contours, [[[0, 0], [0, 1], [1, 1], [1, 0]]]);
/// ```
pub fn find_label_contours(width: u32, height: u32, pixels: &[u32], label: u32) -> Vec<Vec<[i32; 2]>> {
    let binary: Vec<u8> = pixels.iter().map(|&p| u8::from(p == label)).collect();
    find_contours(width, height, &binary)
}

/// Contour for storing outlines of segmented objects
#[derive(Debug, Clone)]
pub struct Contour {
    points: Vec<[i32; 2]>,
    border_type: BorderType,
    parent: Option<usize>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorderType {
    Outer,
    Hole,
}

impl Contour {
    pub fn new(points: Vec<[i32; 2]>, border_type: BorderType, parent: Option<usize>) -> Self {
        Contour {
            points,
            border_type,
            parent,
        }
    }

    pub fn into_points(self) -> Vec<[i32; 2]> {
        self.points
    }

    pub fn border_type(&self) -> &BorderType {
        &self.border_type
    }

    /// Index of the enclosing border, `None` for borders on the background
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

fn rotate_to_value(values: &mut VecDeque<[i32; 2]>, value: [i32; 2]) {
    if let Some(pos) = values.iter().position(|&v| v == value) {
        values.rotate_left(pos);
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn four_regions_small() -> (u32, u32, [u8; 9]) {
        let mut buffer = [0u8; 9];

        buffer[0] = 1;
        buffer[2] = 1;
        buffer[6] = 1;
        buffer[8] = 1;

        (3, 3, buffer)
    }

    fn three_regions() -> (u32, u32, [u8; 9]) {
        let mut buffer = [0u8; 9];

        buffer[0] = 1;
        buffer[2] = 1;
        buffer[6] = 1;
        buffer[7] = 1;
        buffer[8] = 1;

        (3, 3, buffer)
    }

    fn two_squares() -> (u32, u32, [u8; 100]) {
        let mut buffer = [0u8; 100];

        for i in 0..10 {
            for j in 0..10 {
                let idx = j * 10 + i;
                if (i < 4 && j < 4) || (i >= 6 && j >= 6) {
                    buffer[idx] = 1;
                }
            }
        }

        (10, 10, buffer)
    }

    fn ring() -> (u32, u32, [u8; 49]) {
        let mut buffer = [0u8; 49];

        for y in 1..6 {
            for x in 1..6 {
                buffer[y * 7 + x] = 1;
            }
        }

        buffer[3 * 7 + 3] = 0;

        (7, 7, buffer)
    }

    #[test]
    fn test_four_regions_small() {
        let (w, h, buffer) = four_regions_small();
        let contours = find_contours(w, h, &buffer);

        assert_eq!(contours.len(), 4);
        assert_eq!(contours[0], vec![[0, 0]]);
        assert_eq!(contours[1], vec![[2, 0]]);
        assert_eq!(contours[2], vec![[0, 2]]);
        assert_eq!(contours[3], vec![[2, 2]]);
    }

    #[test]
    fn test_three_regions() {
        let (w, h, buffer) = three_regions();
        let contours = find_contours(w, h, &buffer);

        assert_eq!(contours.len(), 3);
        assert_eq!(contours[2], vec![[0, 2], [1, 2], [2, 2], [1, 2]]);
    }

    #[test]
    fn test_two_squares() {
        let (w, h, buffer) = two_squares();
        let contours = find_contours(w, h, &buffer);

        assert_eq!(contours.len(), 2);

        assert_eq!(
            contours[0],
            vec![
                [0, 0],
                [0, 1],
                [0, 2],
                [0, 3],
                [1, 3],
                [2, 3],
                [3, 3],
                [3, 2],
                [3, 1],
                [3, 0],
                [2, 0],
                [1, 0],
            ]
        );

        assert_eq!(contours[1][0], [6, 6]);
        assert_eq!(contours[1].len(), 12);
    }

    #[test]
    fn test_ring_returns_only_outer_border() {
        let (w, h, buffer) = ring();
        let contours = find_contours(w, h, &buffer);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 16);
        assert!(contours[0].iter().all(|p| p[0] == 1 || p[0] == 5 || p[1] == 1 || p[1] == 5));
    }

    #[test]
    fn test_object_inside_hole_is_not_external() {
        let mut buffer = [0u8; 121];

        for y in 1..=9 {
            for x in 1..=9 {
                let in_hole = (3..=7).contains(&x) && (3..=7).contains(&y);
                if !in_hole {
                    buffer[y * 11 + x] = 1;
                }
            }
        }

        buffer[5 * 11 + 5] = 1;

        let contours = find_contours(11, 11, &buffer);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0][0], [1, 1]);
    }

    #[test]
    fn test_label_contours_ignore_other_labels() {
        let buffer: Vec<u32> = vec![
            1, 1, 0, 2, 2, //
            1, 1, 0, 2, 2, //
            0, 0, 0, 0, 0, //
            1, 1, 0, 0, 0, //
            1, 1, 0, 0, 0, //
        ];

        let ones = find_label_contours(5, 5, &buffer, 1);
        let twos = find_label_contours(5, 5, &buffer, 2);

        assert_eq!(ones.len(), 2);
        assert_eq!(twos.len(), 1);
        assert_eq!(ones[1][0], [0, 3]);
        assert_eq!(twos[0][0], [3, 0]);
    }
}
