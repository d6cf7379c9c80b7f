// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

/// Mutably fill a polygon onto a row-major canvas of specified size
///
/// The interior is filled with a scanline pass and the polygon edges are
/// drawn afterwards so that boundary pixels are always painted. Points
/// outside the canvas are clipped.
///
/// # Arguments
///
/// * `buffer` - A row-major canvas for drawing points onto
/// * `width` - Width of canvas
/// * `height` - Height of canvas
/// * `points` - A set of (x, y) polygon vertices, not explicitly closed
/// * `color` - A positive integer specifying fill color
///
/// # References
///
/// Adapted/modified from: https://github.com/image-rs/imageproc
///
/// # Examples
///
/// ```
/// use segprop_core::cv::points::draw_points_mut;
///
/// let width = 3;
/// let height = 3;
/// let mut buffer = vec![0, 0, 0, 0, 0, 0, 0, 0, 0];
/// let points = [[1, 1], [0, 1], [1, 0], [0, 0]];
///
/// draw_points_mut(&mut buffer, width, height, &points, 1);
///
/// assert_eq!(buffer, vec![1, 1, 0, 1, 1, 0, 0, 0, 0]);
/// ```
pub fn draw_points_mut(
    buffer: &mut [u32],
    width: u32,
    height: u32,
    points: &[[i32; 2]],
    color: u32,
) {
    if points.is_empty() || width == 0 || height == 0 {
        return;
    }

    // Helper function to draw a line between two points
    fn draw_line(buffer: &mut [u32], width: u32, height: u32, start: [i32; 2], end: [i32; 2], color: u32) {
        let Some(([x0, y0], [x1, y1])) = clip_segment(start, end, width, height) else {
            return;
        };

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < width as i64 && y >= 0 && y < height as i64 {
                let index = (y as u64 * width as u64 + x as u64) as usize;
                buffer[index] = color;
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    let mut y_min = i32::MAX;
    let mut y_max = i32::MIN;
    for p in points {
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }

    y_min = y_min.max(0).min(height as i32 - 1);
    y_max = y_max.max(0).min(height as i32 - 1);

    // Close the polygon by connecting the last point to the first
    let mut closed: Vec<[i32; 2]> = points.to_vec();
    closed.push(points[0]);

    let edges: Vec<&[[i32; 2]]> = closed.windows(2).collect();
    let mut intersections = Vec::new();

    for y in y_min..=y_max {
        for edge in &edges {
            let [x0, y0] = edge[0];
            let [x1, y1] = edge[1];

            if (y0 <= y && y1 >= y) || (y1 <= y && y0 >= y) {
                if y0 == y1 {
                    intersections.push(x0);
                    intersections.push(x1);
                } else if y0 == y || y1 == y {
                    if y1 > y {
                        intersections.push(x0);
                    }
                    if y0 > y {
                        intersections.push(x1);
                    }
                } else {
                    let fraction = (y as f64 - y0 as f64) / (y1 as f64 - y0 as f64);
                    let inter = x0 as f64 + fraction * (x1 as f64 - x0 as f64);
                    intersections.push(inter.round() as i32);
                }
            }
        }

        intersections.sort_unstable();
        intersections.chunks_exact(2).for_each(|range| {
            let from = range[0].max(0);
            let to = range[1].min(width as i32 - 1);

            for x in from..=to {
                let index = (y as u32 * width + x as u32) as usize;
                buffer[index] = color;
            }
        });

        intersections.clear();
    }

    for edge in &edges {
        draw_line(buffer, width, height, edge[0], edge[1], color);
    }
}

/// Clip a segment to the pixel rectangle of a canvas (Liang-Barsky)
///
/// Returns the rounded endpoints of the visible part, or `None` when the
/// segment lies entirely outside. Segments already inside are unchanged.
fn clip_segment(start: [i32; 2], end: [i32; 2], width: u32, height: u32) -> Option<([i64; 2], [i64; 2])> {
    let (x0, y0) = (start[0] as f64, start[1] as f64);
    let (dx, dy) = (end[0] as f64 - x0, end[1] as f64 - y0);
    let (x_max, y_max) = ((width - 1) as f64, (height - 1) as f64);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }

    if t0 > t1 {
        return None;
    }

    let clip = |t: f64| {
        [
            (x0 + t * dx).round().clamp(0.0, x_max) as i64,
            (y0 + t * dy).round().clamp(0.0, y_max) as i64,
        ]
    };

    Some((clip(t0), clip(t1)))
}

/// Compute the distance from a point to a line segment
///
/// # Examples
///
/// ```
/// use segprop_core::cv::points::point_to_segment_distance;
///
/// assert_eq!(point_to_segment_distance(5.0, 3.0, [0.0, 0.0], [10.0, 0.0]), 3.0);
/// assert_eq!(point_to_segment_distance(13.0, 4.0, [0.0, 0.0], [10.0, 0.0]), 5.0);
/// ```
pub fn point_to_segment_distance(px: f64, py: f64, p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let (x1, y1, x2, y2) = (p1[0], p1[1], p2[0], p2[1]);

    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx == 0.0 && dy == 0.0 {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }

    let t = ((px - x1) * dx + (py - y1) * dy) / (dx * dx + dy * dy);
    let t_clamped = t.clamp(0.0, 1.0);

    let closest_x = x1 + t_clamped * dx;
    let closest_y = y1 + t_clamped * dy;

    ((px - closest_x).powi(2) + (py - closest_y).powi(2)).sqrt()
}
