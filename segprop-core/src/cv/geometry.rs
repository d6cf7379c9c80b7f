// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::constant::GEOMETRY_EPSILON;
use crate::error::SegpropError;

/// An axis-aligned box in xyxy format `[x_min, y_min, x_max, y_max]`
pub type BoundingBox = [i32; 4];

/// Compute the bounding box of a set of (x, y) points
///
/// # Examples
///
/// ```
/// use segprop_core::cv::geometry::bbox;
///
/// let points = [[12, 40], [3, 7], [25, 9]];
/// assert_eq!(bbox(&points).unwrap(), [3, 7, 25, 40]);
/// assert!(bbox(&[]).is_err());
/// ```
pub fn bbox(points: &[[i32; 2]]) -> Result<BoundingBox, SegpropError> {
    let &[fx, fy] = points.first().ok_or(SegpropError::GeometryDegenerate)?;

    let mut min_x = fx;
    let mut min_y = fy;
    let mut max_x = fx;
    let mut max_y = fy;

    for &[x, y] in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Ok([min_x, min_y, max_x, max_y])
}

/// Intersection over union of two boxes
///
/// Disjoint boxes return 0. A small epsilon in the denominator keeps
/// zero-area boxes from dividing by zero.
///
/// # Examples
///
/// ```
/// use segprop_core::cv::geometry::iou;
///
/// assert_eq!(iou(&[0, 0, 10, 10], &[20, 20, 30, 30]), 0.0);
/// assert!((iou(&[0, 0, 10, 10], &[0, 0, 10, 10]) - 1.0).abs() < 1e-6);
/// assert!((iou(&[0, 0, 10, 10], &[5, 0, 15, 10]) - 1.0 / 3.0).abs() < 1e-6);
/// ```
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x_a = a[0].max(b[0]) as f64;
    let y_a = a[1].max(b[1]) as f64;
    let x_b = a[2].min(b[2]) as f64;
    let y_b = a[3].min(b[3]) as f64;

    let intersection = (x_b - x_a).max(0.0) * (y_b - y_a).max(0.0);
    if intersection == 0.0 {
        return 0.0;
    }

    let area_a = area(a);
    let area_b = area(b);

    intersection / (area_a + area_b - intersection + GEOMETRY_EPSILON)
}

/// Distance between box centers normalized by the mean side length
///
/// Normalizing by the mean of all four side lengths makes the distance
/// comparable across object sizes.
///
/// # Examples
///
/// ```
/// use segprop_core::cv::geometry::center_distance;
///
/// assert_eq!(center_distance(&[0, 0, 10, 10], &[0, 0, 10, 10]), 0.0);
/// assert!((center_distance(&[0, 0, 10, 10], &[10, 0, 20, 10]) - 1.0).abs() < 1e-6);
/// ```
pub fn center_distance(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let [ax, ay] = center(a);
    let [bx, by] = center(b);

    let distance = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();

    let mean_side = ((a[2] - a[0]) + (a[3] - a[1]) + (b[2] - b[0]) + (b[3] - b[1])) as f64 / 4.0;

    distance / (mean_side + GEOMETRY_EPSILON)
}

/// Area of a box measured as coordinate differences
pub fn area(b: &BoundingBox) -> f64 {
    (b[2] - b[0]) as f64 * (b[3] - b[1]) as f64
}

/// Center of a box
pub fn center(b: &BoundingBox) -> [f64; 2] {
    [(b[0] + b[2]) as f64 / 2.0, (b[1] + b[3]) as f64 / 2.0]
}
