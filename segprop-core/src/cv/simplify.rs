// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::constant::{EPSILON_SMALL, EPSILON_TABLE};
use crate::cv::points::point_to_segment_distance;

/// Compute the unsigned area enclosed by a closed contour (shoelace formula)
///
/// # Examples
///
/// ```
/// use segprop_core::cv::simplify::contour_area;
///
/// let square = [[0, 0], [0, 10], [10, 10], [10, 0]];
/// assert_eq!(contour_area(&square), 100.0);
/// ```
pub fn contour_area(points: &[[i32; 2]]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice_area += p[0] as f64 * q[1] as f64 - q[0] as f64 * p[1] as f64;
    }

    twice_area.abs() / 2.0
}

/// Compute the perimeter of a closed contour
///
/// # Examples
///
/// ```
/// use segprop_core::cv::simplify::arc_length;
///
/// let square = [[0, 0], [0, 10], [10, 10], [10, 0]];
/// assert_eq!(arc_length(&square), 40.0);
/// ```
pub fn arc_length(points: &[[i32; 2]]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let q = points[(i + 1) % points.len()];
            let dx = (q[0] - p[0]) as f64;
            let dy = (q[1] - p[1]) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Select a simplification tolerance from contour area and perimeter
///
/// Large shapes keep more detail while small shapes are simplified
/// aggressively.
///
/// # Examples
///
/// ```
/// use segprop_core::cv::simplify::adaptive_epsilon;
///
/// assert_eq!(adaptive_epsilon(1600.0, 160.0), 0.8);
/// assert_eq!(adaptive_epsilon(400.0, 80.0), 0.8);
/// assert_eq!(adaptive_epsilon(100.0, 40.0), 0.8);
/// ```
pub fn adaptive_epsilon(area: f64, perimeter: f64) -> f64 {
    let fraction = EPSILON_TABLE
        .iter()
        .find(|(min_area, _)| area > *min_area)
        .map(|(_, fraction)| *fraction)
        .unwrap_or(EPSILON_SMALL);

    fraction * perimeter
}

/// Approximate a closed contour with fewer vertices (Douglas-Peucker)
///
/// The contour is split at two mutually distant vertices and each half is
/// simplified independently so that the result stays closed. Vertices whose
/// distance to the simplified outline is at most `epsilon` are dropped.
///
/// # Examples
///
/// ```
/// use segprop_core::cv::simplify::approx_polygon;
///
/// let contour = [[0, 0], [0, 5], [0, 10], [5, 10], [10, 10], [10, 5], [10, 0], [5, 0]];
/// let polygon = approx_polygon(&contour, 1.0);
///
/// assert_eq!(polygon.len(), 4);
/// ```
pub fn approx_polygon(points: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let farthest_from = |origin: usize| {
        let mut best = origin;
        let mut best_distance = -1.0;
        for (i, p) in points.iter().enumerate() {
            let dx = (p[0] - points[origin][0]) as f64;
            let dy = (p[1] - points[origin][1]) as f64;
            let distance = dx * dx + dy * dy;
            if distance > best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    };

    let start = farthest_from(0);
    let end = farthest_from(start);

    if start == end {
        return vec![points[start]];
    }

    let chain = |from: usize, to: usize| -> Vec<[i32; 2]> {
        let length = (to + n - from) % n;
        (0..=length).map(|i| points[(from + i) % n]).collect()
    };

    let mut first = simplify_chain(&chain(start, end), epsilon);
    let second = simplify_chain(&chain(end, start), epsilon);

    first.pop();
    first.extend_from_slice(&second[..second.len() - 1]);
    first
}

/// Douglas-Peucker on an open chain, keeping both endpoints
fn simplify_chain(chain: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];

    while let Some((from, to)) = stack.pop() {
        if to <= from + 1 {
            continue;
        }

        let a = [chain[from][0] as f64, chain[from][1] as f64];
        let b = [chain[to][0] as f64, chain[to][1] as f64];

        let mut max_distance = -1.0;
        let mut split = from;

        for (i, p) in chain.iter().enumerate().take(to).skip(from + 1) {
            let distance = point_to_segment_distance(p[0] as f64, p[1] as f64, a, b);
            if distance > max_distance {
                max_distance = distance;
                split = i;
            }
        }

        if max_distance > epsilon {
            keep[split] = true;
            stack.push((from, split));
            stack.push((split, to));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}
