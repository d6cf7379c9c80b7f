// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::HashSet;

use crate::constant::{
    DEFAULT_INSTANCE_NAME, DEFAULT_INSTANCE_PREFIX, MATCH_DISTANCE_WEIGHT, MATCH_IOU_WEIGHT,
    MATCH_MAX_DISTANCE, MATCH_MIN_SCORE,
};
use crate::cv::geometry::{BoundingBox, center_distance, iou};
use crate::im::MetaRecord;

/// Tunable weights of the combined overlap and distance score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Weight of the box IoU
    pub iou_weight: f64,
    /// Weight of the inverted normalized center distance
    pub distance_weight: f64,
    /// A match is accepted only when its score is strictly above this value
    pub min_score: f64,
    /// Normalized center distances at or beyond this value contribute nothing
    pub max_distance: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            iou_weight: MATCH_IOU_WEIGHT,
            distance_weight: MATCH_DISTANCE_WEIGHT,
            min_score: MATCH_MIN_SCORE,
            max_distance: MATCH_MAX_DISTANCE,
        }
    }
}

/// Combined similarity of a candidate box and an expected box
///
/// # Examples
///
/// ```
/// use segprop_core::tr::{MatchConfig, score};
///
/// let config = MatchConfig::default();
/// assert!((score(&[10, 10, 50, 50], &[10, 10, 50, 50], &config) - 1.0).abs() < 1e-6);
/// assert_eq!(score(&[0, 0, 10, 10], &[100, 100, 110, 110], &config), 0.0);
/// ```
pub fn score(candidate: &BoundingBox, expected: &BoundingBox, config: &MatchConfig) -> f64 {
    let overlap = iou(candidate, expected);
    let distance = center_distance(candidate, expected);

    let proximity = if distance < config.max_distance {
        (1.0 - distance).max(0.0)
    } else {
        0.0
    };

    config.iou_weight * overlap + config.distance_weight * proximity
}

/// The highest scoring expected record for a candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub index: usize,
    pub record: &'a MetaRecord,
    pub score: f64,
}

/// Find the best unused expected record for a candidate box
///
/// Records without a bounding box and records whose index is in `used` are
/// ignored. Only records scoring strictly above zero are considered and the
/// first record wins ties. The acceptance threshold is not applied here.
pub fn find_best_match<'a>(
    candidate: &BoundingBox,
    expected: &'a [MetaRecord],
    used: &HashSet<usize>,
    config: &MatchConfig,
) -> Option<Match<'a>> {
    let mut best: Option<Match<'a>> = None;

    for (index, record) in expected.iter().enumerate() {
        if used.contains(&index) {
            continue;
        }

        let Some(record_bbox) = record.bbox.as_ref() else {
            continue;
        };

        let s = score(candidate, record_bbox, config);
        if s > best.as_ref().map_or(0.0, |m| m.score) {
            best = Some(Match {
                index,
                record,
                score: s,
            });
        }
    }

    best
}

/// Identity resolved for one candidate polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub instance_id: String,
    pub name: String,
    pub class_name: String,
    /// Index of the consumed expected record and its score
    pub matched: Option<(usize, f64)>,
}

/// Assigns identities to the candidates of a single frame
///
/// Each expected record is consumed at most once. Synthesized identities
/// take the form `Object-<k>` where `k` starts one past the number of
/// consumed records and skips any identity already assigned in this frame
/// or carried by an expected record, keeping identities unique per frame.
///
/// # Examples
///
/// ```
/// use segprop_core::im::MetaRecord;
/// use segprop_core::tr::{InstanceMatcher, MatchConfig};
///
/// let expected = vec![MetaRecord {
///     instance_id: "Object-1".to_string(),
///     name: "Car".to_string(),
///     class_name: "2".to_string(),
///     bbox: Some([10, 10, 50, 50]),
///     coordinates: vec![],
/// }];
///
/// let mut matcher = InstanceMatcher::new(&expected, MatchConfig::default());
///
/// let first = matcher.assign(&[12, 11, 52, 51], "1");
/// assert_eq!(first.instance_id, "Object-1");
/// assert_eq!(first.class_name, "2");
///
/// let second = matcher.assign(&[12, 11, 52, 51], "1");
/// assert_eq!(second.instance_id, "Object-2");
/// assert_eq!(second.class_name, "1");
/// ```
#[derive(Debug, Clone)]
pub struct InstanceMatcher<'a> {
    expected: &'a [MetaRecord],
    config: MatchConfig,
    used: HashSet<usize>,
    assigned: HashSet<String>,
    reserved: HashSet<String>,
}

impl<'a> InstanceMatcher<'a> {
    pub fn new(expected: &'a [MetaRecord], config: MatchConfig) -> Self {
        InstanceMatcher {
            expected,
            config,
            used: HashSet::new(),
            assigned: HashSet::new(),
            reserved: expected.iter().map(|r| r.instance_id.clone()).collect(),
        }
    }

    /// Number of expected records consumed so far
    pub fn used(&self) -> usize {
        self.used.len()
    }

    /// Resolve the identity of a candidate polygon
    ///
    /// # Arguments
    ///
    /// * `candidate` - Bounding box of the candidate polygon
    /// * `default_class` - Class name used when no record is matched
    pub fn assign(&mut self, candidate: &BoundingBox, default_class: &str) -> Assignment {
        let accepted = find_best_match(candidate, self.expected, &self.used, &self.config)
            .filter(|m| m.score > self.config.min_score)
            .map(|m| (m.index, m.record.clone(), m.score));

        let assignment = match accepted {
            Some((index, record, s)) => {
                self.used.insert(index);

                let instance_id = if record.instance_id.is_empty()
                    || self.assigned.contains(&record.instance_id)
                {
                    self.synthesize()
                } else {
                    record.instance_id
                };

                Assignment {
                    instance_id,
                    name: if record.name.is_empty() {
                        DEFAULT_INSTANCE_NAME.to_string()
                    } else {
                        record.name
                    },
                    class_name: if record.class_name.is_empty() {
                        default_class.to_string()
                    } else {
                        record.class_name
                    },
                    matched: Some((index, s)),
                }
            }
            None => Assignment {
                instance_id: self.synthesize(),
                name: DEFAULT_INSTANCE_NAME.to_string(),
                class_name: default_class.to_string(),
                matched: None,
            },
        };

        self.assigned.insert(assignment.instance_id.clone());

        assignment
    }

    fn synthesize(&self) -> String {
        let mut k = self.used.len() + 1;

        loop {
            let id = format!("{}{}", DEFAULT_INSTANCE_PREFIX, k);
            if !self.assigned.contains(&id) && !self.reserved.contains(&id) {
                return id;
            }
            k += 1;
        }
    }
}
