//! Common functionality for object detection.
//!
//! The face detector is a Single-Shot MultiBox Detector (SSD): it predicts one candidate box per
//! precomputed anchor and relies on non-maximum suppression to collapse the duplicates. The types
//! in this module cover that shared machinery; the network-specific output decoding lives with
//! the network wrapper.

use std::ops::Index;

use crate::image::{Rect, Resolution};
use crate::num::TotalF32;

/// A detected object.
///
/// A [`Detection`] consists of a [`Rect`] enclosing the detected object, a confidence value
/// between 0.0 and 1.0, an optional rotation angle, and a possibly empty set of located
/// keypoints.
#[derive(Debug, Clone)]
pub struct Detection {
    confidence: f32,
    angle: f32,
    rect: Rect,
    keypoints: Vec<Keypoint>,
}

impl Detection {
    pub fn new(confidence: f32, rect: Rect) -> Self {
        Self {
            confidence,
            angle: 0.0,
            rect,
            keypoints: Vec::new(),
        }
    }

    pub fn with_keypoints(confidence: f32, rect: Rect, keypoints: Vec<Keypoint>) -> Self {
        Self {
            confidence,
            angle: 0.0,
            rect,
            keypoints,
        }
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns the angle of the detected object, in radians, clockwise.
    ///
    /// Not all networks compute an object angle; if unsupported, 0.0 is returned.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Sets the angle of the detected object, in radians, clockwise.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Returns the axis-aligned bounding rectangle containing the detected object.
    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }
}

/// A 2D keypoint produced as part of a [`Detection`].
///
/// The meaning of a keypoint depends on the specific detector and on its index in the keypoint
/// list.
#[derive(Debug, Clone, Copy)]
pub struct Keypoint {
    x: f32,
    y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

/// An anchor of an SSD network.
///
/// Coordinates are relative and range from 0 to 1.
pub struct Anchor {
    x_center: f32,
    y_center: f32,
}

impl Anchor {
    pub fn x_center(&self) -> f32 {
        self.x_center
    }

    pub fn y_center(&self) -> f32 {
        self.y_center
    }
}

/// Describes an output layer of an SSD network.
pub struct LayerInfo {
    /// Number of anchors per feature map cell. Must be non-zero.
    boxes_per_cell: u32,
    /// Feature map resolution of this layer.
    resolution: Resolution,
}

impl LayerInfo {
    /// Creates a new SSD layer description.
    pub fn new(boxes_per_cell: u32, width: u32, height: u32) -> Self {
        assert_ne!(boxes_per_cell, 0);
        Self {
            boxes_per_cell,
            resolution: Resolution::new(width, height),
        }
    }
}

/// The precomputed anchor/prior grid of an SSD network.
pub struct Anchors {
    anchors: Vec<Anchor>,
}

impl Anchors {
    pub fn calculate(layers: &[LayerInfo]) -> Self {
        let mut anchors = Vec::new();

        for layer in layers {
            let height = layer.resolution.height();
            let width = layer.resolution.width();

            for y in 0..height {
                for x in 0..width {
                    for _ in 0..layer.boxes_per_cell {
                        let x_center = (x as f32 + 0.5) / width as f32;
                        let y_center = (y as f32 + 0.5) / height as f32;

                        anchors.push(Anchor { x_center, y_center });
                    }
                }
            }
        }

        Self { anchors }
    }

    /// Returns the total number of SSD anchors/priors.
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

impl Index<usize> for Anchors {
    type Output = Anchor;

    fn index(&self, index: usize) -> &Anchor {
        &self.anchors[index]
    }
}

/// Performs greedy non-maximum suppression on `detections`.
///
/// Detections are processed in order of descending confidence; any lower-confidence detection
/// whose intersection-over-union with an already accepted one reaches `iou_thresh` is dropped.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_thresh: f32) -> Vec<Detection> {
    // Sort by ascending confidence, process highest confidence first by starting at the back.
    detections.sort_unstable_by_key(|det| TotalF32(det.confidence));

    let mut out = Vec::new();
    while let Some(seed) = detections.pop() {
        detections.retain(|other| seed.bounding_rect().iou(&other.bounding_rect()) < iou_thresh);
        out.push(seed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_range_anchor_count() {
        let anchors = Anchors::calculate(&[LayerInfo::new(2, 16, 16), LayerInfo::new(6, 8, 8)]);
        assert_eq!(anchors.anchor_count(), 896);

        let first = &anchors[0];
        assert!(first.x_center() > 0.0 && first.x_center() < 1.0);
    }

    #[test]
    fn nms_collapses_overlapping_detections() {
        let overlapping = vec![
            Detection::new(0.6, Rect::from_center(10.0, 10.0, 10.0, 10.0)),
            Detection::new(0.9, Rect::from_center(11.0, 10.0, 10.0, 10.0)),
            Detection::new(0.5, Rect::from_center(9.0, 11.0, 10.0, 10.0)),
        ];
        let kept = non_max_suppression(overlapping, 0.3);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence(), 0.9);
    }

    #[test]
    fn nms_keeps_distant_detections() {
        let distant = vec![
            Detection::new(0.9, Rect::from_center(10.0, 10.0, 10.0, 10.0)),
            Detection::new(0.8, Rect::from_center(100.0, 100.0, 10.0, 10.0)),
        ];
        let kept = non_max_suppression(distant, 0.3);
        assert_eq!(kept.len(), 2);
        // Highest confidence comes out first.
        assert!(kept[0].confidence() > kept[1].confidence());
    }
}
