//! Face detection.
//!
//! This uses the short-range "BlazeFace" network also used in MediaPipe's [Face Detection]
//! module, which works best for faces within a few meters of the camera. A fair assumption for
//! uploaded portrait photos.
//!
//! [Face Detection]: https://google.github.io/mediapipe/solutions/face_detection

use nalgebra::{Rotation2, Vector2};
use once_cell::sync::Lazy;

use crate::detection::{non_max_suppression, Anchor, Anchors, Detection, Keypoint, LayerInfo};
use crate::image::{Image, Rect, Resolution};
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork, Outputs};
use crate::num::sigmoid;

/// File name of the detection model inside the models directory.
pub const MODEL_FILE: &str = "face_detection_short_range.onnx";

/// Meaning of the first two SSD keypoints; the remaining four are unused here.
enum SsdKeypoint {
    LeftEye = 0,
    RightEye = 1,
}

static ANCHORS: Lazy<Anchors> =
    Lazy::new(|| Anchors::calculate(&[LayerInfo::new(2, 16, 16), LayerInfo::new(6, 8, 8)]));

/// A face detector wrapping the short-range BlazeFace SSD network.
#[derive(Clone)]
pub struct FaceDetector {
    cnn: Cnn,
    thresh: f32,
    iou_thresh: f32,
}

impl FaceDetector {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_IOU_THRESHOLD: f32 = 0.3;

    /// Wraps a loaded BlazeFace [`NeuralNetwork`].
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        Ok(Self {
            cnn: Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(-1.0..=1.0))?,
            thresh: Self::DEFAULT_THRESHOLD,
            iou_thresh: Self::DEFAULT_IOU_THRESHOLD,
        })
    }

    #[inline]
    pub fn set_threshold(&mut self, thresh: f32) {
        self.thresh = thresh;
    }

    /// Detects faces in `image`, returning detections in image coordinates, highest confidence
    /// first.
    ///
    /// No detections is a perfectly valid result and not an error.
    pub fn detect(&self, image: &Image) -> anyhow::Result<Vec<Detection>> {
        let input_res = self.cnn.input_resolution();

        // If the input image's aspect ratio doesn't match the CNN's input, compute an oversized
        // region that does, so the image isn't distorted by the input sampling.
        let region = image.rect().grow_to_fit_aspect(input_res.aspect_ratio());
        let outputs = self.cnn.estimate(image, region)?;
        log::trace!("inference result: {outputs:?}");

        let raw = self.extract(&outputs, input_res)?;
        let raw = non_max_suppression(raw, self.iou_thresh);

        // Map detections from the network's input coordinate system back into the image's.
        let scale = region.width() / input_res.width() as f32;
        Ok(raw
            .into_iter()
            .map(|det| {
                let rect = det
                    .bounding_rect()
                    .scale(scale, scale)
                    .move_by(region.x(), region.y());
                let keypoints = det
                    .keypoints()
                    .iter()
                    .map(|kp| Keypoint::new(kp.x() * scale + region.x(), kp.y() * scale + region.y()))
                    .collect();
                let mut mapped = Detection::with_keypoints(det.confidence(), rect, keypoints);
                mapped.set_angle(det.angle());
                mapped
            })
            .collect())
    }

    fn extract(&self, outputs: &Outputs, input_res: Resolution) -> anyhow::Result<Vec<Detection>> {
        let num_anchors = ANCHORS.anchor_count();
        anyhow::ensure!(
            outputs.shape(0) == [1, num_anchors, 16] && outputs.shape(1) == [1, num_anchors, 1],
            "unexpected detection output shapes {:?}/{:?}",
            outputs.shape(0),
            outputs.shape(1),
        );

        let boxes = outputs.slice(0)?;
        let confidences = outputs.slice(1)?;

        let mut detections = Vec::new();
        for (index, raw_conf) in confidences.iter().enumerate() {
            let conf = sigmoid(*raw_conf);
            if conf < self.thresh {
                continue;
            }

            let box_params = &boxes[index * 16..(index + 1) * 16];
            detections.push(extract_detection(
                &ANCHORS[index],
                input_res,
                box_params,
                conf,
            ));
        }

        Ok(detections)
    }
}

fn extract_detection(
    anchor: &Anchor,
    input_res: Resolution,
    box_params: &[f32],
    confidence: f32,
) -> Detection {
    assert_eq!(box_params.len(), 16);

    let input_w = input_res.width() as f32;
    let input_h = input_res.height() as f32;

    let xc = box_params[0] + anchor.x_center() * input_w;
    let yc = box_params[1] + anchor.y_center() * input_h;
    let w = box_params[2];
    let h = box_params[3];
    let kp = |x: f32, y: f32| {
        Keypoint::new(
            x + anchor.x_center() * input_w,
            y + anchor.y_center() * input_h,
        )
    };

    let mut det = Detection::with_keypoints(
        confidence,
        Rect::from_center(xc, yc, w, h),
        vec![
            kp(box_params[4], box_params[5]),
            kp(box_params[6], box_params[7]),
            kp(box_params[8], box_params[9]),
            kp(box_params[10], box_params[11]),
            kp(box_params[12], box_params[13]),
            kp(box_params[14], box_params[15]),
        ],
    );

    let left_eye = det.keypoints()[SsdKeypoint::LeftEye as usize];
    let right_eye = det.keypoints()[SsdKeypoint::RightEye as usize];
    let left_to_right_eye =
        Vector2::new(right_eye.x() - left_eye.x(), right_eye.y() - left_eye.y());
    let angle = Rotation2::rotation_between(&Vector2::x(), &left_to_right_eye).angle();
    det.set_angle(angle);

    det
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn extraction_recenters_on_anchor() {
        let anchors = Anchors::calculate(&[LayerInfo::new(1, 2, 2)]);
        let res = Resolution::new(128, 128);

        // Anchor 0 is centered at (0.25, 0.25); zero offsets must land the box on the anchor.
        let mut params = [0.0; 16];
        params[2] = 40.0;
        params[3] = 40.0;
        let det = extract_detection(&anchors[0], res, &params, 0.9);

        assert_eq!(det.bounding_rect().center(), (32.0, 32.0));
        assert_eq!(det.bounding_rect().width(), 40.0);
        assert_relative_eq!(det.angle(), 0.0);
    }

    #[test]
    fn eye_line_determines_angle() {
        let anchors = Anchors::calculate(&[LayerInfo::new(1, 2, 2)]);
        let res = Resolution::new(128, 128);

        let mut params = [0.0; 16];
        params[2] = 40.0;
        params[3] = 40.0;
        // Right eye directly below the left one: a 90° clockwise roll.
        params[4] = -10.0; // left eye x
        params[5] = 0.0;
        params[6] = -10.0; // right eye x
        params[7] = 10.0;
        let det = extract_detection(&anchors[0], res, &params, 0.9);

        assert_relative_eq!(det.angle(), std::f32::consts::FRAC_PI_2, epsilon = 1e-4);
    }
}
