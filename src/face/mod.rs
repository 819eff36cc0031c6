//! Face analysis.
//!
//! [`FaceAnalyzer`] bundles the three model-backed capabilities (box detection, 68-point
//! landmark extraction and expression classification) behind the [`FaceAnalysis`] trait, which
//! is all the request pipeline gets to see. Handlers receive the analyzer as an explicitly
//! constructed value, so tests can substitute a fake.

pub mod detection;
pub mod expression;
pub mod landmark;

use std::path::Path;

use crate::image::{Image, Rect};
use crate::landmark::Landmarks;
use crate::nn::NeuralNetwork;

use self::detection::FaceDetector;
use self::expression::{ExpressionClassifier, Expressions};
use self::landmark::Landmarker;

/// One analyzed face: bounding region, landmark set and expression scores.
#[derive(Debug, Clone)]
pub struct Face {
    rect: Rect,
    landmarks: Landmarks,
    expressions: Expressions,
}

impl Face {
    pub fn new(rect: Rect, landmarks: Landmarks, expressions: Expressions) -> Self {
        Self {
            rect,
            landmarks,
            expressions,
        }
    }

    /// Returns the axis-aligned bounding rectangle of this face.
    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    pub fn expressions(&self) -> &Expressions {
        &self.expressions
    }

    /// Returns the point the caricature transform anchors at: the top of the nose bridge.
    pub fn nose_anchor(&self) -> [f32; 2] {
        self.landmarks.nose()[0]
    }
}

/// The face analysis capability consumed by the request pipeline.
///
/// Implementations must treat the input image as read-only and may be called from multiple
/// requests concurrently.
pub trait FaceAnalysis: Send + Sync {
    /// Analyzes `image`, returning every detected face in detection order.
    ///
    /// An empty result is valid and means the image contains no recognizable face.
    fn analyze(&self, image: &Image) -> anyhow::Result<Vec<Face>>;
}

/// The production [`FaceAnalysis`] implementation, running all three networks.
pub struct FaceAnalyzer {
    detector: FaceDetector,
    landmarker: Landmarker,
    classifier: ExpressionClassifier,
}

impl FaceAnalyzer {
    /// Loads all three models from `models_dir`, sequentially.
    ///
    /// This is the process bootstrap step: it runs before the HTTP listener binds, and any
    /// failure here is fatal to the whole process.
    pub fn load<P: AsRef<Path>>(models_dir: P) -> anyhow::Result<Self> {
        let models_dir = models_dir.as_ref();

        let detector = FaceDetector::new(NeuralNetwork::load(models_dir.join(detection::MODEL_FILE))?)?;
        log::info!("loaded face detection model");
        let landmarker = Landmarker::new(NeuralNetwork::load(models_dir.join(landmark::MODEL_FILE))?)?;
        log::info!("loaded landmark model");
        let classifier =
            ExpressionClassifier::new(NeuralNetwork::load(models_dir.join(expression::MODEL_FILE))?)?;
        log::info!("loaded expression model");

        Ok(Self {
            detector,
            landmarker,
            classifier,
        })
    }
}

impl FaceAnalysis for FaceAnalyzer {
    fn analyze(&self, image: &Image) -> anyhow::Result<Vec<Face>> {
        let detections = self.detector.detect(image)?;

        let mut faces = Vec::with_capacity(detections.len());
        for detection in detections {
            let rect = detection.bounding_rect();
            let landmarks = self.landmarker.estimate(image, self.landmarker.face_crop(rect))?;
            let expressions = self.classifier.classify(image, self.classifier.face_crop(rect))?;
            faces.push(Face::new(rect, landmarks, expressions));
        }

        Ok(faces)
    }
}
