//! The per-request processing pipeline.
//!
//! decode → normalize → analyze → caricature (per face) → decorate → encode. Each request runs
//! these steps strictly in order on its own canvas; there is no shared mutable state.

use thiserror::Error;

use crate::caricature;
use crate::decorate;
use crate::face::FaceAnalysis;
use crate::image::{Image, Resolution};

/// The fixed working resolution every upload is normalized to.
pub const CANONICAL_RESOLUTION: Resolution = Resolution::new(500, 500);

/// Everything that can go wrong between receiving upload bytes and producing a PNG.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode uploaded image")]
    Decode(#[source] anyhow::Error),
    #[error("face analysis failed")]
    Analysis(#[source] anyhow::Error),
    #[error("failed to encode result")]
    Encode(#[source] anyhow::Error),
}

/// Runs the whole filter over raw upload bytes, returning the finished PNG.
///
/// When several faces are detected, their distortions *compose*: each face's transform is
/// applied to the canvas produced by the previous one, in detection order, so every face
/// contributes to the output. With a single face this is identical to stretching the base image
/// once.
///
/// The decoration overlay always runs, even when no face was found.
pub fn process(
    data: &[u8],
    analyzer: &dyn FaceAnalysis,
    rng: &mut fastrand::Rng,
) -> Result<Vec<u8>, PipelineError> {
    let bitmap = Image::decode(data).map_err(PipelineError::Decode)?;
    let bitmap = bitmap.resize(CANONICAL_RESOLUTION);

    let faces = analyzer.analyze(&bitmap).map_err(PipelineError::Analysis)?;
    log::debug!("detected {} face(s)", faces.len());

    let mut canvas = bitmap;
    for face in &faces {
        let (expression, score) = face.expressions().dominant();
        log::debug!(
            "face at {:?}: dominant expression {} ({:.2})",
            face.bounding_rect(),
            expression.label(),
            score,
        );
        canvas = caricature::stretch_at(&canvas, face.nose_anchor());
    }

    decorate::hearts_and_roses(&mut canvas, rng);

    canvas.encode_png().map_err(PipelineError::Encode)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::face::expression::Expressions;
    use crate::face::Face;
    use crate::image::Rect;
    use crate::landmark::Landmarks;

    use super::*;

    /// A canned analyzer: returns faces with the given nose anchors, or fails.
    struct Canned {
        anchors: Vec<[f32; 2]>,
        fail: bool,
    }

    impl Canned {
        fn with_anchors(anchors: Vec<[f32; 2]>) -> Self {
            Self {
                anchors,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                anchors: Vec::new(),
                fail: true,
            }
        }
    }

    impl FaceAnalysis for Canned {
        fn analyze(&self, _image: &Image) -> anyhow::Result<Vec<Face>> {
            if self.fail {
                return Err(anyhow!("model blew up"));
            }
            Ok(self
                .anchors
                .iter()
                .map(|&anchor| {
                    let mut landmarks = Landmarks::new();
                    landmarks.positions_mut()[27] = anchor;
                    Face::new(
                        Rect::from_center(anchor[0], anchor[1], 100.0, 100.0),
                        landmarks,
                        Expressions::from_scores([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                    )
                })
                .collect())
        }
    }

    fn sample_upload_sized(width: u32, height: u32) -> Vec<u8> {
        let mut img = Image::new(width, height);
        img.clear(crate::image::Color::from_rgb8(90, 120, 150));
        // any decodable container works here
        img.encode_png().unwrap()
    }

    #[test]
    fn output_is_canonical_png() {
        let input = sample_upload_sized(2000, 1000);
        let png = process(
            &input,
            &Canned::with_anchors(vec![]),
            &mut fastrand::Rng::with_seed(1),
        )
        .unwrap();

        let out = Image::decode(&png).unwrap();
        assert_eq!(out.resolution(), CANONICAL_RESOLUTION);
    }

    #[test]
    fn zero_faces_is_base_plus_overlay_only() {
        let input = sample_upload_sized(500, 500);

        let undistorted = process(
            &input,
            &Canned::with_anchors(vec![]),
            &mut fastrand::Rng::with_seed(9),
        )
        .unwrap();

        // Reproduce the overlay by hand on the canonical bitmap; with no face, the pipeline must
        // produce exactly this.
        let mut expected = Image::decode(&input).unwrap().resize(CANONICAL_RESOLUTION);
        decorate::hearts_and_roses(&mut expected, &mut fastrand::Rng::with_seed(9));
        assert_eq!(undistorted, expected.encode_png().unwrap());
    }

    #[test]
    fn faces_distort_the_output() {
        let mut img = Image::new(500, 500);
        for y in 0..500 {
            for x in 0..500 {
                img.set(x, y, crate::image::Color::from_rgb8((y % 256) as u8, 0, 0));
            }
        }
        let input = img.encode_png().unwrap();

        let plain = process(
            &input,
            &Canned::with_anchors(vec![]),
            &mut fastrand::Rng::with_seed(4),
        )
        .unwrap();
        let one = process(
            &input,
            &Canned::with_anchors(vec![[250.0, 230.0]]),
            &mut fastrand::Rng::with_seed(4),
        )
        .unwrap();
        let two = process(
            &input,
            &Canned::with_anchors(vec![[250.0, 230.0], [100.0, 400.0]]),
            &mut fastrand::Rng::with_seed(4),
        )
        .unwrap();

        // Same overlay seed, so any difference comes from the caricature step.
        assert_ne!(plain, one);
        assert_ne!(one, two);
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        let result = process(
            b"this is not an image at all",
            &Canned::with_anchors(vec![]),
            &mut fastrand::Rng::with_seed(1),
        );
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn analyzer_failure_is_an_analysis_error() {
        let input = sample_upload_sized(100, 100);
        let result = process(&input, &Canned::failing(), &mut fastrand::Rng::with_seed(1));
        assert!(matches!(result, Err(PipelineError::Analysis(_))));
    }
}
