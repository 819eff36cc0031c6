//! 68-point facial landmark estimation.
//!
//! Uses the PFLD-style landmark network from [FaceONNX]. The network wants a reasonably tight,
//! aspect-correct face crop; [`Landmarker::face_crop`] computes one from a detection rectangle.
//!
//! [FaceONNX]: https://github.com/FaceONNX/FaceONNX

use crate::image::{Image, Rect};
use crate::landmark::{Landmarks, NUM_LANDMARKS};
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork};

/// File name of the landmark model inside the models directory.
pub const MODEL_FILE: &str = "landmarks_68_pfld.onnx";

/// Relative margin added around a face's bounding rectangle before landmark estimation.
const CROP_MARGIN: f32 = 0.15;

/// A 68-point landmark estimator.
#[derive(Clone)]
pub struct Landmarker {
    cnn: Cnn,
}

impl Landmarker {
    /// Wraps a loaded landmark [`NeuralNetwork`].
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        Ok(Self {
            cnn: Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(0.0..=1.0))?,
        })
    }

    /// Computes the crop region to run landmark estimation on for a detected face rectangle.
    ///
    /// The detection rectangle is grown by a margin (landmarks like the jawline routinely fall
    /// slightly outside the detection box) and extended to match the network's input aspect
    /// ratio.
    pub fn face_crop(&self, face_rect: Rect) -> Rect {
        face_rect
            .grow_rel(CROP_MARGIN)
            .grow_to_fit_aspect(self.cnn.input_resolution().aspect_ratio())
    }

    /// Estimates landmark positions inside `crop`, returning them in `image` coordinates.
    pub fn estimate(&self, image: &Image, crop: Rect) -> anyhow::Result<Landmarks> {
        let outputs = self.cnn.estimate(image, crop)?;
        let data = outputs.slice(0)?;
        anyhow::ensure!(
            data.len() >= NUM_LANDMARKS * 2,
            "landmark output yields {} values, expected at least {}",
            data.len(),
            NUM_LANDMARKS * 2,
        );

        // The network outputs interleaved (x, y) pairs normalized to the crop.
        let mut landmarks = Landmarks::new();
        for (pair, out) in data[..NUM_LANDMARKS * 2]
            .chunks_exact(2)
            .zip(landmarks.positions_mut())
        {
            out[0] = crop.x() + pair[0] * crop.width();
            out[1] = crop.y() + pair[1] * crop.height();
        }
        Ok(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_crop_margin_is_symmetric() {
        // Margin math only; no network involved.
        let rect = Rect::from_center(100.0, 100.0, 40.0, 40.0);
        let grown = rect.grow_rel(CROP_MARGIN);
        assert_eq!(grown.center(), rect.center());
        assert_eq!(grown.width(), 52.0);
        assert_eq!(grown.height(), 52.0);
    }
}
