//! Facial expression classification.
//!
//! Uses the [FER+] emotion recognition network, which scores a grayscale face crop across 8
//! emotion classes. The pipeline only carries the scores along (they show up in the logs);
//! nothing downstream branches on them.
//!
//! [FER+]: https://github.com/onnx/models/tree/main/validated/vision/body_analysis/emotion_ferplus

use crate::image::{Image, Rect};
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork};
use crate::num::softmax;

/// File name of the expression model inside the models directory.
pub const MODEL_FILE: &str = "emotion_ferplus.onnx";

/// The emotion classes recognized by the classifier, in network output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Neutral = 0,
    Happiness = 1,
    Surprise = 2,
    Sadness = 3,
    Anger = 4,
    Disgust = 5,
    Fear = 6,
    Contempt = 7,
}

impl Expression {
    pub const ALL: [Expression; 8] = [
        Expression::Neutral,
        Expression::Happiness,
        Expression::Surprise,
        Expression::Sadness,
        Expression::Anger,
        Expression::Disgust,
        Expression::Fear,
        Expression::Contempt,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happiness => "happiness",
            Expression::Surprise => "surprise",
            Expression::Sadness => "sadness",
            Expression::Anger => "anger",
            Expression::Disgust => "disgust",
            Expression::Fear => "fear",
            Expression::Contempt => "contempt",
        }
    }
}

/// Per-class expression probabilities for one face.
#[derive(Debug, Clone)]
pub struct Expressions {
    scores: [f32; 8],
}

impl Expressions {
    /// Creates an [`Expressions`] value from a raw score vector in network output order.
    pub fn from_scores(scores: [f32; 8]) -> Self {
        Self { scores }
    }

    /// Returns the score of a single expression class.
    pub fn score(&self, expression: Expression) -> f32 {
        self.scores[expression as usize]
    }

    /// Returns the highest-scoring expression and its score.
    pub fn dominant(&self) -> (Expression, f32) {
        Expression::ALL
            .into_iter()
            .zip(self.scores)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap()
    }

    /// Iterates over all `(class, score)` pairs in network output order.
    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        Expression::ALL.into_iter().zip(self.scores)
    }
}

/// An expression classifier wrapping the FER+ network.
#[derive(Clone)]
pub struct ExpressionClassifier {
    cnn: Cnn,
}

impl ExpressionClassifier {
    /// Wraps a loaded FER+ [`NeuralNetwork`].
    ///
    /// The network wants raw 0–255 grayscale input, so no range remapping happens here.
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        Ok(Self {
            cnn: Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(0.0..=255.0))?,
        })
    }

    /// Computes the crop region to run classification on for a detected face rectangle.
    pub fn face_crop(&self, face_rect: Rect) -> Rect {
        face_rect.grow_to_fit_aspect(self.cnn.input_resolution().aspect_ratio())
    }

    /// Scores the face inside `crop` across all expression classes.
    pub fn classify(&self, image: &Image, crop: Rect) -> anyhow::Result<Expressions> {
        let outputs = self.cnn.estimate(image, crop)?;
        let data = outputs.slice(0)?;
        anyhow::ensure!(
            data.len() >= 8,
            "expression output yields {} values, expected 8",
            data.len(),
        );

        let mut scores: [f32; 8] = data[..8].try_into().unwrap();
        softmax(&mut scores);
        Ok(Expressions::from_scores(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_expression() {
        let mut scores = [0.0; 8];
        scores[Expression::Happiness as usize] = 0.7;
        scores[Expression::Neutral as usize] = 0.2;
        let expressions = Expressions::from_scores(scores);

        let (class, score) = expressions.dominant();
        assert_eq!(class, Expression::Happiness);
        assert_eq!(score, 0.7);
        assert_eq!(class.label(), "happiness");
    }

    #[test]
    fn iter_is_in_output_order() {
        let expressions = Expressions::from_scores([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
        let collected: Vec<_> = expressions.iter().collect();
        assert_eq!(collected.len(), 8);
        assert_eq!(collected[0], (Expression::Neutral, 0.1));
        assert_eq!(collected[7], (Expression::Contempt, 0.8));
    }
}
