//! Neural network inference.
//!
//! Model weights are plain ONNX files read from the models directory at startup; inference runs
//! on the CPU through [`tract`].
//!
//! [`tract`]: https://github.com/sonos/tract

use std::{
    ops::RangeInclusive,
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use tract_onnx::prelude::{
    tract_ndarray::Array4, tvec, Framework, Graph, InferenceModelExt, SimplePlan, TValue, Tensor,
    TypedFact, TypedOp,
};

use crate::image::{Color, Image, Rect, Resolution};

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A neural network that can be used for inference.
///
/// This is a cheaply [`Clone`]able handle to the underlying network structures.
#[derive(Clone)]
pub struct NeuralNetwork(Arc<NeuralNetworkImpl>);

struct NeuralNetworkImpl {
    plan: Model,
    input_shape: Vec<usize>,
}

impl NeuralNetwork {
    /// Loads and optimizes a pre-trained model from an ONNX file path.
    ///
    /// The path must have a `.onnx` extension. Returns an error if the file is missing or
    /// malformed, or if the network uses unimplemented operations.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => anyhow::bail!("neural network file must have `.onnx` extension"),
        }

        let data = std::fs::read(path)
            .with_context(|| format!("failed to read model weights from `{}`", path.display()))?;
        Self::from_onnx(&data)
            .with_context(|| format!("failed to load model `{}`", path.display()))
    }

    /// Loads a pre-trained model from an in-memory ONNX file.
    pub fn from_onnx(raw: &[u8]) -> anyhow::Result<Self> {
        let graph = tract_onnx::onnx()
            .model_for_read(&mut &*raw)?
            .into_optimized()?;

        anyhow::ensure!(
            graph.inputs.len() == 1,
            "network has to take exactly 1 input, this one takes {}",
            graph.inputs.len(),
        );
        let input_shape = graph
            .input_fact(0)?
            .shape
            .as_concrete()
            .map(<[usize]>::to_vec)
            .context("network input shape is symbolic")?;

        let plan = graph.into_runnable()?;
        Ok(Self(Arc::new(NeuralNetworkImpl { plan, input_shape })))
    }

    /// Returns the tensor shape of the network's sole input.
    pub fn input_shape(&self) -> &[usize] {
        &self.0.input_shape
    }

    /// Runs the network on an input tensor, returning the estimated [`Outputs`].
    #[doc(alias = "infer")]
    pub fn estimate(&self, input: Tensor) -> anyhow::Result<Outputs> {
        let outputs = self.0.plan.run(tvec![TValue::from_const(Arc::new(input))])?;
        Ok(Outputs { inner: outputs })
    }
}

/// The result of a neural network inference pass.
///
/// This is a list of tensors corresponding to the network's output nodes.
#[derive(Debug)]
pub struct Outputs {
    inner: tract_onnx::prelude::TVec<TValue>,
}

impl Outputs {
    /// Returns the number of tensors in this inference output.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the shape of the `index`th output tensor.
    pub fn shape(&self, index: usize) -> &[usize] {
        self.inner[index].shape()
    }

    /// Returns the data of the `index`th output tensor as a flat `f32` slice.
    pub fn slice(&self, index: usize) -> anyhow::Result<&[f32]> {
        Ok(self.inner[index].as_slice::<f32>()?)
    }
}

/// Describes in what order a CNN expects its input image data.
///
/// - `N` is the number of images, fixed at 1 here.
/// - `C` is the number of color channels, 3 for RGB inputs and 1 for grayscale ones.
/// - `H` and `W` are the height and width of the input, respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive] // shouldn't be matched on by user code
pub enum CnnInputShape {
    /// Shape is `[N, C, H, W]`.
    NCHW,
    /// Shape is `[N, H, W, C]`.
    NHWC,
}

/// Maps 8-bit sRGB channel values into the value range a network expects.
pub struct ColorMapper {
    target_range: RangeInclusive<f32>,
}

impl ColorMapper {
    /// Creates a simple color mapper that uniformly maps sRGB values to `target_range`.
    ///
    /// Note that this operates on *non-linear* sRGB channels and maps them linearly to the target
    /// range, which matches what the consumed networks were trained on.
    pub fn linear(target_range: RangeInclusive<f32>) -> Self {
        assert!(target_range.end() > target_range.start());
        Self { target_range }
    }

    fn map_channel(&self, value: u8) -> f32 {
        let start = *self.target_range.start();
        let end = *self.target_range.end();
        f32::from(value) * (end - start) / 255.0 + start
    }

    fn map(&self, color: Color) -> [f32; 3] {
        [color.r(), color.g(), color.b()].map(|ch| self.map_channel(ch))
    }

    fn map_luma(&self, color: Color) -> f32 {
        self.map_channel(color.luma())
    }
}

/// A convolutional neural network (CNN) that operates on image data.
///
/// Like the underlying [`NeuralNetwork`], this is a cheaply [`Clone`]able handle to the
/// underlying data.
#[derive(Clone)]
pub struct Cnn {
    nn: NeuralNetwork,
    input_res: Resolution,
    channels: usize,
    shape: CnnInputShape,
    color_mapper: Arc<ColorMapper>,
}

impl Cnn {
    /// Creates a CNN wrapper from a [`NeuralNetwork`].
    ///
    /// The network must have a single image input whose shape matches the given
    /// [`CnnInputShape`], with either 1 or 3 color channels.
    pub fn new(
        nn: NeuralNetwork,
        shape: CnnInputShape,
        color_mapper: ColorMapper,
    ) -> anyhow::Result<Self> {
        let (channels, w, h) = match (shape, nn.input_shape()) {
            (CnnInputShape::NCHW, &[1, c @ (1 | 3), h, w]) => (c, w, h),
            (CnnInputShape::NHWC, &[1, h, w, c @ (1 | 3)]) => (c, w, h),
            (_, tensor_shape) => {
                anyhow::bail!("invalid model input shape for {shape:?} CNN: {tensor_shape:?}");
            }
        };
        let input_res = Resolution::new(w.try_into()?, h.try_into()?);

        Ok(Self {
            nn,
            input_res,
            channels,
            shape,
            color_mapper: Arc::new(color_mapper),
        })
    }

    /// Returns the expected input image size.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Runs the network on a rectangular region of `image`, returning the estimated outputs.
    ///
    /// The region is sampled to create the network's input tensor: if its aspect ratio does not
    /// match the network's input aspect ratio, the content is stretched; pixels outside the image
    /// read as transparent black.
    pub fn estimate(&self, image: &Image, region: Rect) -> anyhow::Result<Outputs> {
        let (w, h) = (
            self.input_res.width() as usize,
            self.input_res.height() as usize,
        );

        let sample = |x: usize, y: usize| -> Color {
            let u = x as f32 / w as f32;
            let v = y as f32 / h as f32;
            let sx = (region.x() + u * region.width()).round() as i64;
            let sy = (region.y() + v * region.height()).round() as i64;
            image.sample(sx, sy)
        };

        let mapper = &self.color_mapper;
        let tensor: Tensor = match (self.shape, self.channels) {
            (CnnInputShape::NCHW, 3) => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
                mapper.map(sample(x, y))[c]
            })
            .into(),
            (CnnInputShape::NHWC, 3) => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                mapper.map(sample(x, y))[c]
            })
            .into(),
            (CnnInputShape::NCHW, _) => Array4::from_shape_fn((1, 1, h, w), |(_, _, y, x)| {
                mapper.map_luma(sample(x, y))
            })
            .into(),
            (CnnInputShape::NHWC, _) => Array4::from_shape_fn((1, h, w, 1), |(_, y, x, _)| {
                mapper.map_luma(sample(x, y))
            })
            .into(),
        };

        self.nn.estimate(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mapper() {
        let mapper = ColorMapper::linear(-1.0..=1.0);
        assert_eq!(mapper.map(Color::BLACK), [-1.0, -1.0, -1.0]);
        assert_eq!(mapper.map(Color::WHITE), [1.0, 1.0, 1.0]);

        let mapper = ColorMapper::linear(1.0..=2.0);
        assert_eq!(mapper.map(Color::BLACK), [1.0, 1.0, 1.0]);
        assert_eq!(mapper.map(Color::WHITE), [2.0, 2.0, 2.0]);
    }

    #[test]
    fn luma_mapping() {
        let mapper = ColorMapper::linear(0.0..=255.0);
        assert_eq!(mapper.map_luma(Color::WHITE), 255.0);
        assert_eq!(mapper.map_luma(Color::BLACK), 0.0);
    }
}
