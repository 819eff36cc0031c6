//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA bitmap that doubles as the request's drawing canvas.
//! - [`Color`], [`Resolution`] and [`Rect`], the supporting value types.
//! - A variety of [`draw`] functions for putting decorative shapes onto an image.

pub mod draw;
mod rect;
mod resolution;

use std::{fmt, io::Cursor, ops::Index, path::Path};

use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};
use image::{imageops::FilterType, ImageBuffer, Rgba, RgbaImage};

pub use rect::Rect;
pub use resolution::Resolution;

/// An 8-bit sRGB color with alpha channel.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Fully transparent black (all components are 0).
    pub const NONE: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }

    /// Returns the perceived brightness of this color as an 8-bit luma value.
    ///
    /// Grayscale network inputs are sampled through this.
    pub fn luma(&self) -> u8 {
        let l = 0.299 * f32::from(self.r()) + 0.587 * f32::from(self.g()) + 0.114 * f32::from(self.b());
        l.round() as u8
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a(),
        )
    }
}

impl Index<usize> for Color {
    type Output = u8;

    #[inline]
    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl PixelColor for Color {
    type Raw = RawU32;
}

/// An 8-bit sRGB image with alpha channel.
///
/// Every request works on exactly one of these: the canonical 500×500 bitmap derived from the
/// upload, which is then mutated in place by the caricature and decoration phases.
#[derive(Clone)]
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Decodes an image from raw container bytes, sniffing the format from its magic number.
    pub fn decode(data: &[u8]) -> anyhow::Result<Self> {
        let buf = image::load_from_memory(data)?.to_rgba8();
        Ok(Self { buf })
    }

    /// Loads an image from the filesystem.
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::decode(&data)
    }

    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns a [`Rect`] covering this image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        let rgba = &self.buf[(x, y)];
        Color(rgba.0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Samples the image at pixel coordinates, returning [`Color::NONE`] outside its bounds.
    pub fn sample(&self, x: i64, y: i64) -> Color {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            Color::NONE
        } else {
            self.get(x as u32, y as u32)
        }
    }

    /// Produces a copy of this image stretched or squeezed to exactly `res`.
    ///
    /// The aspect ratio is *not* preserved; this is the normalization step that turns arbitrary
    /// uploads into the canonical working bitmap.
    pub fn resize(&self, res: Resolution) -> Image {
        Image {
            buf: image::imageops::resize(&self.buf, res.width(), res.height(), FilterType::Triangle),
        }
    }

    /// Encodes the image as a PNG container.
    pub fn encode_png(&self) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.buf
            .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)?;
        Ok(out)
    }

    /// Saves an image to the file system.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        Ok(self.buf.save(path)?)
    }

    /// Clears the image, setting every pixel value to `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_is_exact() {
        let img = Image::new(2000, 1000);
        let resized = img.resize(Resolution::new(500, 500));
        assert_eq!(resized.width(), 500);
        assert_eq!(resized.height(), 500);

        let tall = Image::new(30, 900).resize(Resolution::new(500, 500));
        assert_eq!(tall.resolution(), Resolution::new(500, 500));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Image::decode(b"definitely not an image").is_err());
        assert!(Image::decode(&[]).is_err());
    }

    #[test]
    fn png_roundtrip_preserves_size() {
        let mut img = Image::new(17, 5);
        img.set(3, 2, Color::RED);
        let png = img.encode_png().unwrap();
        let back = Image::decode(&png).unwrap();
        assert_eq!(back.resolution(), Resolution::new(17, 5));
        assert_eq!(back.get(3, 2), Color::RED);
    }

    #[test]
    fn sample_clips_to_none() {
        let img = Image::new(4, 4);
        assert_eq!(img.sample(-1, 0), Color::NONE);
        assert_eq!(img.sample(0, 4), Color::NONE);
        assert_eq!(img.sample(2, 2), Color::from_rgba8(0, 0, 0, 0));
    }
}
