//! Decorative shape drawing.
//!
//! Shapes are drawn through guard values: the free functions in this module return a guard that
//! performs the actual rasterization when dropped, after any customization methods were applied.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{self, PrimitiveStyle, Rectangle},
};
use itertools::Itertools;

use crate::image::{Color, Image};

/// Number of line segments each Bézier lobe of a heart is flattened into.
const HEART_SEGMENTS: u32 = 24;

/// Guard returned by [`heart`]; draws the heart when dropped and allows customization.
pub struct DrawHeart<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    size: f32,
    color: Color,
}

impl DrawHeart<'_> {
    /// Sets the heart's fill color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the heart's size (the vertical distance from the lobe cusp to the tip).
    pub fn size(&mut self, size: u32) -> &mut Self {
        self.size = size as f32;
        self
    }
}

impl Drop for DrawHeart<'_> {
    fn drop(&mut self) {
        let (x, y, s) = (self.x as f32, self.y as f32, self.size);

        // Two mirrored cubic Bézier lobes that start and end in the cusp at `(x, y)` and meet in
        // the tip at `(x, y + s)`.
        let left = [
            [x, y],
            [x - s / 2.0, y - s / 2.0],
            [x - s, y + s / 3.0],
            [x, y + s],
        ];
        let right = [
            [x, y + s],
            [x + s, y + s / 3.0],
            [x + s / 2.0, y - s / 2.0],
            [x, y],
        ];

        let mut outline = Vec::with_capacity(2 * HEART_SEGMENTS as usize);
        for curve in [left, right] {
            for i in 0..HEART_SEGMENTS {
                outline.push(cubic_bezier(&curve, i as f32 / HEART_SEGMENTS as f32));
            }
        }

        fill_polygon(&mut Target(&mut *self.image), &outline, self.color);
    }
}

/// Guard returned by [`rose`]; draws the rose when dropped and allows customization.
///
/// A rose is rendered as a plain filled circle. Botanically questionable, but that is what the
/// filter always looked like.
pub struct DrawRose<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    diameter: u32,
    color: Color,
}

impl DrawRose<'_> {
    /// Sets the rose's fill color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the rose's diameter.
    pub fn size(&mut self, diameter: u32) -> &mut Self {
        self.diameter = diameter;
        self
    }
}

impl Drop for DrawRose<'_> {
    fn drop(&mut self) {
        let top_left = Point {
            x: self.x - (self.diameter / 2) as i32,
            y: self.y - (self.diameter / 2) as i32,
        };
        let circle = primitives::Circle {
            top_left,
            diameter: self.diameter,
        };
        match circle
            .into_styled(PrimitiveStyle::with_fill(self.color))
            .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws a filled heart onto an image.
///
/// `x` and `y` locate the cusp between the two lobes; the shape extends roughly one size unit
/// down and half a size unit up from there. Parts outside the image are clipped.
pub fn heart(image: &mut Image, x: i32, y: i32) -> DrawHeart<'_> {
    DrawHeart {
        image,
        x,
        y,
        size: 20.0,
        color: Color::RED,
    }
}

/// Draws a filled circular rose onto an image.
///
/// `x` and `y` locate the center. Parts outside the image are clipped.
pub fn rose(image: &mut Image, x: i32, y: i32) -> DrawRose<'_> {
    DrawRose {
        image,
        x,
        y,
        diameter: 15,
        color: Color::from_rgb8(255, 192, 203),
    }
}

/// Evaluates a cubic Bézier curve given as `[start, control1, control2, end]` at `t`.
fn cubic_bezier(curve: &[[f32; 2]; 4], t: f32) -> [f32; 2] {
    let u = 1.0 - t;
    let [w0, w1, w2, w3] = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    [
        w0 * curve[0][0] + w1 * curve[1][0] + w2 * curve[2][0] + w3 * curve[3][0],
        w0 * curve[0][1] + w1 * curve[1][1] + w2 * curve[2][1] + w3 * curve[3][1],
    ]
}

/// Fills a closed polygon using even-odd scanline filling.
fn fill_polygon(target: &mut Target<'_>, outline: &[[f32; 2]], color: Color) {
    let y_min = outline.iter().map(|p| p[1]).fold(f32::INFINITY, f32::min);
    let y_max = outline.iter().map(|p| p[1]).fold(f32::NEG_INFINITY, f32::max);
    if !y_min.is_finite() || !y_max.is_finite() {
        return;
    }

    let mut crossings = Vec::new();
    for y in y_min.floor() as i32..=y_max.ceil() as i32 {
        // Sample scanlines between pixel centers to avoid double-counting vertices.
        let scan_y = y as f32 + 0.5;

        crossings.clear();
        for (a, b) in outline.iter().circular_tuple_windows() {
            if (a[1] <= scan_y) != (b[1] <= scan_y) {
                crossings.push(a[0] + (scan_y - a[1]) * (b[0] - a[0]) / (b[1] - a[1]));
            }
        }
        crossings.sort_unstable_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let pixels = (span[0].round() as i32..span[1].round() as i32)
                .map(|x| Pixel(Point { x, y }, color));
            match target.draw_iter(pixels) {
                Ok(_) => {}
                Err(infallible) => match infallible {},
            }
        }
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            if pixel.0.x >= 0
                && (pixel.0.x as u32) < self.0.width()
                && pixel.0.y >= 0
                && (pixel.0.y as u32) < self.0.height()
            {
                self.0.set(pixel.0.x as _, pixel.0.y as _, pixel.1);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_pixels(image: &Image, color: Color) -> usize {
        let mut n = 0;
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.get(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn heart_paints_inside_its_bounding_box() {
        let mut image = Image::new(100, 100);
        heart(&mut image, 50, 40).size(20);

        assert!(count_pixels(&image, Color::RED) > 0);
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.get(x, y) == Color::RED {
                    // Lobes reach one size unit sideways, half a unit up, one unit down.
                    assert!((29..=71).contains(&x), "red pixel at x={x}");
                    assert!((29..=61).contains(&y), "red pixel at y={y}");
                }
            }
        }
    }

    #[test]
    fn heart_clips_at_canvas_edges() {
        let mut image = Image::new(50, 50);
        heart(&mut image, 0, 0).size(20);
        heart(&mut image, 49, 49).size(20);
        // Nothing to assert beyond "no panic": out-of-bounds pixels are discarded.
        assert!(count_pixels(&image, Color::RED) > 0);
    }

    #[test]
    fn rose_is_a_filled_circle() {
        let pink = Color::from_rgb8(255, 192, 203);
        let mut image = Image::new(60, 60);
        rose(&mut image, 30, 30).size(15);

        assert_eq!(image.get(30, 30), pink);
        // Area of a diameter-15 disc, with some slack for rasterization.
        let count = count_pixels(&image, pink);
        assert!((120..=200).contains(&count), "{count} pixels");
    }

    #[test]
    fn rose_clips_at_canvas_edges() {
        let pink = Color::from_rgb8(255, 192, 203);
        let mut image = Image::new(20, 20);
        rose(&mut image, 0, 19).size(15);
        assert!(count_pixels(&image, pink) > 0);
    }
}
