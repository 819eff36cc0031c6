//! The decoration overlay.
//!
//! Unconditionally showers the canvas with hearts and roses, face or no face. Positions are
//! uniformly random across the whole canvas; shapes may overlap each other, the face, and the
//! canvas edges (where they get clipped).

use crate::image::{draw, Color, Image};

/// Number of hearts drawn per request.
pub const HEART_COUNT: usize = 15;
/// Number of roses drawn per request.
pub const ROSE_COUNT: usize = 10;

/// Heart size, in pixels from cusp to tip.
pub const HEART_SIZE: u32 = 20;
/// Rose diameter, in pixels.
pub const ROSE_SIZE: u32 = 15;

const HEART_RED: Color = Color::RED;
const ROSE_PINK: Color = Color::from_rgb8(255, 192, 203);

/// Draws [`HEART_COUNT`] hearts followed by [`ROSE_COUNT`] roses at random positions onto
/// `canvas`.
///
/// The caller owns the random source: the server seeds one from entropy per request, tests pass
/// a fixed seed to get reproducible output.
pub fn hearts_and_roses(canvas: &mut Image, rng: &mut fastrand::Rng) {
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);

    for _ in 0..HEART_COUNT {
        let x = (rng.f32() * width) as i32;
        let y = (rng.f32() * height) as i32;
        draw::heart(canvas, x, y).size(HEART_SIZE).color(HEART_RED);
    }

    for _ in 0..ROSE_COUNT {
        let x = (rng.f32() * width) as i32;
        let y = (rng.f32() * height) as i32;
        draw::rose(canvas, x, y).size(ROSE_SIZE).color(ROSE_PINK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(image: &Image) -> Vec<u8> {
        let mut data = Vec::new();
        for y in 0..image.height() {
            for x in 0..image.width() {
                data.extend(image.get(x, y).0);
            }
        }
        data
    }

    #[test]
    fn same_seed_same_confetti() {
        let mut a = Image::new(500, 500);
        let mut b = Image::new(500, 500);
        hearts_and_roses(&mut a, &mut fastrand::Rng::with_seed(42));
        hearts_and_roses(&mut b, &mut fastrand::Rng::with_seed(42));
        assert_eq!(buffer(&a), buffer(&b));
    }

    #[test]
    fn different_seed_different_confetti() {
        let mut a = Image::new(500, 500);
        let mut b = Image::new(500, 500);
        hearts_and_roses(&mut a, &mut fastrand::Rng::with_seed(1));
        hearts_and_roses(&mut b, &mut fastrand::Rng::with_seed(2));
        assert_ne!(buffer(&a), buffer(&b));
    }

    #[test]
    fn shape_counts_match_the_filter_contract() {
        assert_eq!(HEART_COUNT, 15);
        assert_eq!(ROSE_COUNT, 10);
        assert_eq!(HEART_SIZE, 20);
        assert_eq!(ROSE_SIZE, 15);
    }

    #[test]
    fn overlay_paints_both_shape_colors() {
        let mut canvas = Image::new(500, 500);
        hearts_and_roses(&mut canvas, &mut fastrand::Rng::with_seed(7));

        let mut reds = 0;
        let mut pinks = 0;
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                match canvas.get(x, y) {
                    c if c == HEART_RED => reds += 1,
                    c if c == ROSE_PINK => pinks += 1,
                    _ => {}
                }
            }
        }
        assert!(reds > 0, "no heart pixels painted");
        assert!(pinks > 0, "no rose pixels painted");
    }

    #[test]
    fn tiny_canvas_does_not_panic() {
        // Shapes larger than the canvas must simply clip.
        let mut canvas = Image::new(8, 8);
        hearts_and_roses(&mut canvas, &mut fastrand::Rng::with_seed(3));
    }
}
