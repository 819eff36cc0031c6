//! The caricature transform.
//!
//! The filter's signature effect: a non-uniform vertical stretch anchored at the top of the nose
//! bridge, which blows up the nose (and chin) while leaving the anchor row where it was.

use crate::image::Image;

/// Vertical magnification factor applied around the nose anchor.
pub const VERTICAL_STRETCH: f32 = 1.5;

/// Stretches `base` vertically by [`VERTICAL_STRETCH`] around `anchor`, returning a new image of
/// the same size.
///
/// Every output pixel `(x, y)` samples the base image at `(x, ay + (y - ay) / 1.5)` where `ay` is
/// the anchor's Y coordinate, so the anchor row is a fixed point of the transform. Sample
/// positions between rows are interpolated linearly; positions outside the image clamp to the
/// nearest row.
///
/// The function is pure: applying the transforms of several faces one after another composes
/// their distortions.
pub fn stretch_at(base: &Image, anchor: [f32; 2]) -> Image {
    let (width, height) = (base.width(), base.height());
    let ay = anchor[1];

    let mut out = Image::new(width, height);
    for y in 0..height {
        let src_y = ay + (y as f32 - ay) / VERTICAL_STRETCH;
        let src_y = src_y.clamp(0.0, (height - 1) as f32);

        let top = src_y.floor() as u32;
        let bottom = (top + 1).min(height - 1);
        let frac = src_y - top as f32;

        for x in 0..width {
            let a = base.get(x, top);
            let b = base.get(x, bottom);
            let mix = |ca: u8, cb: u8| {
                (f32::from(ca) * (1.0 - frac) + f32::from(cb) * frac).round() as u8
            };
            out.set(
                x,
                y,
                crate::image::Color::from_rgba8(
                    mix(a.r(), b.r()),
                    mix(a.g(), b.g()),
                    mix(a.b(), b.b()),
                    mix(a.a(), b.a()),
                ),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::image::Color;

    use super::*;

    /// A 1×N column where each row's red channel encodes its index.
    fn gradient(height: u32) -> Image {
        let mut img = Image::new(1, height);
        for y in 0..height {
            img.set(0, y, Color::from_rgb8(y as u8, 0, 0));
        }
        img
    }

    #[test]
    fn anchor_row_is_fixed() {
        let base = gradient(100);
        let out = stretch_at(&base, [0.0, 40.0]);
        assert_eq!(out.get(0, 40), base.get(0, 40));
    }

    #[test]
    fn rows_sample_at_compressed_offsets() {
        let base = gradient(200);
        let ay = 80.0;
        let out = stretch_at(&base, [0.0, ay]);

        for y in [0u32, 20, 80, 140, 199] {
            let src_y = ay + (y as f32 - ay) / VERTICAL_STRETCH;
            let expected = src_y.round() as u8;
            let got = out.get(0, y).r();
            // Bilinear interpolation can land between two adjacent gradient values.
            assert!(
                got.abs_diff(expected) <= 1,
                "row {y}: got {got}, expected ~{expected}"
            );
        }
    }

    #[test]
    fn output_size_matches_input() {
        let base = Image::new(37, 53);
        let out = stretch_at(&base, [10.0, 10.0]);
        assert_eq!(out.width(), 37);
        assert_eq!(out.height(), 53);
    }

    #[test]
    fn transforms_compose() {
        let base = gradient(100);
        let once = stretch_at(&base, [0.0, 30.0]);
        let twice = stretch_at(&once, [0.0, 70.0]);

        // The second anchor row must show the *first* transform's output, not the base.
        assert_eq!(twice.get(0, 70), once.get(0, 70));
        // And rows away from the second anchor must differ from the single application.
        assert_ne!(twice.get(0, 10), once.get(0, 10));
    }
}
