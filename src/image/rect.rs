//! Axis-aligned rectangles.
//!
//! These are used for image regions, detection bounding boxes, and network input crops.

use std::fmt;

/// An axis-aligned rectangle.
///
/// Rectangles are allowed to have zero height and/or width. Negative dimensions are not allowed.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect {
    x_center: f32,
    y_center: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle extending outwards from a center point.
    #[inline]
    pub fn from_center(x_center: f32, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(top_left_x: f32, top_left_y: f32, width: f32, height: f32) -> Self {
        Self::from_center(
            top_left_x + width * 0.5,
            top_left_y + height * 0.5,
            width,
            height,
        )
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> f32 {
        self.x_center - self.width * 0.5
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> f32 {
        self.y_center - self.height * 0.5
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x_center, self.y_center)
    }

    /// Moves the rectangle by an offset, keeping its size.
    #[must_use]
    pub fn move_by(&self, x: f32, y: f32) -> Self {
        Self {
            x_center: self.x_center + x,
            y_center: self.y_center + y,
            ..*self
        }
    }

    /// Scales position and size of this rectangle by the given factors.
    #[must_use]
    pub fn scale(&self, x_scale: f32, y_scale: f32) -> Self {
        Self {
            x_center: self.x_center * x_scale,
            y_center: self.y_center * y_scale,
            width: self.width * x_scale,
            height: self.height * y_scale,
        }
    }

    /// Grows this rectangle by adding a margin relative to width and height.
    ///
    /// `amount` is the relative amount of the rectangle's width and height to add to each side.
    #[must_use]
    pub fn grow_rel(&self, amount: f32) -> Self {
        Self {
            width: self.width * (1.0 + amount * 2.0),
            height: self.height * (1.0 + amount * 2.0),
            ..*self
        }
    }

    /// Symmetrically extends one dimension of `self` so that the resulting rectangle has the given
    /// aspect ratio (width divided by height).
    ///
    /// # Panics
    ///
    /// This method will panic if `self` has a width or height of 0.
    #[must_use]
    pub fn grow_to_fit_aspect(&self, target_aspect: f32) -> Self {
        assert!(
            self.width > 0.0 && self.height > 0.0,
            "cannot fit aspect ratio of empty rectangle {self:?}"
        );

        let mut res = *self;
        let target_width = self.height * target_aspect;
        if target_width >= self.width {
            res.width = target_width;
        } else {
            res.height = self.width / target_aspect;
        }
        res
    }

    fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Computes the intersection of `self` and `other`, or `None` when they don't overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x().max(other.x());
        let y_min = self.y().max(other.y());
        let x_max = (self.x() + self.width).min(other.x() + other.width);
        let y_max = (self.y() + self.height).min(other.y() + other.height);
        if x_min >= x_max || y_min >= y_max {
            return None;
        }
        Some(Rect::from_top_left(x_min, y_min, x_max - x_min, y_max - y_min))
    }

    /// Computes the intersection-over-union of two rectangles.
    ///
    /// Returns 0.0 for disjoint rectangles.
    pub fn iou(&self, other: &Rect) -> f32 {
        match self.intersection(other) {
            Some(intersection) => {
                let union = self.area() + other.area() - intersection.area();
                intersection.area() / union
            }
            None => 0.0,
        }
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({},{})/{}x{}",
            self.x(),
            self.y(),
            self.width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn corner_and_center_agree() {
        let rect = Rect::from_top_left(10.0, 20.0, 4.0, 6.0);
        assert_eq!(rect.center(), (12.0, 23.0));
        assert_eq!(rect.x(), 10.0);
        assert_eq!(rect.y(), 20.0);
    }

    #[test]
    fn iou_of_identical_rects_is_one() {
        let rect = Rect::from_center(5.0, 5.0, 10.0, 10.0);
        assert_relative_eq!(rect.iou(&rect), 1.0);
    }

    #[test]
    fn iou_of_disjoint_rects_is_zero() {
        let a = Rect::from_top_left(0.0, 0.0, 1.0, 1.0);
        let b = Rect::from_top_left(5.0, 5.0, 1.0, 1.0);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = Rect::from_top_left(0.0, 0.0, 2.0, 1.0);
        let b = Rect::from_top_left(1.0, 0.0, 2.0, 1.0);
        // intersection 1, union 3
        assert_relative_eq!(a.iou(&b), 1.0 / 3.0);
    }

    #[test]
    fn grow_to_fit_aspect_only_grows() {
        let rect = Rect::from_center(0.0, 0.0, 100.0, 50.0);
        let square = rect.grow_to_fit_aspect(1.0);
        assert_eq!(square.width(), 100.0);
        assert_eq!(square.height(), 100.0);
        assert_eq!(square.center(), rect.center());

        let wide = Rect::from_center(0.0, 0.0, 50.0, 100.0).grow_to_fit_aspect(1.0);
        assert_eq!(wide.width(), 100.0);
        assert_eq!(wide.height(), 100.0);
    }
}
