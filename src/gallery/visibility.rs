//! Viewport intersection math for lazy thumbnail loading.

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        (right > left && bottom > top).then(|| Self::new(left, top, right - left, bottom - top))
    }
}

/// Fraction of `target` inside `viewport` grown by `root_margin`, in `[0, 1]`.
///
/// A zero-area target counts as fully visible once it touches the viewport.
#[must_use]
pub fn intersection_ratio(target: &Rect, viewport: &Rect, root_margin: f32) -> f32 {
    let root = viewport.expand(root_margin);

    if target.area() == 0.0 {
        let inside = target.x >= root.x
            && target.y >= root.y
            && target.x <= root.x + root.width
            && target.y <= root.y + root.height;
        return if inside { 1.0 } else { 0.0 };
    }

    target
        .intersection(&root)
        .map_or(0.0, |hit| (hit.area() / target.area()).clamp(0.0, 1.0))
}
