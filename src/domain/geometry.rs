/// An axis-aligned rectangle in screen space. `top` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Returns true when `element` lies entirely inside `viewport`.
///
/// Touching an edge counts as inside.
pub fn is_fully_within(element: &ScreenRect, viewport: &ScreenRect) -> bool {
    element.top >= viewport.top
        && element.left >= viewport.left
        && element.bottom() <= viewport.bottom()
        && element.right() <= viewport.right()
}
