//! Viewport geometry for intersection tests.

use serde::{Deserialize, Serialize};

/// Extra distance around the viewport that still counts as "near".
///
/// Always non-negative and finite; anything else collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Margin(f64);

impl Margin {
    pub const ZERO: Margin = Margin(0.0);

    pub fn px(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Margin(value)
        } else {
            Margin::ZERO
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// CSS form used for the platform's `rootMargin` option, e.g. `"100px"`.
    pub fn to_css(self) -> String {
        format!("{}px", self.0)
    }
}

/// Axis-aligned rectangle in document coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow outward by `margin` on all four sides.
    pub fn expand(&self, margin: Margin) -> Rect {
        let m = margin.value();
        Rect::new(
            self.x - m,
            self.y - m,
            self.width + 2.0 * m,
            self.height + 2.0 * m,
        )
    }

    /// Edge-inclusive overlap test: touching rectangles intersect, matching
    /// how the browser reports a zero-threshold intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// The visible scrollable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// Whether any part of `target` lies inside the viewport grown by `margin`.
    pub fn is_near(&self, target: &Rect, margin: Margin) -> bool {
        self.rect().expand(margin).intersects(target)
    }
}
