//! Shared type definitions for the mirror and the overlay.
//!
//! Geometry primitives, native handle newtypes and colors used across the
//! components and the platform layer.

// ============================================================================
// Constants
// ============================================================================

/// Window class name of the mirror host window
pub const HOST_CLASS_NAME: &str = "ThumbMirrorHost";

/// Window class name of the annotation overlay window
pub const OVERLAY_CLASS_NAME: &str = "ThumbMirrorOverlay";

/// Timer used by the host window to re-check the source size
pub const SOURCE_POLL_TIMER: TimerId = TimerId(1001);

/// Full scale of a relative cursor coordinate
pub const RELATIVE_SCALE: i32 = 1000;

/// DPI every monitor reports when no per-monitor value is available
pub const DEFAULT_DPI: u32 = 96;

// ============================================================================
// Native handles
// ============================================================================

/// Opaque native window handle. Never owned by value; liveness must be
/// re-checked through the window system before each use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowId(pub isize);

impl WindowId {
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Registration token handed out by the compositor for a thumbnail link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailId(pub isize);

/// Identifier of a window timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub usize);

// ============================================================================
// Geometry Types
// ============================================================================

/// A rectangle with integer coordinates.
///
/// Uses left/top/right/bottom format where right and bottom are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from left, top, right, bottom coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from x, y, width, height
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Get the width of the rectangle (0 when inverted)
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Get the height of the rectangle (0 when inverted)
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Check if a point is inside the rectangle (exclusive of right/bottom edges)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Offset the rectangle by dx, dy
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }
}

/// A point with integer coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer size in device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Floating point position used by the drawing primitives
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Floating point rectangle used by the drawing primitives
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        Self::new(r.left as f32, r.top as f32, r.right as f32, r.bottom as f32)
    }
}

/// Floating point size, as reported by text measurement
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Colors
// ============================================================================

/// Straight-alpha RGBA color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Color constants for overlay rendering
pub mod colors {
    use super::Color;

    /// Fully transparent, used to clear each frame
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Inner text halo (1px ring)
    pub const TEXT_OUTLINE: Color = Color::rgba(0.3, 0.3, 0.3, 0.35);

    /// Outer text halo (2px ring), fainter than the inner one
    pub const TEXT_OUTLINE_FAR: Color = Color::rgba(0.2, 0.2, 0.2, 0.08);
}

// ============================================================================
// Cursor
// ============================================================================

/// Cursor position inside the source client area on a 0..=1000 scale.
///
/// `(-1, -1)` is the "unknown / outside" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeCursor {
    pub x: i32,
    pub y: i32,
}

impl RelativeCursor {
    pub const UNKNOWN: Self = Self { x: -1, y: -1 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Map a point in client coordinates onto the relative scale.
    ///
    /// The upper bound is inclusive: a point exactly on the right or bottom
    /// edge maps to 1000 instead of the sentinel.
    pub fn from_client_point(point: Point, client: Rect) -> Self {
        let width = client.right - client.left;
        let height = client.bottom - client.top;
        if width <= 0 || height <= 0 {
            return Self::UNKNOWN;
        }

        if point.x < 0 || point.y < 0 || point.x > client.right || point.y > client.bottom {
            return Self::UNKNOWN;
        }

        let x = (i64::from(point.x) * i64::from(RELATIVE_SCALE) / i64::from(width)) as i32;
        let y = (i64::from(point.y) * i64::from(RELATIVE_SCALE) / i64::from(height)) as i32;
        Self { x, y }
    }

    pub fn is_known(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// Scale back onto a pixel area of `width` x `height`
    pub fn to_pixels(&self, width: i32, height: i32) -> Option<PointF> {
        if !self.is_known() || width <= 0 || height <= 0 {
            return None;
        }
        Some(PointF::new(
            (self.x * width) as f32 / RELATIVE_SCALE as f32,
            (self.y * height) as f32 / RELATIVE_SCALE as f32,
        ))
    }
}

impl Default for RelativeCursor {
    fn default() -> Self {
        Self::UNKNOWN
    }
}
