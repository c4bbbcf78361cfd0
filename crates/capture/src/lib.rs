//! Screen capture module for SnapFrame
//!
//! Provides capture-rectangle geometry and raw GDI pixel copies of the screen.

pub mod frame;
pub mod placement;

#[cfg(windows)]
pub mod grab;
#[cfg(windows)]
pub mod screen;

pub use frame::FrameData;
pub use placement::{placement, CaptureSize, SnapMode};

#[cfg(windows)]
pub use grab::grab_region;
#[cfg(windows)]
pub use screen::{cursor_position, monitors, virtual_screen, Monitor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("GDI error: {0}")]
    Gdi(String),

    #[error("Capture region is empty")]
    EmptyRegion,

    #[error("Frame buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Point in physical pixels, virtual-desktop coordinates
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

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from Win32-style edges; inverted edges collapse to zero size
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: (right - left).max(0) as u32,
            height: (bottom - top).max(0) as u32,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x &&
        self.y < other.bottom() && self.bottom() > other.y
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Squared distance from a point to the nearest pixel of the rectangle
    pub fn distance_sq(&self, point: Point) -> i64 {
        let dx = if point.x < self.x {
            (self.x - point.x) as i64
        } else if point.x >= self.right() {
            (point.x - self.right() + 1) as i64
        } else {
            0
        };
        let dy = if point.y < self.y {
            (self.y - point.y) as i64
        } else if point.y >= self.bottom() {
            (point.y - self.bottom() + 1) as i64
        } else {
            0
        };
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 60, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 60, 50, 40)));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 100, 100);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn union_spans_both_monitors() {
        let left = Rect::new(-1920, 0, 1920, 1080);
        let right = Rect::new(0, -200, 2560, 1440);
        assert_eq!(left.union(&right), Rect::new(-1920, -200, 4480, 1440));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
    }

    #[test]
    fn offset_moves_without_resizing() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.offset(-15, 5), Rect::new(-5, 25, 30, 40));
    }

    #[test]
    fn distance_is_zero_inside() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.distance_sq(Point::new(5, 5)), 0);
        assert_eq!(r.distance_sq(Point::new(12, 5)), 9);
        assert_eq!(r.distance_sq(Point::new(-3, -4)), 25);
    }
}
