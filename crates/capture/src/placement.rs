//! Capture rectangle placement around the cursor

use crate::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Fixed capture size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureSize {
    pub width: u32,
    pub height: u32,
}

impl CaptureSize {
    pub const MIN_SIDE: u32 = 100;
    pub const MAX_SIDE: u32 = 4000;

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        let range = Self::MIN_SIDE..=Self::MAX_SIDE;
        range.contains(&self.width) && range.contains(&self.height)
    }

    /// Force both sides into the accepted range
    pub fn clamped(&self) -> Self {
        Self {
            width: self.width.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
            height: self.height.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
        }
    }
}

impl Default for CaptureSize {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

impl std::fmt::Display for CaptureSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// How the capture rectangle is kept on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// Stay inside the monitor under the cursor
    #[default]
    Snap,
    /// Stay inside the whole virtual desktop, may cross monitors
    Span,
    /// Follow the cursor freely; off-screen pixels are filled black
    Off,
}

impl SnapMode {
    pub const ALL: [SnapMode; 3] = [SnapMode::Snap, SnapMode::Span, SnapMode::Off];

    pub fn label(self) -> &'static str {
        match self {
            SnapMode::Snap => "Snap",
            SnapMode::Span => "Span",
            SnapMode::Off => "Off (black fill)",
        }
    }
}

/// Index of the monitor containing `point`
pub fn monitor_at(point: Point, monitors: &[Rect]) -> Option<usize> {
    monitors.iter().position(|m| m.contains(point.x, point.y))
}

/// Index of the monitor containing `point`, or the closest one
pub fn nearest_monitor(point: Point, monitors: &[Rect]) -> Option<usize> {
    monitor_at(point, monitors).or_else(|| {
        monitors
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| m.distance_sq(point))
            .map(|(i, _)| i)
    })
}

fn clamp_axis(cursor: i32, start: i32, end: i32, len: u32) -> i32 {
    let half = (len / 2) as i32;
    // min first, then max: when the size exceeds the bounds the origin wins
    (start + half).max(cursor.min(end - half)) - half
}

/// Capture rectangle of `size` centered on `cursor`, constrained by `mode`
///
/// `half` rounds down, so an odd-sized rectangle pushed against the right or
/// bottom edge ends one pixel past it.
pub fn placement(
    cursor: Point,
    size: CaptureSize,
    monitors: &[Rect],
    virtual_screen: Rect,
    mode: SnapMode,
) -> Rect {
    let bounds = match mode {
        SnapMode::Snap => nearest_monitor(cursor, monitors)
            .map(|i| monitors[i])
            .unwrap_or(virtual_screen),
        SnapMode::Span => virtual_screen,
        SnapMode::Off => {
            let x = cursor.x - (size.width / 2) as i32;
            let y = cursor.y - (size.height / 2) as i32;
            return Rect::new(x, y, size.width, size.height);
        }
    };

    if bounds.is_empty() {
        let x = cursor.x - (size.width / 2) as i32;
        let y = cursor.y - (size.height / 2) as i32;
        return Rect::new(x, y, size.width, size.height);
    }

    Rect::new(
        clamp_axis(cursor.x, bounds.x, bounds.right(), size.width),
        clamp_axis(cursor.y, bounds.y, bounds.bottom(), size.height),
        size.width,
        size.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_monitors() -> (Vec<Rect>, Rect) {
        let primary = Rect::new(0, 0, 1920, 1080);
        let secondary = Rect::new(1920, 0, 2560, 1440);
        let virtual_screen = primary.union(&secondary);
        (vec![primary, secondary], virtual_screen)
    }

    #[test]
    fn centered_when_far_from_edges() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(960, 540), CaptureSize::new(200, 100), &monitors, vs, SnapMode::Snap);
        assert_eq!(rect, Rect::new(860, 490, 200, 100));
    }

    #[test]
    fn snap_clamps_to_monitor_under_cursor() {
        let (monitors, vs) = dual_monitors();
        // Near the right edge of the primary monitor
        let rect = placement(Point::new(1910, 10), CaptureSize::new(1024, 1024), &monitors, vs, SnapMode::Snap);
        assert_eq!(rect, Rect::new(1920 - 1024, 0, 1024, 1024));
        assert!(rect.right() <= 1920);
    }

    #[test]
    fn span_crosses_monitor_boundary() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(1910, 540), CaptureSize::new(1024, 1024), &monitors, vs, SnapMode::Span);
        assert_eq!(rect, Rect::new(1910 - 512, 28, 1024, 1024));
        assert!(rect.x < 1920 && rect.right() > 1920);
    }

    #[test]
    fn span_still_respects_virtual_screen_edges() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(4470, 1430), CaptureSize::new(400, 400), &monitors, vs, SnapMode::Span);
        assert_eq!(rect.right(), vs.right());
        assert_eq!(rect.bottom(), vs.bottom());
    }

    #[test]
    fn off_does_not_clamp() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(5, 5), CaptureSize::new(200, 200), &monitors, vs, SnapMode::Off);
        assert_eq!(rect, Rect::new(-95, -95, 200, 200));
    }

    #[test]
    fn oversized_capture_anchors_to_monitor_origin() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(900, 900), CaptureSize::new(1344, 1344), &monitors, vs, SnapMode::Snap);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.height, 1344);
    }

    #[test]
    fn cursor_in_gap_uses_nearest_monitor() {
        let monitors = vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1440)];
        let vs = monitors[0].union(&monitors[1]);
        // Below the shorter primary monitor, inside the virtual screen
        let cursor = Point::new(100, 1300);
        assert_eq!(monitor_at(cursor, &monitors), None);
        assert_eq!(nearest_monitor(cursor, &monitors), Some(0));

        let rect = placement(cursor, CaptureSize::new(200, 200), &monitors, vs, SnapMode::Snap);
        assert_eq!(rect, Rect::new(0, 880, 200, 200));
    }

    #[test]
    fn odd_sizes_keep_exact_dimensions() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(0, 0), CaptureSize::new(101, 333), &monitors, vs, SnapMode::Snap);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 101, 333));
    }

    #[test]
    fn odd_size_at_far_edge_overhangs_by_one() {
        let (monitors, vs) = dual_monitors();
        let rect = placement(Point::new(1919, 500), CaptureSize::new(101, 101), &monitors, vs, SnapMode::Snap);
        assert_eq!(rect.x, 1820);
        assert_eq!(rect.right(), 1921);
        assert_eq!(rect.width, 101);
    }

    #[test]
    fn snap_without_monitors_uses_virtual_screen() {
        let vs = Rect::new(0, 0, 1920, 1080);
        let rect = placement(Point::new(1900, 10), CaptureSize::new(200, 200), &[], vs, SnapMode::Snap);
        assert_eq!(rect, Rect::new(1720, 0, 200, 200));
    }

    #[test]
    fn empty_bounds_center_on_cursor() {
        let rect = placement(Point::new(50, 60), CaptureSize::new(200, 100), &[], Rect::default(), SnapMode::Snap);
        assert_eq!(rect, Rect::new(-50, 10, 200, 100));
    }

    #[test]
    fn oversized_span_anchors_to_virtual_screen_origin() {
        let monitors = vec![Rect::new(-1280, 0, 1280, 720)];
        let vs = monitors[0];
        let rect = placement(Point::new(-500, 300), CaptureSize::new(2000, 1000), &monitors, vs, SnapMode::Span);
        assert_eq!(rect, Rect::new(-1280, 0, 2000, 1000));
    }

    #[test]
    fn size_validation_bounds() {
        assert!(CaptureSize::new(100, 4000).is_valid());
        assert!(!CaptureSize::new(99, 500).is_valid());
        assert_eq!(CaptureSize::new(50, 9000).clamped(), CaptureSize::new(100, 4000));
    }
}
