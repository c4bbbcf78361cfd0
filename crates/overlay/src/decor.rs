//! Layout of the capture frame decoration

/// Thickness of the lime border bars
pub const BORDER_THICKNESS: i32 = 3;
/// Length of each white corner marker arm
pub const CORNER_LENGTH: i32 = 10;
/// Thickness of each white corner marker arm
pub const CORNER_THICKNESS: i32 = 2;

/// Which brush paints a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Border,
    Corner,
}

/// Filled rectangle relative to the capture rectangle's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Segment {
    const fn new(kind: SegmentKind, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { kind, x, y, width, height }
    }
}

/// Four border bars followed by eight corner arms, in paint order
pub fn frame_segments(width: i32, height: i32) -> [Segment; 12] {
    use SegmentKind::{Border, Corner};

    let (w, h) = (width, height);
    let (bt, cl, ct) = (BORDER_THICKNESS, CORNER_LENGTH, CORNER_THICKNESS);

    [
        // top, bottom, left, right
        Segment::new(Border, 0, 0, w, bt),
        Segment::new(Border, 0, h - bt, w, bt),
        Segment::new(Border, 0, 0, bt, h),
        Segment::new(Border, w - bt, 0, bt, h),
        // top-left
        Segment::new(Corner, 0, 0, cl, ct),
        Segment::new(Corner, 0, 0, ct, cl),
        // top-right
        Segment::new(Corner, w - cl, 0, cl, ct),
        Segment::new(Corner, w - ct, 0, ct, cl),
        // bottom-left
        Segment::new(Corner, 0, h - ct, cl, ct),
        Segment::new(Corner, 0, h - cl, ct, cl),
        // bottom-right
        Segment::new(Corner, w - cl, h - ct, cl, ct),
        Segment::new(Corner, w - ct, h - cl, ct, cl),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_stay_inside_rectangle() {
        let (w, h) = (1216, 832);
        for s in frame_segments(w, h) {
            assert!(s.x >= 0 && s.y >= 0, "{:?}", s);
            assert!(s.x + s.width <= w, "{:?}", s);
            assert!(s.y + s.height <= h, "{:?}", s);
        }
    }

    #[test]
    fn corners_touch_their_corner() {
        let (w, h) = (200, 100);
        let corners: Vec<Segment> = frame_segments(w, h)
            .into_iter()
            .filter(|s| s.kind == SegmentKind::Corner)
            .collect();
        assert_eq!(corners.len(), 8);

        // bottom-right arms end exactly at the bottom-right pixel edge
        let br_h = corners[6];
        let br_v = corners[7];
        assert_eq!((br_h.x + br_h.width, br_h.y + br_h.height), (w, h));
        assert_eq!((br_v.x + br_v.width, br_v.y + br_v.height), (w, h));
        assert_eq!(br_v.width, CORNER_THICKNESS);
        assert_eq!(br_v.height, CORNER_LENGTH);
    }

    #[test]
    fn borders_come_first() {
        let segments = frame_segments(100, 100);
        assert!(segments[..4].iter().all(|s| s.kind == SegmentKind::Border));
    }
}
