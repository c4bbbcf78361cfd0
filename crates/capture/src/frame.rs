//! Captured pixel buffers

use crate::{CaptureError, CaptureResult, Point, Rect};
use image::{ImageBuffer, RgbaImage};

/// Frame data from a screen grab
#[derive(Debug, Clone)]
pub struct FrameData {
    /// BGRA, top-down rows
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Virtual-desktop position of the top-left pixel
    pub origin: Point,
}

impl FrameData {
    pub fn new(data: Vec<u8>, width: u32, height: u32, origin: Point) -> Self {
        Self { data, width, height, origin }
    }

    /// Virtual-desktop rectangle covered by this frame
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.width, self.height)
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Convert BGRA data to an opaque RGBA image
    pub fn to_rgba_image(&self) -> CaptureResult<RgbaImage> {
        let expected = self.expected_len();
        if self.data.len() != expected {
            return Err(CaptureError::BufferSize { expected, actual: self.data.len() });
        }

        let mut rgba_data = self.data.clone();

        // GDI leaves the alpha byte undefined
        for chunk in rgba_data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            chunk[3] = 0xFF;
        }

        ImageBuffer::from_raw(self.width, self.height, rgba_data).ok_or(
            CaptureError::BufferSize { expected, actual: self.data.len() },
        )
    }

    /// Paint black every pixel not covered by any of `covered`
    pub fn fill_outside(&mut self, covered: &[Rect]) {
        let bounds = self.bounds();
        if self.data.len() != self.expected_len() {
            return;
        }

        let visible: Vec<Rect> = covered
            .iter()
            .filter_map(|r| r.intersection(&bounds))
            .collect();

        let row_bytes = self.width as usize * 4;
        for (row, line) in self.data.chunks_exact_mut(row_bytes).enumerate() {
            let y = self.origin.y + row as i32;
            for (col, px) in line.chunks_exact_mut(4).enumerate() {
                let x = self.origin.x + col as i32;
                if !visible.iter().any(|r| r.contains(x, y)) {
                    px.copy_from_slice(&[0, 0, 0, 0xFF]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, origin: Point, bgra: [u8; 4]) -> FrameData {
        let data = bgra.repeat((width * height) as usize);
        FrameData::new(data, width, height, origin)
    }

    #[test]
    fn converts_bgra_to_opaque_rgba() {
        let frame = solid(2, 2, Point::default(), [10, 20, 30, 0]);
        let img = frame.to_rgba_image().unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 1).0, [30, 20, 10, 255]);
    }

    #[test]
    fn rejects_short_buffer() {
        let frame = FrameData::new(vec![0; 7], 2, 1, Point::default());
        match frame.to_rgba_image() {
            Err(CaptureError::BufferSize { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected result: {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn fill_outside_blackens_offscreen_pixels() {
        // Frame hangs two pixels off the left edge of the only monitor
        let mut frame = solid(4, 1, Point::new(-2, 0), [200, 200, 200, 0]);
        frame.fill_outside(&[Rect::new(0, 0, 1920, 1080)]);

        let img = frame.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [200, 200, 200, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn fill_outside_keeps_pixels_on_any_monitor() {
        let mut frame = solid(3, 1, Point::new(9, 0), [1, 2, 3, 0]);
        // Gap at x = 10 between two monitors
        frame.fill_outside(&[Rect::new(0, 0, 10, 5), Rect::new(11, 0, 10, 5)]);

        assert_eq!(&frame.data[0..4], &[1, 2, 3, 0]);
        assert_eq!(&frame.data[4..8], &[0, 0, 0, 255]);
        assert_eq!(&frame.data[8..12], &[1, 2, 3, 0]);
    }
}
