//! Application icon drawn at runtime

/// Lime on black
const BRACKET: [u8; 4] = [0, 255, 0, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Black square with lime corner brackets, RGBA rows top-down
pub fn icon_rgba(size: u32) -> Vec<u8> {
    let line = (size / 8).max(1);
    let arm = (size * 5 / 16).max(line + 1);

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let edge_x = x < line || x >= size - line;
            let edge_y = y < line || y >= size - line;
            let arm_x = x < arm || x >= size - arm;
            let arm_y = y < arm || y >= size - arm;

            if (edge_y && arm_x) || (edge_x && arm_y) {
                pixels.extend_from_slice(&BRACKET);
            } else {
                pixels.extend_from_slice(&BACKGROUND);
            }
        }
    }
    pixels
}

/// Same icon with red and blue swapped, as GDI bitmaps expect
pub fn icon_bgra(size: u32) -> Vec<u8> {
    let mut pixels = icon_rgba(size);
    swap_red_blue(&mut pixels);
    pixels
}

fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn corners_are_lime_center_is_black() {
        let size = 32;
        let px = icon_rgba(size);
        assert_eq!(px.len(), (size * size * 4) as usize);

        for (x, y) in [(0, 0), (31, 0), (0, 31), (31, 31), (5, 0), (0, 5)] {
            assert_eq!(pixel(&px, size, x, y), BRACKET, "({}, {})", x, y);
        }
        assert_eq!(pixel(&px, size, 16, 16), BACKGROUND);
        // gap between the two top brackets
        assert_eq!(pixel(&px, size, 16, 0), BACKGROUND);
    }

    #[test]
    fn bgra_swaps_channels() {
        let mut px = vec![10, 20, 30, 255, 200, 0, 100, 128];
        swap_red_blue(&mut px);
        assert_eq!(px, [30u8, 20, 10, 255, 100, 0, 200, 128]);

        let mut rgba = icon_rgba(16);
        swap_red_blue(&mut rgba);
        assert_eq!(rgba, icon_bgra(16));
        assert!(rgba.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn tiny_icon_still_has_a_gap() {
        let px = icon_rgba(16);
        assert_eq!(pixel(&px, 16, 8, 0), BACKGROUND);
        assert_eq!(pixel(&px, 16, 4, 0), BRACKET);
    }
}
