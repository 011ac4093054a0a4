pub const DISPLAY_WIDTH: usize = 128;
pub const DISPLAY_HEIGHT: usize = 64;
pub const DISPLAY_PAGES: usize = DISPLAY_HEIGHT / 8;

/// Dither patterns standing in for brightness levels on a 1-bit display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Solid,
    Checker,
    Stripes,
    Sparse,
}

impl Pattern {
    /// Whether the pixel at (x, y) is lit when a run is filled with this
    /// pattern. Patterns key off absolute screen coordinates so adjacent
    /// runs tile seamlessly.
    pub fn is_lit(self, x: i32, y: i32) -> bool {
        match self {
            Pattern::Solid => true,
            Pattern::Checker => (x + y) % 2 == 0,
            Pattern::Stripes => x % 2 == 0,
            Pattern::Sparse => x % 4 == 0 && y % 4 == 0,
        }
    }
}

/// 1-bit framebuffer in horizontal byte pages: bit `y % 8` of byte
/// `x + (y / 8) * DISPLAY_WIDTH` holds pixel (x, y). Draw calls clip to
/// the display bounds; out-of-range pixels are ignored, never an error.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: [u8; DISPLAY_WIDTH * DISPLAY_PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; DISPLAY_WIDTH * DISPLAY_PAGES],
        }
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || x >= DISPLAY_WIDTH as i32 || y < 0 || y >= DISPLAY_HEIGHT as i32 {
            return;
        }
        let index = x as usize + (y as usize / 8) * DISPLAY_WIDTH;
        let mask = 1u8 << (y as usize % 8);
        if on {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= DISPLAY_WIDTH as i32 || y < 0 || y >= DISPLAY_HEIGHT as i32 {
            return false;
        }
        let index = x as usize + (y as usize / 8) * DISPLAY_WIDTH;
        self.bytes[index] & (1 << (y as usize % 8)) != 0
    }

    /// Draws a vertical run between y0 and y1 inclusive, in either order,
    /// lighting the pixels the pattern selects. The run is clamped to the
    /// screen before any pixel is touched.
    pub fn draw_vline(&mut self, x: i32, y0: i32, y1: i32, pattern: Pattern) {
        if x < 0 || x >= DISPLAY_WIDTH as i32 {
            return;
        }
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let top = top.max(0);
        let bottom = bottom.min(DISPLAY_HEIGHT as i32 - 1);
        for y in top..=bottom {
            if pattern.is_lit(x, y) {
                self.set_pixel(x, y, true);
            }
        }
    }

    pub fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, pattern: Pattern) {
        if y < 0 || y >= DISPLAY_HEIGHT as i32 {
            return;
        }
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let left = left.max(0);
        let right = right.min(DISPLAY_WIDTH as i32 - 1);
        for x in left..=right {
            if pattern.is_lit(x, y) {
                self.set_pixel(x, y, true);
            }
        }
    }

    /// Bresenham line between two points, clipping per pixel.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set_pixel(x, y, true);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    /// The raw page bytes, ready for a transport that speaks the page
    /// layout directly.
    pub fn as_pages(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pixel_packs_into_expected_page_byte() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(0, 9, true);

        // y = 9 lands in page 1, bit 1.
        assert_eq!(frame.as_pages()[DISPLAY_WIDTH], 0b0000_0010);
        assert!(frame.pixel(0, 9));
        assert!(!frame.pixel(0, 8));
    }

    #[test]
    fn set_pixel_ignores_out_of_range_coordinates() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(-1, 0, true);
        frame.set_pixel(0, -1, true);
        frame.set_pixel(DISPLAY_WIDTH as i32, 0, true);
        frame.set_pixel(0, DISPLAY_HEIGHT as i32, true);

        assert!(frame.as_pages().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn set_pixel_clears_when_off() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(5, 5, true);
        frame.set_pixel(5, 5, false);
        assert!(!frame.pixel(5, 5));
    }

    #[test]
    fn vline_clamps_run_to_screen_and_accepts_reversed_ends() {
        let mut frame = FrameBuffer::new();
        frame.draw_vline(3, 1000, -1000, Pattern::Solid);

        for y in 0..DISPLAY_HEIGHT as i32 {
            assert!(frame.pixel(3, y));
        }
        assert!(!frame.pixel(2, 0));
        assert!(!frame.pixel(4, 0));
    }

    #[test]
    fn vline_off_screen_column_is_a_noop() {
        let mut frame = FrameBuffer::new();
        frame.draw_vline(-1, 0, 10, Pattern::Solid);
        frame.draw_vline(DISPLAY_WIDTH as i32, 0, 10, Pattern::Solid);
        assert!(frame.as_pages().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn checker_pattern_alternates_per_pixel() {
        let mut frame = FrameBuffer::new();
        frame.draw_vline(0, 0, 3, Pattern::Checker);

        assert!(frame.pixel(0, 0));
        assert!(!frame.pixel(0, 1));
        assert!(frame.pixel(0, 2));
        assert!(!frame.pixel(0, 3));
    }

    #[test]
    fn sparse_pattern_lights_one_in_sixteen() {
        let lit = (0..8)
            .flat_map(|x| (0..8).map(move |y| (x, y)))
            .filter(|(x, y)| Pattern::Sparse.is_lit(*x, *y))
            .count();
        assert_eq!(lit, 4);
    }

    #[test]
    fn clear_resets_every_page() {
        let mut frame = FrameBuffer::new();
        frame.draw_vline(10, 0, 63, Pattern::Solid);
        frame.clear();
        assert!(frame.as_pages().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn draw_line_connects_endpoints() {
        let mut frame = FrameBuffer::new();
        frame.draw_line(0, 0, 7, 7);
        assert!(frame.pixel(0, 0));
        assert!(frame.pixel(7, 7));
        assert!(frame.pixel(3, 3));
    }

    #[test]
    fn draw_line_clips_offscreen_segments_without_panicking() {
        let mut frame = FrameBuffer::new();
        frame.draw_line(-20, -10, 300, 80);
        // Only the on-screen span lights up; the rest clips silently.
        assert!(frame.as_pages().iter().any(|byte| *byte != 0));
    }
}
