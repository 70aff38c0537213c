//! 1-bit frame buffer in SSD1306 page order.
//!
//! Byte `page * width + column` holds the eight vertical pixels of rows
//! `page * 8 .. page * 8 + 8`, LSB on top, so a bus driver can stream pages
//! straight out of [`FrameBuffer::pages`].

use std::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    bitmap: Vec<u8>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pages = height.div_ceil(8);
        Self {
            width,
            height,
            bitmap: vec![0; (pages * width) as usize],
            dirty: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let page = y as u32 / 8;
        let idx = page * self.width + x as u32;
        Some((idx as usize, 1 << (y % 8)))
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .map(|(idx, mask)| self.bitmap[idx] & mask != 0)
            .unwrap_or(false)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((idx, mask)) = self.index(x, y) {
            let before = self.bitmap[idx];
            self.bitmap[idx] = if on { before | mask } else { before & !mask };
            self.dirty |= before != self.bitmap[idx];
        }
    }

    /// Number of lit pixels inside the given rectangle.
    pub fn lit_in(&self, x: i32, y: i32, w: u32, h: u32) -> usize {
        let mut count = 0;
        for py in y..y + h as i32 {
            for px in x..x + w as i32 {
                if self.pixel(px, py) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Raw page-ordered bytes.
    pub fn pages(&self) -> &[u8] {
        &self.bitmap
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// `#` for lit pixels, `.` for dark ones, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                out.push(if self.pixel(x, y) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color.is_on());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_page_layout() {
        let mut fb = FrameBuffer::new(128, 64);
        assert_eq!(fb.pages().len(), 1024);
        fb.set_pixel(5, 0, true);
        fb.set_pixel(5, 9, true);
        assert_eq!(fb.pages()[5], 0b0000_0001);
        assert_eq!(fb.pages()[128 + 5], 0b0000_0010);
        assert!(fb.pixel(5, 9));
        fb.set_pixel(5, 9, false);
        assert!(!fb.pixel(5, 9));
    }

    #[test]
    fn test_out_of_bounds_is_discarded() {
        let mut fb = FrameBuffer::new(16, 8);
        fb.set_pixel(-1, 0, true);
        fb.set_pixel(16, 0, true);
        fb.set_pixel(0, 8, true);
        assert!(fb.pages().iter().all(|&b| b == 0));
        assert!(!fb.pixel(100, 100));
    }

    #[test]
    fn test_draw_target_fill_and_clear() {
        let mut fb = FrameBuffer::new(128, 64);
        Rectangle::new(Point::new(120, 60), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit_in(0, 0, 128, 64), 8 * 4);

        Rectangle::new(Point::new(0, 0), Size::new(128, 64))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit_in(0, 0, 128, 64), 0);
    }

    #[test]
    fn test_dirty_tracking_and_ascii() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.mark_clean();
        fb.set_pixel(0, 0, false);
        assert!(!fb.is_dirty());
        fb.set_pixel(2, 1, true);
        assert!(fb.is_dirty());
        assert_eq!(fb.to_ascii(), "...\n..#\n");
    }
}
