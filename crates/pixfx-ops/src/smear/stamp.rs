//! Rasterizers for smear stamps.
//!
//! Every touched pixel is mixed toward the stamp color. Pixels outside the
//! buffer are skipped one by one, so stamps may hang over any edge.

use pixfx_core::{pixel, AtomicPixelBuffer, Argb};

/// Shared drawing surface for one smear call.
///
/// Reads colors from the untouched source, writes into the atomic output.
pub(crate) struct Canvas<'a> {
    src: &'a [Argb],
    out: &'a AtomicPixelBuffer,
    width: isize,
    height: isize,
    mix: f32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(src: &'a [Argb], out: &'a AtomicPixelBuffer, mix: f32) -> Self {
        Self {
            src,
            out,
            width: out.width() as isize,
            height: out.height() as isize,
            mix,
        }
    }

    /// Source color at an in-bounds position.
    #[inline]
    pub(crate) fn source(&self, x: usize, y: usize) -> Argb {
        self.src[y * self.width as usize + x]
    }

    #[inline]
    fn blend(&self, x: isize, y: isize, color: Argb) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let index = (y * self.width + x) as usize;
        self.out.update(index, |px| pixel::mix_colors(self.mix, px, color));
    }

    /// Horizontal then vertical run of `2 * len + 1` pixels centered on
    /// `(sx, sy)`. The center is mixed twice.
    pub(crate) fn cross(&self, sx: isize, sy: isize, len: isize, color: Argb) {
        for x in sx - len..=sx + len {
            self.blend(x, sy, color);
        }
        for y in sy - len..=sy + len {
            self.blend(sx, y, color);
        }
    }

    /// Bresenham line, both endpoints included.
    pub(crate) fn line(&self, (mut x, mut y): (isize, isize), (x1, y1): (isize, isize), color: Argb) {
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let step_x = if x < x1 { 1 } else { -1 };
        let step_y = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    /// Pixels of the clipped box around `(sx, sy)` accepted by `inside`,
    /// which receives the offset from the center.
    fn fill(&self, sx: isize, sy: isize, radius: isize, color: Argb, inside: impl Fn(isize, isize) -> bool) {
        let (x0, x1) = ((sx - radius).max(0), (sx + radius).min(self.width - 1));
        let (y0, y1) = ((sy - radius).max(0), (sy + radius).min(self.height - 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                if inside(x - sx, y - sy) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    pub(crate) fn circle(&self, sx: isize, sy: isize, radius: isize, color: Argb) {
        let r2 = radius * radius;
        self.fill(sx, sy, radius, color, |dx, dy| dx * dx + dy * dy <= r2);
    }

    pub(crate) fn square(&self, sx: isize, sy: isize, radius: isize, color: Argb) {
        self.fill(sx, sy, radius, color, |_, _| true);
    }

    pub(crate) fn diamond(&self, sx: isize, sy: isize, radius: isize, color: Argb) {
        self.fill(sx, sy, radius, color, |dx, dy| dx.abs() + dy.abs() <= radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::PixelBuffer;

    /// Draws on a black canvas with full mix and returns the white pixel mask.
    fn draw(width: usize, height: usize, f: impl FnOnce(&Canvas<'_>)) -> Vec<bool> {
        let src = PixelBuffer::filled(width, height, pixel::BLACK).unwrap();
        let out = AtomicPixelBuffer::from_buffer(&src);
        let canvas = Canvas::new(src.as_slice(), &out, 1.0);
        f(&canvas);
        out.into_buffer().as_slice().iter().map(|&px| px == pixel::WHITE).collect()
    }

    fn count(mask: &[bool]) -> usize {
        mask.iter().filter(|&&m| m).count()
    }

    #[test]
    fn test_cross() {
        let mask = draw(7, 7, |c| c.cross(3, 3, 2, pixel::WHITE));
        assert_eq!(count(&mask), 9);
        assert!(mask[3 * 7 + 1] && mask[5 * 7 + 3]);
        assert!(!mask[0]);
    }

    #[test]
    fn test_cross_clipped_at_corner() {
        let mask = draw(4, 4, |c| c.cross(0, 0, 3, pixel::WHITE));
        // Row 0 and column 0, sharing the corner
        assert_eq!(count(&mask), 7);
    }

    #[test]
    fn test_line_endpoints() {
        let mask = draw(8, 8, |c| c.line((1, 1), (6, 3), pixel::WHITE));
        assert_eq!(count(&mask), 6);
        assert!(mask[8 + 1]);
        assert!(mask[3 * 8 + 6]);
    }

    #[test]
    fn test_line_single_point_and_reverse() {
        let mask = draw(3, 3, |c| c.line((1, 1), (1, 1), pixel::WHITE));
        assert_eq!(count(&mask), 1);

        let mask = draw(5, 5, |c| c.line((4, 4), (0, 0), pixel::WHITE));
        assert_eq!(count(&mask), 5);
        assert!((0..5).all(|i| mask[i * 5 + i]));
    }

    #[test]
    fn test_line_off_buffer() {
        let mask = draw(4, 4, |c| c.line((-3, 1), (6, 1), pixel::WHITE));
        assert_eq!(count(&mask), 4);
    }

    #[test]
    fn test_filled_shapes() {
        assert_eq!(count(&draw(7, 7, |c| c.circle(3, 3, 1, pixel::WHITE))), 5);
        assert_eq!(count(&draw(7, 7, |c| c.circle(3, 3, 2, pixel::WHITE))), 13);
        assert_eq!(count(&draw(7, 7, |c| c.square(3, 3, 1, pixel::WHITE))), 9);
        assert_eq!(count(&draw(7, 7, |c| c.diamond(3, 3, 2, pixel::WHITE))), 13);
        assert_eq!(count(&draw(7, 7, |c| c.diamond(3, 3, 3, pixel::WHITE))), 25);
    }

    #[test]
    fn test_filled_shapes_clipped() {
        assert_eq!(count(&draw(5, 5, |c| c.square(0, 4, 2, pixel::WHITE))), 9);
        assert_eq!(count(&draw(3, 3, |c| c.circle(1, 1, 9, pixel::WHITE))), 9);
    }

    #[test]
    fn test_partial_mix() {
        let src = PixelBuffer::filled(1, 1, pixel::BLACK).unwrap();
        let out = AtomicPixelBuffer::from_buffer(&src);
        Canvas::new(src.as_slice(), &out, 0.5).square(0, 0, 0, pixel::WHITE);
        assert_eq!(out.load(0), 0xFF7F_7F7F);
    }
}
