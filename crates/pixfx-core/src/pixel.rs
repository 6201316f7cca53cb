//! Packed ARGB pixels.
//!
//! Every engine works on 32-bit pixels with 8 bits per channel:
//!
//! ```text
//! bit   31      24 23      16 15       8 7        0
//!       [  alpha  ][   red   ][  green  ][  blue   ]
//! ```
//!
//! Channel order in the array helpers is always `[a, r, g, b]`.
//!
//! # Example
//!
//! ```
//! use pixfx_core::pixel;
//!
//! let px = pixel::pack(255, 10, 20, 30);
//! assert_eq!(px, 0xFF0A141E);
//! assert_eq!(pixel::unpack(px), [255, 10, 20, 30]);
//! ```
//!
//! # Used By
//!
//! - `pixfx-ops::box_blur` - running channel sums
//! - `pixfx-ops::convolve` - weighted channel sums
//! - `pixfx-ops::smear` - color mixing of stamped pixels

/// A packed 32-bit ARGB pixel.
pub type Argb = u32;

/// Fully transparent black.
pub const TRANSPARENT: Argb = 0x0000_0000;

/// Opaque black.
pub const BLACK: Argb = 0xFF00_0000;

/// Opaque white.
pub const WHITE: Argb = 0xFFFF_FFFF;

/// Packs four 8-bit channels into one pixel.
#[inline]
pub fn pack(a: u8, r: u8, g: u8, b: u8) -> Argb {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Packs `[a, r, g, b]` into one pixel.
#[inline]
pub fn pack_array(argb: [u8; 4]) -> Argb {
    pack(argb[0], argb[1], argb[2], argb[3])
}

/// Splits a pixel into `[a, r, g, b]`.
#[inline]
pub fn unpack(px: Argb) -> [u8; 4] {
    [alpha(px), red(px), green(px), blue(px)]
}

/// Alpha channel.
#[inline]
pub fn alpha(px: Argb) -> u8 {
    (px >> 24) as u8
}

/// Red channel.
#[inline]
pub fn red(px: Argb) -> u8 {
    (px >> 16) as u8
}

/// Green channel.
#[inline]
pub fn green(px: Argb) -> u8 {
    (px >> 8) as u8
}

/// Blue channel.
#[inline]
pub fn blue(px: Argb) -> u8 {
    px as u8
}

/// Clamps an integer channel value to `[0, 255]`.
///
/// ```
/// use pixfx_core::pixel::clamp_channel;
///
/// assert_eq!(clamp_channel(-4), 0);
/// assert_eq!(clamp_channel(128), 128);
/// assert_eq!(clamp_channel(300), 255);
/// ```
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Scales the color channels by the pixel's alpha fraction.
///
/// Channels are truncated after scaling. Opaque pixels are returned as-is.
#[inline]
pub fn premultiply(px: Argb) -> Argb {
    let [a, r, g, b] = unpack(px);
    if a == 255 {
        return px;
    }
    let f = a as f32 * (1.0 / 255.0);
    pack(
        a,
        (r as f32 * f) as u8,
        (g as f32 * f) as u8,
        (b as f32 * f) as u8,
    )
}

/// Reverses [`premultiply`].
///
/// Fully transparent and fully opaque pixels are left untouched; color
/// channels that would exceed 255 after division saturate.
#[inline]
pub fn unpremultiply(px: Argb) -> Argb {
    let [a, r, g, b] = unpack(px);
    if a == 0 || a == 255 {
        return px;
    }
    let f = 255.0 / a as f32;
    let scale = |c: u8| clamp_channel((c as f32 * f) as i32);
    pack(a, scale(r), scale(g), scale(b))
}

/// Premultiplies every pixel of a slice in place.
pub fn premultiply_slice(pixels: &mut [Argb]) {
    for px in pixels.iter_mut() {
        *px = premultiply(*px);
    }
}

/// Un-premultiplies every pixel of a slice in place.
pub fn unpremultiply_slice(pixels: &mut [Argb]) {
    for px in pixels.iter_mut() {
        *px = unpremultiply(*px);
    }
}

/// Linear interpolation of one channel, truncated toward zero.
#[inline]
fn lerp_channel(t: f32, from: u8, to: u8) -> u8 {
    let from = from as f32;
    clamp_channel((from + t * (to as f32 - from)) as i32)
}

/// Mixes two pixels channel by channel.
///
/// `t = 0` yields `from`, `t = 1` yields `to`. Every channel, alpha
/// included, is interpolated and truncated; results outside `[0, 255]`
/// (possible when `t` is outside `[0, 1]`) saturate.
///
/// ```
/// use pixfx_core::pixel::{mix_colors, pack};
///
/// let dst = pack(255, 0, 0, 0);
/// let src = pack(255, 255, 100, 1);
/// assert_eq!(mix_colors(0.5, dst, src), pack(255, 127, 50, 0));
/// ```
#[inline]
pub fn mix_colors(t: f32, from: Argb, to: Argb) -> Argb {
    let [a1, r1, g1, b1] = unpack(from);
    let [a2, r2, g2, b2] = unpack(to);
    pack(
        lerp_channel(t, a1, a2),
        lerp_channel(t, r1, r2),
        lerp_channel(t, g1, g2),
        lerp_channel(t, b1, b2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let px = pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(px, 0x1234_5678);
        assert_eq!(unpack(px), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(pack_array(unpack(px)), px);
        assert_eq!(alpha(px), 0x12);
        assert_eq!(red(px), 0x34);
        assert_eq!(green(px), 0x56);
        assert_eq!(blue(px), 0x78);
    }

    #[test]
    fn test_premultiply_half_alpha() {
        let px = pack(128, 200, 100, 50);
        let pm = premultiply(px);
        // f = 128 / 255 = 0.50196
        assert_eq!(unpack(pm), [128, 100, 50, 25]);
    }

    #[test]
    fn test_premultiply_extremes() {
        assert_eq!(premultiply(WHITE), WHITE);
        assert_eq!(premultiply(pack(0, 200, 100, 50)), pack(0, 0, 0, 0));
        assert_eq!(unpremultiply(TRANSPARENT), TRANSPARENT);
        assert_eq!(unpremultiply(BLACK), BLACK);
    }

    #[test]
    fn test_unpremultiply_restores_approximately() {
        let px = pack(128, 200, 100, 50);
        let back = unpack(unpremultiply(premultiply(px)));
        assert_eq!(back[0], 128);
        for (orig, restored) in [200u8, 100, 50].iter().zip(&back[1..]) {
            assert!((*orig as i32 - *restored as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_unpremultiply_saturates() {
        // Color larger than alpha cannot come from premultiply, must clamp
        let px = pack(10, 200, 0, 0);
        assert_eq!(red(unpremultiply(px)), 255);
    }

    #[test]
    fn test_mix_colors_endpoints() {
        let a = pack(255, 10, 20, 30);
        let b = pack(0, 250, 240, 230);
        assert_eq!(mix_colors(0.0, a, b), a);
        assert_eq!(mix_colors(1.0, a, b), b);
    }

    #[test]
    fn test_mix_colors_truncates() {
        let a = pack(255, 255, 0, 0);
        let b = pack(255, 0, 255, 0);
        // 255 - 127.5 = 127.5 -> 127, 0 + 127.5 -> 127
        assert_eq!(mix_colors(0.5, a, b), pack(255, 127, 127, 0));
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(i32::MIN), 0);
        assert_eq!(clamp_channel(255), 255);
        assert_eq!(clamp_channel(256), 255);
    }
}
