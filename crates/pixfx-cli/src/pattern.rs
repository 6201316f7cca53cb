//! Synthetic source images.
//!
//! The engines work on in-memory buffers only, so the CLI renders its input
//! from a small description instead of reading a file.

use clap::ValueEnum;
use pixfx_core::{pixel, Argb, PixelBuffer};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Source pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Red ramp left to right, green ramp top to bottom.
    Gradient,
    /// White squares alternating with `color`.
    #[default]
    Checker,
    /// Seeded random pixels, alpha included.
    Noise,
    /// Every pixel set to `color`.
    Solid,
}

/// Description of a synthetic source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    /// Pattern to render.
    pub pattern: Pattern,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Seed for the noise pattern.
    pub seed: u64,
    /// Checker square size in pixels.
    pub cell: usize,
    /// Color as `RRGGBB` or `AARRGGBB` hex, with optional `#` or `0x`.
    pub color: String,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            pattern: Pattern::Checker,
            width: 256,
            height: 256,
            seed: 0,
            cell: 8,
            color: "ff808080".into(),
        }
    }
}

impl SourceSpec {
    /// Renders the source buffer.
    pub fn render(&self) -> ConfigResult<PixelBuffer> {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return Err(ConfigError::InvalidSource(format!("size must be non-zero, got {w}x{h}")));
        }
        if self.cell == 0 {
            return Err(ConfigError::InvalidSource("checker cell must be >= 1".into()));
        }
        let color = parse_color(&self.color)?;

        let data: Vec<Argb> = match self.pattern {
            Pattern::Gradient => {
                let (sx, sy) = ((w - 1).max(1), (h - 1).max(1));
                (0..h)
                    .flat_map(|y| {
                        (0..w).map(move |x| {
                            let r = (x * 255 / sx) as u8;
                            let g = (y * 255 / sy) as u8;
                            pixel::pack(255, r, g, 255 - r / 2)
                        })
                    })
                    .collect()
            }
            Pattern::Checker => {
                let cell = self.cell;
                (0..h)
                    .flat_map(|y| {
                        (0..w).map(move |x| {
                            if (x / cell + y / cell) % 2 == 0 { pixel::WHITE } else { color }
                        })
                    })
                    .collect()
            }
            Pattern::Noise => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                (0..w * h).map(|_| rng.r#gen::<u32>()).collect()
            }
            Pattern::Solid => vec![color; w * h],
        };

        PixelBuffer::from_vec(data, w, h).map_err(|e| ConfigError::InvalidSource(e.to_string()))
    }
}

/// Parses `RRGGBB` (opaque) or `AARRGGBB` hex, with optional `#` or `0x`.
pub fn parse_color(s: &str) -> ConfigResult<Argb> {
    let hex = s
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    let value = u32::from_str_radix(hex, 16)
        .map_err(|_| ConfigError::InvalidSource(format!("bad color: {s}")))?;
    match hex.len() {
        6 => Ok(0xFF00_0000 | value),
        8 => Ok(value),
        _ => Err(ConfigError::InvalidSource(format!("bad color: {s} (expected RRGGBB or AARRGGBB)"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(pattern: Pattern) -> SourceSpec {
        SourceSpec {
            pattern,
            width: 9,
            height: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#336699").unwrap(), 0xFF33_6699);
        assert_eq!(parse_color("0x80336699").unwrap(), 0x8033_6699);
        assert_eq!(parse_color("ffffffff").unwrap(), pixel::WHITE);
        assert!(parse_color("12345").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }

    #[test]
    fn test_gradient_corners() {
        let buf = spec(Pattern::Gradient).render().unwrap();
        assert_eq!(pixel::red(buf.get(0, 0).unwrap()), 0);
        assert_eq!(pixel::red(buf.get(8, 0).unwrap()), 255);
        assert_eq!(pixel::green(buf.get(0, 4).unwrap()), 255);
        assert!(buf.as_slice().iter().all(|&px| pixel::alpha(px) == 255));
    }

    #[test]
    fn test_checker() {
        let buf = SourceSpec { cell: 2, color: "000000".into(), ..spec(Pattern::Checker) }
            .render()
            .unwrap();
        assert_eq!(buf.get(0, 0), Some(pixel::WHITE));
        assert_eq!(buf.get(1, 1), Some(pixel::WHITE));
        assert_eq!(buf.get(2, 0), Some(pixel::BLACK));
        assert_eq!(buf.get(2, 2), Some(pixel::WHITE));
    }

    #[test]
    fn test_noise_seeded() {
        let a = spec(Pattern::Noise).render().unwrap();
        assert_eq!(a, spec(Pattern::Noise).render().unwrap());
        let b = SourceSpec { seed: 1, ..spec(Pattern::Noise) }.render().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_solid() {
        let buf = SourceSpec { color: "#102030".into(), ..spec(Pattern::Solid) }.render().unwrap();
        assert!(buf.as_slice().iter().all(|&px| px == 0xFF10_2030));
    }

    #[test]
    fn test_invalid_sources() {
        assert!(SourceSpec { width: 0, ..Default::default() }.render().is_err());
        assert!(SourceSpec { cell: 0, ..Default::default() }.render().is_err());
        assert!(SourceSpec { color: "red".into(), ..Default::default() }.render().is_err());
    }
}
